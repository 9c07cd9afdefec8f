use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub session_cookie_name: String,

    pub yahoo_base_url: String,
    pub history_cache_ttl_secs: u64,

    // appended to the built-in holiday table
    pub extra_holidays: Vec<String>,

    pub default_symbol: String,

    pub session_idle_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            session_cookie_name: "bourse_session".to_string(),
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            history_cache_ttl_secs: 300,
            extra_holidays: Vec::new(),
            default_symbol: "MC.PA".to_string(),
            session_idle_secs: 4 * 60 * 60,
        }
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let defaults = Settings::default();

    let host = env::var("HOST").unwrap_or(defaults.host);

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(defaults.port);

    let session_cookie_name =
        env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.session_cookie_name);

    let yahoo_base_url = env::var("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url);

    let history_cache_ttl_secs = env::var("HISTORY_CACHE_TTL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(defaults.history_cache_ttl_secs);

    let extra_holidays = env::var("MARKET_HOLIDAYS")
        .map(|s| parse_list(&s))
        .unwrap_or_default();

    let default_symbol = env::var("DEFAULT_SYMBOL")
        .map(|s| s.trim().to_uppercase())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or(defaults.default_symbol);

    let session_idle_secs = env::var("SESSION_IDLE_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(defaults.session_idle_secs);

    Settings {
        host,
        port,
        session_cookie_name,
        yahoo_base_url,
        history_cache_ttl_secs,
        extra_holidays,
        default_symbol,
        session_idle_secs,
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
