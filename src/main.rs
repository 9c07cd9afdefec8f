use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use boursetracker::{
    config, routes,
    services::{mailer::OutboxMailer, market_data::CachedMarketData, yahoo::YahooClient},
    AppState,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    let yahoo = YahooClient::new(settings.yahoo_base_url.clone());
    let market = CachedMarketData::new(yahoo, Duration::from_secs(settings.history_cache_ttl_secs));

    let state = AppState::new(settings.clone(), Arc::new(market), Arc::new(OutboxMailer::new()));
    tracing::info!("market calendar: {} holidays", state.calendar.len());

    let app = routes::app(state);

    let ip = match settings.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("invalid HOST '{}': {}", settings.host, e);
            return;
        }
    };
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind listener");
    axum::serve(listener, app).await.expect("server error");
}
