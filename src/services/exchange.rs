use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Exchange {
    EuronextParis,
    EuronextAmsterdam,
    EuronextBrussels,
    LondonStockExchange,
    BorsaItaliana,
    DeutscheBorse,
    UsGlobal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Currency {
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "USD")]
    Usd,
}

// Checked in order; first suffix match wins.
const SUFFIXES: &[(&str, Exchange)] = &[
    (".PA", Exchange::EuronextParis),
    (".AS", Exchange::EuronextAmsterdam),
    (".BR", Exchange::EuronextBrussels),
    (".L", Exchange::LondonStockExchange),
    (".MI", Exchange::BorsaItaliana),
    (".DE", Exchange::DeutscheBorse),
];

impl Exchange {
    pub fn from_symbol(symbol: &str) -> Self {
        SUFFIXES
            .iter()
            .find(|(suffix, _)| symbol.ends_with(suffix))
            .map(|(_, ex)| *ex)
            .unwrap_or(Exchange::UsGlobal)
    }

    pub fn name(self) -> &'static str {
        match self {
            Exchange::EuronextParis => "Euronext Paris",
            Exchange::EuronextAmsterdam => "Euronext Amsterdam",
            Exchange::EuronextBrussels => "Euronext Brussels",
            Exchange::LondonStockExchange => "London Stock Exchange",
            Exchange::BorsaItaliana => "Borsa Italiana",
            Exchange::DeutscheBorse => "Deutsche Börse",
            Exchange::UsGlobal => "US/Global",
        }
    }

    pub fn currency(self) -> Currency {
        match self {
            Exchange::EuronextParis
            | Exchange::EuronextAmsterdam
            | Exchange::EuronextBrussels
            | Exchange::BorsaItaliana
            | Exchange::DeutscheBorse => Currency::Eur,
            Exchange::LondonStockExchange => Currency::Gbp,
            Exchange::UsGlobal => Currency::Usd,
        }
    }
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
        }
    }

    pub fn sign(self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Usd => "$",
        }
    }

    /// `€1,234.56`, `-£12.00`.
    pub fn format(self, value: f64) -> String {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}{}{}", self.sign(), group_thousands(value.abs(), 2))
    }

    /// Whole amounts, used for market capitalisation.
    pub fn format_whole(self, value: f64) -> String {
        format!("{}{}", self.sign(), group_thousands(value, 0))
    }
}

/// Exchange label and settlement currency for a ticker. Total: anything
/// without a known suffix is treated as US-listed.
pub fn classify(symbol: &str) -> (Exchange, Currency) {
    let exchange = Exchange::from_symbol(symbol);
    (exchange, exchange.currency())
}

pub fn format_currency(value: f64, symbol: &str) -> String {
    classify(symbol).1.format(value)
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}
