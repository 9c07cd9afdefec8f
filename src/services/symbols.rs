//! Ticker normalisation for Euronext Paris listings.
//!
//! A few CAC 40 members changed ticker (or stopped trading) over the years.
//! Users still type the old codes, so every symbol coming from a form or a
//! query string goes through [`resolve`] before anything is fetched.

use crate::error::AppError;

/// What a legacy ticker turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    Replaced(&'static str),
    Delisted(&'static str),
}

/// Legacy symbol table. Identity entries are kept so the table documents the
/// tickers that were checked and found unchanged.
pub const SYMBOL_MAPPING: &[(&str, Mapping)] = &[
    ("ACA.PA", Mapping::Replaced("AC.PA")),
    ("TOTF.PA", Mapping::Replaced("TTE.PA")),
    ("FTE.PA", Mapping::Replaced("ORAN.PA")),
    ("EDF.PA", Mapping::Delisted("Nationalised in 2023, no longer available")),
    ("GLE.PA", Mapping::Replaced("GLE.PA")),
    ("BNP.PA", Mapping::Replaced("BNP.PA")),
];

/// Default CAC 40 watchlist for a fresh session.
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "MC.PA", "OR.PA", "AC.PA", "BNP.PA", "GLE.PA", "AIR.PA", "SAF.PA", "RMS.PA", "SAN.PA",
    "TTE.PA", "SU.PA", "CAP.PA", "DSY.PA", "ENGI.PA", "ORAN.PA", "VIV.PA", "VIE.PA", "RNO.PA",
    "STLAP.PA", "AI.PA", "KER.PA", "CDI.PA", "DG.PA", "LR.PA", "EL.PA", "BN.PA", "PUB.PA",
    "SGO.PA", "ML.PA", "ATO.PA", "HO.PA", "SW.PA", "ERF.PA", "DEC.PA", "NOKIA.PA",
];

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("MC.PA", "LVMH"),
    ("OR.PA", "L'Oréal"),
    ("AC.PA", "Crédit Agricole"),
    ("BNP.PA", "BNP Paribas"),
    ("GLE.PA", "Société Générale"),
    ("AIR.PA", "Airbus"),
    ("SAF.PA", "Safran"),
    ("RMS.PA", "Hermès"),
    ("SAN.PA", "Sanofi"),
    ("TTE.PA", "TotalEnergies"),
    ("SU.PA", "Schneider Electric"),
    ("CAP.PA", "Capgemini"),
    ("DSY.PA", "Dassault Systèmes"),
    ("ENGI.PA", "Engie"),
    ("ORAN.PA", "Orange"),
    ("VIV.PA", "Vivendi"),
    ("VIE.PA", "Veolia"),
    ("RNO.PA", "Renault"),
    ("STLAP.PA", "Stellantis"),
    ("AI.PA", "Air Liquide"),
    ("KER.PA", "Kering"),
    ("CDI.PA", "Christian Dior"),
    ("DG.PA", "Vinci"),
    ("LR.PA", "Legrand"),
    ("EL.PA", "EssilorLuxottica"),
    ("BN.PA", "Danone"),
    ("PUB.PA", "Publicis"),
    ("SGO.PA", "Saint-Gobain"),
    ("ML.PA", "Michelin"),
];

/// A symbol that survived resolution. `note` is set when a substitution
/// happened and should be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub symbol: String,
    pub note: Option<String>,
}

/// Trim and uppercase raw user input.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn lookup(symbol: &str) -> Option<Mapping> {
    SYMBOL_MAPPING
        .iter()
        .find(|(legacy, _)| *legacy == symbol)
        .map(|(_, m)| *m)
}

/// Map a ticker to its current form, or reject it when it no longer trades.
/// Symbols missing from the table pass through unchanged.
pub fn resolve(symbol: &str) -> Result<Resolved, AppError> {
    match lookup(symbol) {
        Some(Mapping::Delisted(reason)) => Err(AppError::DelistedSymbol {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }),
        Some(Mapping::Replaced(new)) if new != symbol => Ok(Resolved {
            symbol: new.to_string(),
            note: Some(format!("{symbol} → {new}")),
        }),
        _ => Ok(Resolved {
            symbol: symbol.to_string(),
            note: None,
        }),
    }
}

/// Legacy tickers: replaced or delisted. These never enter a watchlist or
/// portfolio as-is.
pub fn is_retired(symbol: &str) -> bool {
    match lookup(symbol) {
        Some(Mapping::Delisted(_)) => true,
        Some(Mapping::Replaced(new)) => new != symbol,
        None => false,
    }
}

/// Hint shown when a fetch fails for a symbol the table knows about.
pub fn suggestion(symbol: &str) -> Option<String> {
    match lookup(symbol)? {
        Mapping::Delisted(reason) => Some(format!("{symbol}: {reason}")),
        Mapping::Replaced(new) if new != symbol => {
            let name = display_name(new).unwrap_or(new);
            Some(format!("{name} now trades as {new}"))
        }
        Mapping::Replaced(_) => None,
    }
}

pub fn display_name(symbol: &str) -> Option<&'static str> {
    DISPLAY_NAMES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, n)| *n)
}

/// Short label for the watchlist grid.
pub fn short_label(symbol: &str) -> String {
    symbol.replace(".PA", "")
}
