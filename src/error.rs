use thiserror::Error;

/// Every failure the dashboard knows about. None of them is fatal: controllers
/// turn them into an inline message for the section that raised them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{symbol} is no longer listed: {reason}")]
    DelistedSymbol { symbol: String, reason: String },

    #[error("No data available for {0}")]
    NoData(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email could not be sent: {0}")]
    EmailSendFailure(String),

    #[error("Market data provider error: {0}")]
    Provider(String),

    #[error("template error: {0}")]
    Template(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl AppError {
    /// Bootstrap alert class used when the error is rendered inline.
    pub fn css_class(&self) -> &'static str {
        match self {
            AppError::NoData(_) | AppError::UnknownSymbol(_) => "text-warning",
            _ => "text-danger",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Provider(err.to_string())
    }
}

impl From<handlebars::RenderError> for AppError {
    fn from(err: handlebars::RenderError) -> Self {
        AppError::Template(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Export(format!("CSV error: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Export(format!("JSON error: {err}"))
    }
}
