use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One purchase lot. Lots are appended, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub symbol: String,
    pub shares: f64,
    pub buy_price: f64,
    pub bought_at: DateTime<Utc>,
}

impl PortfolioPosition {
    pub fn new(symbol: &str, shares: f64, buy_price: f64) -> Result<Self, AppError> {
        if !shares.is_finite() || shares <= 0.0 {
            return Err(AppError::InvalidInput(
                "Number of shares must be greater than zero.".to_string(),
            ));
        }
        if !buy_price.is_finite() || buy_price <= 0.0 {
            return Err(AppError::InvalidInput(
                "Buy price must be greater than zero.".to_string(),
            ));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            shares,
            buy_price,
            bought_at: Utc::now(),
        })
    }

    pub fn cost(&self) -> f64 {
        self.shares * self.buy_price
    }
}
