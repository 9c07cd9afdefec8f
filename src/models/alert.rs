use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Above,
    Below,
}

impl Condition {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "above" => Some(Condition::Above),
            "below" => Some(Condition::Below),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Above => "above",
            Condition::Below => "below",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: Uuid,
    pub symbol: String,
    pub target_price: f64,
    pub condition: Condition,

    // removed from the book on first trigger
    pub one_time: bool,

    pub created_at: DateTime<Utc>,
}

impl PriceAlert {
    pub fn new(
        symbol: &str,
        condition: Condition,
        target_price: f64,
        one_time: bool,
    ) -> Result<Self, AppError> {
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(AppError::InvalidInput(
                "Please enter a valid target price.".to_string(),
            ));
        }
        if symbol.trim().is_empty() {
            return Err(AppError::InvalidInput("Symbol is required.".to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            target_price,
            condition,
            one_time,
            created_at: Utc::now(),
        })
    }

    pub fn is_hit(&self, price: f64) -> bool {
        match self.condition {
            Condition::Above => price >= self.target_price,
            Condition::Below => price <= self.target_price,
        }
    }
}

/// The session's active alerts, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertBook {
    alerts: Vec<PriceAlert>,
}

impl AlertBook {
    pub fn add(&mut self, alert: PriceAlert) {
        self.alerts.push(alert);
    }

    /// Returns false when no alert has this id.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    pub fn as_slice(&self) -> &[PriceAlert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
