pub mod symbols;
pub mod exchange;
pub mod market_clock;

pub mod market_data;
pub mod history;
pub mod yahoo;
pub mod mailer;

pub mod stocks_service;
pub mod portfolio_service;
pub mod alerts_service;
pub mod projection_service;
pub mod indices_service;
pub mod export_service;
