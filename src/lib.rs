//! Library entrypoint for BourseTracker.
//!
//! This file exists mainly to make controller tests easy (integration tests
//! under `tests/` can import the app state, routers, controllers, services).

use std::sync::Arc;
use std::time::Duration;

pub mod config;
pub mod error;
pub mod models;

#[path = "middleware/session.rs"]
pub mod session;

pub mod services;

#[path = "views/render.rs"]
pub mod render;
#[path = "views/sections.rs"]
pub mod sections;
#[path = "views/templates.rs"]
pub mod templates;

pub mod controllers;
pub mod routes;

use services::{mailer::Mailer, market_clock::MarketCalendar, market_data::MarketData};

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub settings: config::Settings,
    pub market: Arc<dyn MarketData>,
    pub mailer: Arc<dyn Mailer>,
    pub sessions: session::SessionStore,
    pub calendar: Arc<MarketCalendar>,
}

impl AppState {
    pub fn new(
        settings: config::Settings,
        market: Arc<dyn MarketData>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let calendar = MarketCalendar::euronext_paris()
            .with_extra(settings.extra_holidays.iter().map(String::as_str));

        Self {
            hbs: templates::build_handlebars(),
            sessions: session::SessionStore::new(
                &settings.default_symbol,
                Duration::from_secs(settings.session_idle_secs),
            ),
            calendar: Arc::new(calendar),
            settings,
            market,
            mailer,
        }
    }
}
