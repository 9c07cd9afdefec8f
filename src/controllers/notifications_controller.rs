use std::collections::HashMap;

use axum::{
    extract::{Extension, Form, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    models::{EmailConfig, EmailMessage, Session},
    render::{error_flash, flash},
    sections::Section,
    services::{exchange::format_currency, history::paris_time, mailer},
    session::SessionHandle,
    AppState,
};

use super::{partial, render_partial, section_page};

#[derive(Deserialize)]
pub struct EmailForm {
    // checkbox: present when ticked
    pub enabled: Option<String>,
    pub smtp_host: String,
    pub smtp_port: String,
    pub account: String,
    #[serde(default)]
    pub secret: String,
}

impl EmailForm {
    fn into_config(self) -> EmailConfig {
        EmailConfig {
            enabled: self.enabled.is_some(),
            smtp_host: self.smtp_host.trim().to_string(),
            smtp_port: self.smtp_port.trim().parse().unwrap_or(0),
            account: self.account.trim().to_string(),
            secret: self.secret,
        }
    }
}

fn email_form_ctx(
    config: &EmailConfig,
    errors: &[(&str, &str)],
    messages: Vec<serde_json::Value>,
) -> serde_json::Value {
    let field_errors: HashMap<&str, &str> = errors.iter().copied().collect();

    json!({
        "messages": messages,
        "config": config,
        "has_secret": !config.secret.is_empty(),
        "errors": field_errors,
    })
}

fn history_ctx(session: &Session) -> serde_json::Value {
    let items: Vec<serde_json::Value> = session
        .notifications
        .iter()
        .rev()
        .map(|n| {
            json!({
                "symbol": n.symbol,
                "message": n.message,
                "price": format_currency(n.price, &n.symbol),
                "emailed": n.emailed,
                "at": paris_time(n.at),
            })
        })
        .collect();

    json!({ "items": items, "has_items": !items.is_empty() })
}

// GET /notifications (SSR page)
pub async fn get_notifications_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let (form_ctx, hist_ctx) = {
        let s = session.lock().await;
        (email_form_ctx(&s.email, &[], vec![]), history_ctx(&s))
    };

    let ctx = json!({
        "form_html": render_partial(&state, "partials/email_form", &form_ctx),
        "history_html": render_partial(&state, "partials/notification_history", &hist_ctx),
    });
    section_page(&state, &headers, Section::Notifications, &ctx)
}

// POST /notifications/email
pub async fn post_email_settings(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<EmailForm>,
) -> Response {
    let mut config = form.into_config();
    if config.secret.is_empty() {
        // password inputs are never echoed back; blank keeps the saved one
        config.secret = session.lock().await.email.secret.clone();
    }
    let errors = mailer::validate_config(&config);

    let ctx = if errors.is_empty() {
        tracing::info!("email settings saved (enabled: {})", config.enabled);
        let ctx = email_form_ctx(&config, &[], vec![flash("text-success", "Email settings saved")]);
        session.lock().await.email = config;
        ctx
    } else {
        email_form_ctx(
            &config,
            &errors,
            vec![flash("text-danger", "Settings not saved, please fix the fields below")],
        )
    };

    partial(&state, "partials/email_form", &ctx)
}

// POST /notifications/test
pub async fn post_test_email(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let config = session.lock().await.email.clone();

    let message = EmailMessage {
        from: config.account.clone(),
        to: config.account.clone(),
        subject: "BourseTracker test email".to_string(),
        html_body: "<p>Email notifications are configured correctly.</p>".to_string(),
    };

    let outcome = if config.enabled {
        state.mailer.send(&config, &message).await
    } else {
        Err(AppError::EmailSendFailure(
            "enable email notifications first".to_string(),
        ))
    };

    let note = match outcome {
        Ok(()) => flash("text-success", format!("Test email queued for {}", config.account)),
        Err(e) => {
            tracing::warn!("test email failed: {}", e);
            error_flash(&e)
        }
    };

    let ctx = email_form_ctx(&config, &[], vec![note]);
    partial(&state, "partials/email_form", &ctx)
}

// GET /notifications/history (HTMX partial)
pub async fn get_notification_history(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Response {
    let ctx = history_ctx(&*session.lock().await);
    partial(&state, "partials/notification_history", &ctx)
}
