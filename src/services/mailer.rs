use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use regex::Regex;

use crate::{
    error::AppError,
    models::{EmailConfig, EmailMessage},
};

/// Outgoing email collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, config: &EmailConfig, message: &EmailMessage) -> Result<(), AppError>;
}

/// Records every accepted message and logs it. Used as the default transport
/// and by tests to inspect what would have been sent.
#[derive(Clone, Default)]
pub struct OutboxMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, config: &EmailConfig, message: &EmailMessage) -> Result<(), AppError> {
        check_config(config)?;

        tracing::info!(
            "mail via {}:{} from {} to {}: {}",
            config.smtp_host,
            config.smtp_port,
            message.from,
            message.to,
            message.subject
        );

        self.sent
            .lock()
            .map_err(|_| AppError::EmailSendFailure("outbox unavailable".to_string()))?
            .push(message.clone());
        Ok(())
    }
}

pub fn is_valid_address(addr: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map(|re| re.is_match(addr))
        .unwrap_or(false)
}

/// Field-level problems with a config the user wants to save.
pub fn validate_config(config: &EmailConfig) -> Vec<(&'static str, &'static str)> {
    let mut errors = Vec::new();
    if !config.enabled {
        return errors;
    }
    if config.smtp_host.trim().is_empty() {
        errors.push(("smtp_host", "SMTP server is required."));
    }
    if config.smtp_port == 0 {
        errors.push(("smtp_port", "Please enter a valid port."));
    }
    if !is_valid_address(config.account.trim()) {
        errors.push(("account", "Please enter a valid email address."));
    }
    errors
}

fn check_config(config: &EmailConfig) -> Result<(), AppError> {
    if !config.enabled {
        return Err(AppError::EmailSendFailure("email notifications are disabled".to_string()));
    }
    if let Some((_, msg)) = validate_config(config).first() {
        return Err(AppError::EmailSendFailure((*msg).to_string()));
    }
    if config.secret.is_empty() {
        return Err(AppError::EmailSendFailure("missing SMTP password".to_string()));
    }
    Ok(())
}

/// Sends `subject`/`html_body` from the configured account to `to`.
/// Never fails loudly: returns false and logs when nothing was sent.
pub async fn send_email_alert(
    mailer: &dyn Mailer,
    config: &EmailConfig,
    subject: &str,
    html_body: &str,
    to: &str,
) -> bool {
    if !config.enabled {
        return false;
    }

    let message = EmailMessage {
        from: config.account.clone(),
        to: to.to_string(),
        subject: subject.to_string(),
        html_body: html_body.to_string(),
    };

    match mailer.send(config, &message).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("email to {} failed: {}", to, e);
            false
        }
    }
}
