use std::sync::Arc;

use envconfig::Envconfig;
use thiserror::Error;

use crate::services::email::{ConsoleEmailSender, EmailError, EmailSender, SmtpEmailSender};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown email transport {0:?}, expected \"smtp\" or \"console\"")]
    UnknownTransport(String),
    #[error("{0} must be set when EMAIL_TRANSPORT is \"smtp\"")]
    MissingSmtpSetting(&'static str),
    #[error(transparent)]
    Email(#[from] EmailError),
}

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "TELEGRAM_BOT_TOKEN")]
    pub telegram_bot_token: String,

    #[envconfig(from = "DATABASE_URL")]
    pub database_url: String,

    #[envconfig(from = "EMAIL_TRANSPORT", default = "console")]
    pub email_transport: String,

    #[envconfig(from = "SMTP_SERVER")]
    pub smtp_server: Option<String>,

    #[envconfig(from = "SMTP_PORT", default = "587")]
    pub smtp_port: u16,

    #[envconfig(from = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    #[envconfig(from = "SMTP_PASSWORD")]
    pub smtp_password: Option<String>,

    #[envconfig(from = "MAIL_FROM", default = "Pharmacy <noreply@pharmacy.local>")]
    pub mail_from: String,
}

impl Config {
    /// Builds the email sender selected by `EMAIL_TRANSPORT`.
    pub fn email_sender(&self) -> Result<Arc<dyn EmailSender>, ConfigError> {
        match self.email_transport.to_ascii_lowercase().as_str() {
            "console" => Ok(Arc::new(ConsoleEmailSender)),
            "smtp" => {
                let server = required(&self.smtp_server, "SMTP_SERVER")?;
                let username = required(&self.smtp_username, "SMTP_USERNAME")?;
                let password = required(&self.smtp_password, "SMTP_PASSWORD")?;
                let sender = SmtpEmailSender::new(
                    server,
                    self.smtp_port,
                    username.to_string(),
                    password.to_string(),
                    &self.mail_from,
                )?;
                Ok(Arc::new(sender))
            }
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingSmtpSetting(name))
}
