//! Chat platform payloads built from batches of formatted lines

pub mod html;
pub mod matrix;
pub mod teams;

pub use matrix::MatrixPayloadFormatter;
pub use teams::TeamsPayloadFormatter;

use crate::core::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chat platform a webhook posts to
///
/// # Examples
///
/// ```
/// use litty_logs::payload::WebhookPlatform;
///
/// assert_eq!("TEAMS".parse::<WebhookPlatform>().unwrap(), WebhookPlatform::Teams);
/// assert!("slack".parse::<WebhookPlatform>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookPlatform {
    /// Matrix via a hookshot generic webhook
    #[default]
    Matrix,
    /// Microsoft Teams workflow webhook
    Teams,
}

impl WebhookPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookPlatform::Matrix => "matrix",
            WebhookPlatform::Teams => "teams",
        }
    }
}

impl fmt::Display for WebhookPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookPlatform {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matrix" => Ok(WebhookPlatform::Matrix),
            "teams" => Ok(WebhookPlatform::Teams),
            _ => Err(LoggerError::UnsupportedPlatform(s.to_string())),
        }
    }
}

/// Turns a batch of formatted lines into one request body
pub trait PayloadFormatter: Send + Sync {
    fn platform(&self) -> WebhookPlatform;

    /// Serialize `messages` into the platform's JSON document
    ///
    /// An empty `username` lets the platform pick its default.
    fn format_payload(&self, messages: &[String], username: &str) -> Result<String>;
}

/// Formatter for a platform
pub fn for_platform(platform: WebhookPlatform) -> Box<dyn PayloadFormatter> {
    match platform {
        WebhookPlatform::Matrix => Box::new(MatrixPayloadFormatter),
        WebhookPlatform::Teams => Box::new(TeamsPayloadFormatter),
    }
}
