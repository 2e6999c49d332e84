//! Matrix (hookshot) payload
//!
//! `{"text": "...", "html": "...", "username": "..."}`. Hookshot prefers the
//! `html` field when present; `text` is the plain fallback.

use super::{html, PayloadFormatter, WebhookPlatform};
use crate::core::error::Result;
use serde::Serialize;

#[derive(Serialize)]
struct MatrixPayload<'a> {
    text: String,
    html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

/// Builds hookshot payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixPayloadFormatter;

impl PayloadFormatter for MatrixPayloadFormatter {
    fn platform(&self) -> WebhookPlatform {
        WebhookPlatform::Matrix
    }

    fn format_payload(&self, messages: &[String], username: &str) -> Result<String> {
        // a blank line between entries keeps batched messages visually separate
        let text = messages.join("\n\n");
        let html = messages
            .iter()
            .map(|m| html::message_to_html(m))
            .collect::<Vec<_>>()
            .join("<br/><br/>");

        let payload = MatrixPayload {
            text,
            html,
            username: (!username.is_empty()).then_some(username),
        };
        Ok(serde_json::to_string(&payload)?)
    }
}
