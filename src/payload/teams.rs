//! Microsoft Teams payload
//!
//! A message with one Adaptive Card 1.5 attachment: a bold header naming
//! the sender, then one container per log line styled by its level.

use super::{html::split_fenced, PayloadFormatter, WebhookPlatform};
use crate::core::{error::Result, formatter::level_of_json, log_level::LogLevel};
use serde::Serialize;

const DEFAULT_USERNAME: &str = "LittyLogs";
const CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
const CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

#[derive(Serialize)]
struct TeamsMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    attachments: [Attachment<'a>; 1],
}

#[derive(Serialize)]
struct Attachment<'a> {
    #[serde(rename = "contentType")]
    content_type: &'static str,
    #[serde(rename = "contentUrl")]
    content_url: Option<&'static str>,
    content: AdaptiveCard<'a>,
}

#[derive(Serialize)]
struct AdaptiveCard<'a> {
    #[serde(rename = "$schema")]
    schema: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    version: &'static str,
    body: Vec<CardElement<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum CardElement<'a> {
    Text(TextBlock<'a>),
    Container(Container<'a>),
}

#[derive(Serialize)]
struct Container<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    style: &'static str,
    items: Vec<TextBlock<'a>>,
}

#[derive(Serialize)]
struct TextBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'static str>,
    #[serde(rename = "fontType", skip_serializing_if = "Option::is_none")]
    font_type: Option<&'static str>,
    wrap: bool,
    #[serde(rename = "isSubtle", skip_serializing_if = "Option::is_none")]
    is_subtle: Option<bool>,
}

impl<'a> TextBlock<'a> {
    fn header(text: &'a str) -> Self {
        Self {
            kind: "TextBlock",
            text,
            weight: Some("Bolder"),
            size: Some("Medium"),
            font_type: None,
            wrap: true,
            is_subtle: None,
        }
    }

    fn monospace(text: &'a str) -> Self {
        Self {
            kind: "TextBlock",
            text,
            weight: None,
            size: Some("Small"),
            font_type: Some("Monospace"),
            wrap: true,
            is_subtle: None,
        }
    }

    fn subtle(mut self) -> Self {
        self.is_subtle = Some(true);
        self
    }
}

/// Container style for a formatted line
///
/// The level is recovered from the line itself: the `[emoji label]`
/// bracket for text lines, the `level` key for JSON lines.
pub fn container_style(line: &str) -> &'static str {
    let level = LogLevel::from_formatted(line).or_else(|| level_of_json(line));
    match level {
        Some(LogLevel::Info) => "good",
        Some(LogLevel::Warning) => "warning",
        Some(LogLevel::Error | LogLevel::Critical) => "attention",
        Some(LogLevel::Trace | LogLevel::Debug) | None => "default",
    }
}

fn line_container(message: &str) -> Container<'_> {
    let items = match split_fenced(message) {
        Some((line, detail)) => vec![
            TextBlock::monospace(line),
            TextBlock::monospace(detail).subtle(),
        ],
        None => vec![TextBlock::monospace(message)],
    };

    Container {
        kind: "Container",
        style: container_style(message),
        items,
    }
}

/// Builds Adaptive Card payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamsPayloadFormatter;

impl PayloadFormatter for TeamsPayloadFormatter {
    fn platform(&self) -> WebhookPlatform {
        WebhookPlatform::Teams
    }

    fn format_payload(&self, messages: &[String], username: &str) -> Result<String> {
        let header = if username.is_empty() {
            DEFAULT_USERNAME
        } else {
            username
        };

        let mut body = Vec::with_capacity(messages.len() + 1);
        body.push(CardElement::Text(TextBlock::header(header)));
        body.extend(
            messages
                .iter()
                .map(|m| CardElement::Container(line_container(m))),
        );

        let payload = TeamsMessage {
            kind: "message",
            attachments: [Attachment {
                content_type: CARD_CONTENT_TYPE,
                content_url: None,
                content: AdaptiveCard {
                    schema: CARD_SCHEMA,
                    kind: "AdaptiveCard",
                    version: "1.5",
                    body,
                },
            }],
        };
        Ok(serde_json::to_string(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn card(messages: &[&str], username: &str) -> Value {
        let messages: Vec<String> = messages.iter().map(|m| m.to_string()).collect();
        let json = TeamsPayloadFormatter
            .format_payload(&messages, username)
            .unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_envelope_shape() {
        let value = card(&["[🔥 info] [ts] [App] hi"], "bot");
        assert_eq!(value["type"], "message");

        let attachment = &value["attachments"][0];
        assert_eq!(attachment["contentType"], CARD_CONTENT_TYPE);
        assert!(attachment["contentUrl"].is_null());

        let content = &attachment["content"];
        assert_eq!(content["$schema"], CARD_SCHEMA);
        assert_eq!(content["type"], "AdaptiveCard");
        assert_eq!(content["version"], "1.5");

        let header = &content["body"][0];
        assert_eq!(header["type"], "TextBlock");
        assert_eq!(header["text"], "bot");
        assert_eq!(header["weight"], "Bolder");
    }

    #[test]
    fn test_default_header_name() {
        let value = card(&["x"], "");
        assert_eq!(value["attachments"][0]["content"]["body"][0]["text"], "LittyLogs");
    }

    #[test]
    fn test_one_styled_container_per_line() {
        let value = card(
            &[
                "[👀 trace] [ts] [App] a",
                "[🔥 info] [ts] [App] b",
                "[😤 warning] [ts] [App] c",
                "[💀 err] [ts] [App] d",
                "[☠️ crit] [ts] [App] e",
                "no level here",
            ],
            "bot",
        );
        let body = value["attachments"][0]["content"]["body"].as_array().unwrap();
        assert_eq!(body.len(), 7);

        let styles: Vec<&str> = body[1..]
            .iter()
            .map(|c| c["style"].as_str().unwrap())
            .collect();
        assert_eq!(
            styles,
            vec!["default", "good", "warning", "attention", "attention", "default"]
        );

        let item = &body[2]["items"][0];
        assert_eq!(item["type"], "TextBlock");
        assert_eq!(item["fontType"], "Monospace");
        assert_eq!(item["size"], "Small");
        assert_eq!(item["wrap"], true);
        assert!(item.get("isSubtle").is_none());
    }

    #[test]
    fn test_error_block_is_subtle() {
        let value = card(&["[💀 err] [ts] [App] boom\n```\nIoError: gone\n```"], "bot");
        let items = value["attachments"][0]["content"]["body"][1]["items"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["text"], "[💀 err] [ts] [App] boom");
        assert!(items[0].get("isSubtle").is_none());
        assert_eq!(items[1]["text"], "IoError: gone");
        assert_eq!(items[1]["isSubtle"], true);
        assert_eq!(items[1]["fontType"], "Monospace");
    }

    #[test]
    fn test_json_lines_are_styled_too() {
        assert_eq!(
            container_style(r#"{"timestamp":"t","level":"warning","emoji":"😤","category":"App"}"#),
            "warning"
        );
    }
}
