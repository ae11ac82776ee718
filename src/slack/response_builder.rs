//! Slash-command reply payloads.
//!
//! Slack renders the JSON body of the command response directly: `ephemeral`
//! replies are visible only to the invoking user, `in_channel` replies to
//! everyone in the channel.

use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Ephemeral,
    InChannel,
}

/// Reply to a slash command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackReply {
    pub response_type: ResponseType,
    pub text: String,
}

impl SlackReply {
    #[must_use]
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn to_payload(&self) -> Value {
        json!({
            "response_type": self.response_type,
            "text": self.text,
        })
    }
}
