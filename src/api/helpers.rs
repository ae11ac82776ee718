//! Lambda proxy response builders.

use serde_json::{Value, json};

use crate::slack::SlackReply;

/// Returns a 200 OK response carrying a slash-command reply.
#[must_use]
pub fn ok_reply(reply: &SlackReply) -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "application/json" },
        "body": reply.to_payload().to_string()
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": "application/json" },
        "body": json!({ "error": message }).to_string()
    })
}
