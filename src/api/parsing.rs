use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::DeskbotError;
use crate::slack::command_parser::{SlackCommandEvent, parse_form_data};

/// # Errors
///
/// Returns [`DeskbotError::ParseError`] if the form body cannot be decoded.
pub fn parse_slack_event(payload: &str) -> Result<SlackCommandEvent, DeskbotError> {
    parse_form_data(payload)
        .map_err(|e| DeskbotError::ParseError(format!("Failed to parse form data: {e}")))
}

/// Case-insensitive header lookup on the proxy event's `headers` object.
#[must_use]
pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Extracts the raw request body, undoing the base64 encoding function URLs
/// apply to form posts.
///
/// # Errors
///
/// Returns [`DeskbotError::ParseError`] if the body is missing, not a string, or
/// flagged as base64 but not decodable.
pub fn extract_body(payload: &Value) -> Result<String, DeskbotError> {
    let body = payload
        .get("body")
        .ok_or_else(|| DeskbotError::ParseError("Missing body".to_string()))?
        .as_str()
        .ok_or_else(|| DeskbotError::ParseError("Invalid body format".to_string()))?;

    let is_base64 = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !is_base64 {
        return Ok(body.to_string());
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| DeskbotError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| DeskbotError::ParseError(format!("Body is not UTF-8: {e}")))
}
