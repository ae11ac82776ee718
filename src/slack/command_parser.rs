use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fields Slack posts when a user invokes a slash command.
///
/// Older integrations only send `text`; every missing field defaults to an
/// empty string.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SlackCommandEvent {
    pub token: String,
    pub team_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub user_name: String,
    pub command: String,
    pub text: String,
    pub response_url: String,
    pub trigger_id: String,
}

/// Decodes one `application/x-www-form-urlencoded` component.
///
/// # Examples
///
/// ```
/// use deskbot::slack::command_parser::decode_url_component;
///
/// assert_eq!(decode_url_component("hello%20world").unwrap(), "hello world");
/// assert_eq!(decode_url_component("hello+world").unwrap(), "hello world");
/// ```
///
/// # Errors
///
/// Returns an error if the decoded bytes are not valid UTF-8.
pub fn decode_url_component(input: &str) -> Result<String, String> {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.to_string())
        .map_err(|e| format!("Failed to decode URL component: {e}"))
}

/// Parses a slash-command request body into a [`SlackCommandEvent`].
///
/// # Examples
///
/// ```
/// use deskbot::slack::command_parser::parse_form_data;
///
/// let event = parse_form_data("command=%2Frobot&text=LR00002255+1m&user_id=U1").unwrap();
/// assert_eq!(event.command, "/robot");
/// assert_eq!(event.text, "LR00002255 1m");
/// ```
///
/// # Errors
///
/// Returns an error if a key or value is not valid percent-encoded UTF-8.
pub fn parse_form_data(form_data: &str) -> Result<SlackCommandEvent, String> {
    let mut map: HashMap<String, String> = HashMap::new();

    for pair in form_data.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_url_component(raw_key)
            .map_err(|e| format!("Failed to decode key: {e}"))?;
        let value = decode_url_component(raw_value)
            .map_err(|e| format!("Failed to decode value: {e}"))?;
        map.insert(key, value);
    }

    let mut field = |name: &str| map.remove(name).unwrap_or_default();

    Ok(SlackCommandEvent {
        token: field("token"),
        team_id: field("team_id"),
        channel_id: field("channel_id"),
        user_id: field("user_id"),
        user_name: field("user_name"),
        command: field("command"),
        text: field("text"),
        response_url: field("response_url"),
        trigger_id: field("trigger_id"),
    })
}
