//! Handler for the robot-ticket and location slash commands.

use serde_json::Value;
use tracing::info;

use super::helpers::ok_reply;
use super::parsing::parse_slack_event;
use crate::bot::DeskBot;
use crate::errors::DeskbotError;

/// Handle a slash command from Slack.
///
/// # Arguments
/// - `bot`: The shared dispatcher
/// - `body`: The raw form-encoded body of the slash command
///
/// # Returns
/// A Lambda proxy response carrying the Slack reply.
///
/// # Errors
/// Returns an error if the body cannot be parsed.
pub async fn handle_slash_command(bot: &DeskBot, body: &str) -> Result<Value, DeskbotError> {
    let slack_event = parse_slack_event(body)?;
    info!(
        command = %slack_event.command,
        user_id = %slack_event.user_id,
        channel_id = %slack_event.channel_id,
        "Slash command received"
    );

    let reply = bot.handle_command(&slack_event).await;
    Ok(ok_reply(&reply))
}
