//! API Lambda handler - thin router in front of the slash-command handler.
//!
//! This module handles:
//! - Request validation (body, optional Slack signature)
//! - Slash commands (delegated to `slash_handler` module)

use super::{helpers, parsing, signature, slash_handler};
use crate::bot::DeskBot;
use crate::slack::SlackReply;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

pub use self::function_handler as handler;

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never returns `Err` in practice: malformed requests become error response
/// payloads so Slack always receives a reply.
#[tracing::instrument(level = "info", skip(bot, event))]
pub async fn function_handler(bot: &DeskBot, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        correlation_id = %correlation_id,
        request_id = %event.context.request_id,
        "API Lambda received request"
    );

    let payload = event.payload;

    // ========================================================================
    // Extract body
    // ========================================================================

    let body = match parsing::extract_body(&payload) {
        Ok(body) => body,
        Err(e) => {
            error!(correlation_id = %correlation_id, "Rejecting request: {}", e);
            return Ok(helpers::err_response(400, &e.to_string()));
        }
    };

    // ========================================================================
    // Verify Slack signature when a signing secret is configured
    // ========================================================================

    if let Some(secret) = bot.config().slack_signing_secret.as_deref() {
        let headers = payload.get("headers").unwrap_or(&Value::Null);
        if let Err(response) = verify_signature(&body, headers, secret) {
            return Ok(response);
        }
        info!("Slack signature verified successfully");
    }

    // ========================================================================
    // Slash command (form-encoded)
    // ========================================================================

    match slash_handler::handle_slash_command(bot, &body).await {
        Ok(response) => Ok(response),
        Err(e) => {
            error!(correlation_id = %correlation_id, "Failed to parse Slack event: {}", e);
            Ok(helpers::ok_reply(&SlackReply::ephemeral(e.to_string())))
        }
    }
}

fn verify_signature(body: &str, headers: &Value, secret: &str) -> Result<(), Value> {
    let Some(sig) = parsing::get_header_value(headers, "X-Slack-Signature") else {
        error!("Missing X-Slack-Signature header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Signature header",
        ));
    };

    let Some(timestamp) = parsing::get_header_value(headers, "X-Slack-Request-Timestamp") else {
        error!("Missing X-Slack-Request-Timestamp header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Request-Timestamp header",
        ));
    };

    if !signature::verify_slack_signature(body, timestamp, sig, secret) {
        return Err(helpers::err_response(401, "Invalid Slack signature"));
    }

    Ok(())
}
