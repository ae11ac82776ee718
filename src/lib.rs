//! deskbot - A Slack slash-command bot for robot helpdesk tickets and
//! warehouse storage locations.
//!
//! A single API Lambda receives Slack slash commands and answers inline:
//! 1. `/robot <id> [range]` pages through the helpdesk ticket API, keeps the
//!    tickets that mention the robot and renders them as one text block
//! 2. `/location <code>` followed by a site-menu key decodes a storage
//!    location against that site's column table
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for serverless execution
//! - reqwest for the helpdesk REST API
//! - Tokio for async runtime
//!
//! # Example
//!
//! ```no_run
//! use deskbot::DeskBot;
//! use deskbot::core::config::AppConfig;
//! use deskbot::slack::SlackCommandEvent;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     deskbot::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let bot = DeskBot::new(config)?;
//!
//!     let reply = bot
//!         .handle_command(&SlackCommandEvent {
//!             command: "/robot".into(),
//!             text: "LR00002255 1m".into(),
//!             user_id: "U123".into(),
//!             ..SlackCommandEvent::default()
//!         })
//!         .await;
//!     println!("{}", reply.text);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod clients;
pub mod core;
pub mod errors;
pub mod features;
pub mod slack;

pub use bot::DeskBot;
pub use errors::{DeskbotError, LocationError};

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. It is safe to call more than once; only the
/// first call installs the subscriber.
///
/// # Example
///
/// ```
/// deskbot::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
