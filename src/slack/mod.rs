//! Slack slash-command contract: request parsing and reply payloads

pub mod command_parser;
pub mod response_builder;

pub use command_parser::{SlackCommandEvent, parse_form_data};
pub use response_builder::{ResponseType, SlackReply};
