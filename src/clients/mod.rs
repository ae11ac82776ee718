//! Outbound API clients

pub mod ticket_client;

pub use ticket_client::{TicketClient, TicketSource};
