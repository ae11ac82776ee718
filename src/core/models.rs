use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Requester {
    #[serde(default)]
    pub name: Option<String>,
}

/// Helpdesk ticket as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description_text: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub requester: Option<Requester>,
    #[serde(default)]
    pub status: Option<TicketStatus>,
}

impl Ticket {
    #[must_use]
    pub fn requester_name(&self) -> Option<&str> {
        self.requester.as_ref().and_then(|r| r.name.as_deref())
    }
}

/// Freshdesk reports numeric status codes; other backends send a label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TicketStatus {
    Code(u8),
    Label(String),
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Code(2) => f.write_str("Open"),
            TicketStatus::Code(3) => f.write_str("Pending"),
            TicketStatus::Code(4) => f.write_str("Resolved"),
            TicketStatus::Code(5) => f.write_str("Closed"),
            TicketStatus::Code(other) => write!(f, "Status {other}"),
            TicketStatus::Label(label) => f.write_str(label),
        }
    }
}
