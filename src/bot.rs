//! Command dispatch: routes a parsed slash command to the ticket lookup or
//! the two-step location flow.

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::clients::{TicketClient, TicketSource};
use crate::core::config::AppConfig;
use crate::core::reference::ReferenceData;
use crate::core::sessions::SessionStore;
use crate::errors::DeskbotError;
use crate::features::location::{decode_location, location_error_message, site_menu};
use crate::features::tickets::{ReportContext, RobotMatcher, TicketQuery, render_ticket_report};
use crate::slack::{SlackCommandEvent, SlackReply};

pub const MISSING_ROBOT_MESSAGE: &str = "Please provide a robot number.";
pub const LOCATION_USAGE_MESSAGE: &str =
    "שלח קוד מיקום בפורמט מעבר:(צד,עמודה,קומה):תא, לדוגמה 3:(-1,10,2):A5";
pub const NO_PENDING_LOCATION_MESSAGE: &str = "אין מיקום ממתין לבחירת אתר. שלח קודם קוד מיקום.";
pub const UNKNOWN_USER_MESSAGE: &str = "לא ניתן לזהות את המשתמש ששלח את הפקודה.";

pub struct DeskBot {
    config: AppConfig,
    tickets: Arc<dyn TicketSource>,
    reference: ReferenceData,
    sessions: SessionStore,
}

impl DeskBot {
    /// Builds the bot with the HTTP ticket client and the configured reference data.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference data cannot be loaded or the HTTP
    /// client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, DeskbotError> {
        let reference = match &config.reference_file {
            Some(path) => ReferenceData::from_file(path)?,
            None => ReferenceData::builtin()?,
        };
        let tickets = Arc::new(TicketClient::from_config(&config)?);
        Ok(Self::with_parts(config, tickets, reference))
    }

    #[must_use]
    pub fn with_parts(
        config: AppConfig,
        tickets: Arc<dyn TicketSource>,
        reference: ReferenceData,
    ) -> Self {
        let sessions = SessionStore::new(config.session_ttl);
        Self {
            config,
            tickets,
            reference,
            sessions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Dispatches on the `command` field. Payloads without one are treated as
    /// ticket lookups.
    pub async fn handle_command(&self, event: &SlackCommandEvent) -> SlackReply {
        let command = event.command.trim();
        if command.is_empty() || command == self.config.tickets_command {
            self.lookup_tickets(&event.text).await
        } else if command == self.config.location_command {
            self.handle_location(&event.user_id, &event.text)
        } else {
            warn!(command, "Unknown slash command");
            SlackReply::ephemeral(format!("Unknown command {command}"))
        }
    }

    pub async fn lookup_tickets(&self, text: &str) -> SlackReply {
        let Some(query) = TicketQuery::parse(text) else {
            return SlackReply::ephemeral(MISSING_ROBOT_MESSAGE);
        };

        let since = query.range.cutoff(Utc::now());
        info!(
            robot = %query.robot,
            days = query.range.days(),
            mode = %self.config.match_mode,
            "Looking up robot tickets"
        );

        let tickets = match self.tickets.tickets_updated_since(since).await {
            Ok(tickets) => tickets,
            Err(e) => {
                error!(robot = %query.robot, "Ticket fetch failed: {}", e);
                return SlackReply::ephemeral(e.to_string());
            }
        };

        let matcher = RobotMatcher::new(self.config.match_mode, &query.robot);
        let ctx = ReportContext {
            portal_base_url: &self.config.portal_base_url,
            timezone: self.config.display_timezone,
            reference: &self.reference,
        };
        SlackReply::in_channel(render_ticket_report(&tickets, &query.robot, &matcher, &ctx))
    }

    /// Two-step location flow: a code opens a pending entry, a site-menu key
    /// consumes it.
    pub fn handle_location(&self, user_id: &str, text: &str) -> SlackReply {
        let user_id = user_id.trim();
        let text = text.trim();

        if user_id.is_empty() {
            return SlackReply::ephemeral(UNKNOWN_USER_MESSAGE);
        }
        if text.is_empty() {
            return SlackReply::ephemeral(LOCATION_USAGE_MESSAGE);
        }

        if let Some(site) = self.reference.site_by_menu_key(text) {
            let Some(code) = self.sessions.take(user_id) else {
                return SlackReply::ephemeral(NO_PENDING_LOCATION_MESSAGE);
            };
            return match decode_location(&code, &site.name, &self.reference) {
                Ok(decoded) => {
                    info!(user_id, site = %site.name, "Decoded location");
                    SlackReply::ephemeral(decoded.render())
                }
                Err(e) => {
                    warn!(user_id, code = %code, "Location decode failed: {}", e);
                    SlackReply::ephemeral(location_error_message(&e))
                }
            };
        }

        if !text.contains(':') && self.sessions.is_pending(user_id) {
            return SlackReply::ephemeral(format!(
                "בחירה לא תקינה: {text}\nבחר אתר:\n{}",
                site_menu(&self.reference)
            ));
        }

        self.sessions.begin(user_id, text);
        SlackReply::ephemeral(format!(
            "📍 התקבל המיקום {text}. באיזה אתר?\n{}",
            site_menu(&self.reference)
        ))
    }
}
