//! Helpdesk ticket API client
//!
//! Pages through the ticket list endpoint until the backend runs dry or the
//! accumulation cap is reached. There is no retry: the first non-success page
//! aborts the whole fetch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::core::config::{AppConfig, TicketBackend};
use crate::core::models::Ticket;
use crate::errors::DeskbotError;

/// Page size requested from the helpdesk; Freshdesk caps it at 100.
pub const PAGE_SIZE: usize = 100;

/// Freshdesk ignores the basic-auth password when the user is an API key.
const PLACEHOLDER_PASSWORD: &str = "X";

/// Source of tickets updated since a point in time.
#[async_trait]
pub trait TicketSource: Send + Sync {
    /// # Errors
    ///
    /// Returns [`DeskbotError::TicketApiError`] with the response body on a
    /// non-success status, or [`DeskbotError::HttpError`] on transport failure.
    async fn tickets_updated_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, DeskbotError>;
}

pub struct TicketClient {
    http: Client,
    backend: TicketBackend,
    page_size: usize,
    max_results: usize,
}

impl TicketClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        backend: TicketBackend,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Self, DeskbotError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            backend,
            page_size: PAGE_SIZE,
            max_results,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, DeskbotError> {
        Self::new(
            config.ticket_backend.clone(),
            config.fetch_cap,
            config.http_timeout,
        )
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn page_request(&self, page: usize, since: &str) -> RequestBuilder {
        let request = self.http.get(self.backend.endpoint()).query(&[
            ("page", page.to_string()),
            ("per_page", self.page_size.to_string()),
            ("updated_since", since.to_string()),
        ]);

        match &self.backend {
            TicketBackend::Freshdesk { api_key, .. } => request
                .query(&[("include", "requester")])
                .basic_auth(api_key, Some(PLACEHOLDER_PASSWORD)),
            TicketBackend::Bearer { token, .. } => request.bearer_auth(token),
        }
    }

    async fn fetch_page(&self, page: usize, since: &str) -> Result<Vec<Ticket>, DeskbotError> {
        let response = self.page_request(page, since).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, page, "Ticket API returned an error: {}", body);
            return Err(DeskbotError::TicketApiError(body));
        }

        Ok(response.json::<Vec<Ticket>>().await?)
    }
}

#[async_trait]
impl TicketSource for TicketClient {
    async fn tickets_updated_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Ticket>, DeskbotError> {
        let since = format_updated_since(since);
        let mut tickets: Vec<Ticket> = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.fetch_page(page, &since).await?;
            let batch_len = batch.len();
            debug!(page, batch_len, total = tickets.len(), "Fetched ticket page");

            if batch.is_empty() {
                break;
            }

            let room = self.max_results - tickets.len();
            tickets.extend(batch.into_iter().take(room));

            if tickets.len() >= self.max_results || batch_len < self.page_size {
                break;
            }
            page += 1;
        }

        info!(count = tickets.len(), pages = page, %since, "Ticket fetch complete");
        Ok(tickets)
    }
}

/// The `updated_since` filter value: UTC, second precision, `Z` suffix.
#[must_use]
pub fn format_updated_since(since: DateTime<Utc>) -> String {
    since.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn updated_since_drops_subsecond_precision() {
        let ts = Utc
            .with_ymd_and_hms(2025, 3, 1, 8, 30, 5)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(250))
            .unwrap();
        assert_eq!(format_updated_since(ts), "2025-03-01T08:30:05Z");
    }
}
