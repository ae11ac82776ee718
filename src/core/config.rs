use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::errors::DeskbotError;
use crate::features::tickets::MatchMode;

pub const DEFAULT_FETCH_CAP: usize = 300;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 900;
pub const DEFAULT_TICKETS_COMMAND: &str = "/robot";
pub const DEFAULT_LOCATION_COMMAND: &str = "/location";

/// Where tickets are fetched from and how the request is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketBackend {
    /// Freshdesk v2 with the API key as basic-auth user and a placeholder password.
    Freshdesk { endpoint: String, api_key: String },
    /// Alternate backend reached with a bearer token.
    Bearer { endpoint: String, token: String },
}

impl TicketBackend {
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            TicketBackend::Freshdesk { endpoint, .. } | TicketBackend::Bearer { endpoint, .. } => {
                endpoint
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_bot_token: String,
    pub slack_signing_secret: Option<String>,
    /// Base URL of the helpdesk portal, used for ticket links.
    pub portal_base_url: String,
    pub ticket_backend: TicketBackend,
    pub match_mode: MatchMode,
    pub fetch_cap: usize,
    pub http_timeout: Duration,
    pub session_ttl: Duration,
    pub display_timezone: Tz,
    pub tickets_command: String,
    pub location_command: String,
    pub reference_file: Option<PathBuf>,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns [`DeskbotError::ConfigError`] naming the first missing or invalid variable.
    pub fn from_env() -> Result<Self, DeskbotError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so callers can supply values
    /// without touching the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`DeskbotError::ConfigError`] naming the first missing or invalid variable.
    pub fn from_source<F>(lookup: F) -> Result<Self, DeskbotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| config_error(format!("{key}: environment variable not found")))
        };

        let slack_bot_token = required("SLACK_BOT_TOKEN")?;
        let api_key = required("FRESHDESK_API_KEY")?;
        let domain = required("FRESHDESK_DOMAIN")?;
        let portal_base_url = portal_base_url(&domain);

        let ticket_backend = match (get("TICKETS_API_URL"), get("TICKETS_API_TOKEN")) {
            (Some(endpoint), Some(token)) => TicketBackend::Bearer { endpoint, token },
            (None, None) => TicketBackend::Freshdesk {
                endpoint: format!("{portal_base_url}/api/v2/tickets"),
                api_key,
            },
            (Some(_), None) => {
                return Err(config_error("TICKETS_API_TOKEN: required when TICKETS_API_URL is set"));
            }
            (None, Some(_)) => {
                return Err(config_error("TICKETS_API_URL: required when TICKETS_API_TOKEN is set"));
            }
        };

        let match_mode = match get("TICKET_MATCH_MODE") {
            Some(raw) => raw
                .parse::<MatchMode>()
                .map_err(|e| config_error(format!("TICKET_MATCH_MODE: {e}")))?,
            None => MatchMode::default(),
        };

        let fetch_cap = parse_number(get("TICKET_FETCH_CAP"), "TICKET_FETCH_CAP", DEFAULT_FETCH_CAP)?;
        if fetch_cap == 0 {
            return Err(config_error("TICKET_FETCH_CAP: must be greater than zero"));
        }
        let http_timeout = Duration::from_secs(parse_number(
            get("TICKETS_HTTP_TIMEOUT_SECS"),
            "TICKETS_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let session_ttl = Duration::from_secs(parse_number(
            get("SESSION_TTL_SECS"),
            "SESSION_TTL_SECS",
            DEFAULT_SESSION_TTL_SECS,
        )?);

        let display_timezone = match get("DISPLAY_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| config_error(format!("DISPLAY_TIMEZONE: {e}")))?,
            None => Tz::UTC,
        };

        Ok(Self {
            slack_bot_token,
            slack_signing_secret: get("SLACK_SIGNING_SECRET"),
            portal_base_url,
            ticket_backend,
            match_mode,
            fetch_cap,
            http_timeout,
            session_ttl,
            display_timezone,
            tickets_command: get("TICKETS_COMMAND")
                .unwrap_or_else(|| DEFAULT_TICKETS_COMMAND.to_string()),
            location_command: get("LOCATION_COMMAND")
                .unwrap_or_else(|| DEFAULT_LOCATION_COMMAND.to_string()),
            reference_file: get("DESKBOT_REFERENCE_FILE").map(PathBuf::from),
        })
    }
}

fn config_error(message: impl Into<String>) -> DeskbotError {
    DeskbotError::ConfigError(message.into())
}

/// Accepts either a bare host (`acme.freshdesk.com`) or a full base URL.
fn portal_base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<String>,
    key: &str,
    default: T,
) -> Result<T, DeskbotError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| config_error(format!("{key}: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn config_message(err: DeskbotError) -> String {
        match err {
            DeskbotError::ConfigError(message) => message,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    const BASE: &[(&str, &str)] = &[
        ("SLACK_BOT_TOKEN", "xoxb-1"),
        ("FRESHDESK_API_KEY", "key"),
        ("FRESHDESK_DOMAIN", "acme.freshdesk.com"),
    ];

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = AppConfig::from_source(source(BASE)).unwrap();
        assert_eq!(config.portal_base_url, "https://acme.freshdesk.com");
        assert_eq!(
            config.ticket_backend,
            TicketBackend::Freshdesk {
                endpoint: "https://acme.freshdesk.com/api/v2/tickets".into(),
                api_key: "key".into(),
            }
        );
        assert_eq!(config.match_mode, MatchMode::Canonical);
        assert_eq!(config.fetch_cap, DEFAULT_FETCH_CAP);
        assert_eq!(config.session_ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
        assert_eq!(config.display_timezone, Tz::UTC);
        assert_eq!(config.tickets_command, "/robot");
        assert_eq!(config.location_command, "/location");
        assert!(config.slack_signing_secret.is_none());
    }

    #[test]
    fn missing_required_value_is_reported_by_name() {
        let err = config_message(AppConfig::from_source(source(&BASE[..2])).unwrap_err());
        assert!(err.starts_with("FRESHDESK_DOMAIN"), "{err}");
    }

    #[test]
    fn blank_required_value_counts_as_missing() {
        let mut pairs = BASE.to_vec();
        pairs[0] = ("SLACK_BOT_TOKEN", "  ");
        let err = config_message(AppConfig::from_source(source(&pairs)).unwrap_err());
        assert!(err.starts_with("SLACK_BOT_TOKEN"), "{err}");
    }

    #[test]
    fn bearer_backend_needs_both_url_and_token() {
        let mut pairs = BASE.to_vec();
        pairs.push(("TICKETS_API_URL", "https://tickets.internal/v1/tickets"));
        let err = config_message(AppConfig::from_source(source(&pairs)).unwrap_err());
        assert!(err.starts_with("TICKETS_API_TOKEN"), "{err}");

        pairs.push(("TICKETS_API_TOKEN", "secret"));
        let config = AppConfig::from_source(source(&pairs)).unwrap();
        assert_eq!(
            config.ticket_backend.endpoint(),
            "https://tickets.internal/v1/tickets"
        );
    }

    #[test]
    fn domain_with_scheme_is_kept_verbatim() {
        let mut pairs = BASE.to_vec();
        pairs[2] = ("FRESHDESK_DOMAIN", "http://127.0.0.1:8080/");
        let config = AppConfig::from_source(source(&pairs)).unwrap();
        assert_eq!(config.portal_base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn invalid_optional_values_are_rejected() {
        for (key, value) in [
            ("TICKET_MATCH_MODE", "fuzzy"),
            ("TICKET_FETCH_CAP", "lots"),
            ("TICKET_FETCH_CAP", "0"),
            ("DISPLAY_TIMEZONE", "Mars/Olympus"),
        ] {
            let mut pairs = BASE.to_vec();
            pairs.push((key, value));
            let err = config_message(AppConfig::from_source(source(&pairs)).unwrap_err());
            assert!(err.starts_with(key), "{key}={value}: {err}");
        }
    }

    #[test]
    fn optional_values_override_defaults() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("TICKET_MATCH_MODE", "pattern"),
            ("TICKET_FETCH_CAP", "500"),
            ("SESSION_TTL_SECS", "60"),
            ("DISPLAY_TIMEZONE", "Asia/Jerusalem"),
            ("SLACK_SIGNING_SECRET", "shh"),
        ]);
        let config = AppConfig::from_source(source(&pairs)).unwrap();
        assert_eq!(config.match_mode, MatchMode::Pattern);
        assert_eq!(config.fetch_cap, 500);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert_eq!(config.display_timezone, chrono_tz::Asia::Jerusalem);
        assert_eq!(config.slack_signing_secret.as_deref(), Some("shh"));
    }
}
