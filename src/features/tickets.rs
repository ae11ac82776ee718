//! Robot ticket lookup: range keywords, matching strategies and the reply template.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::core::models::Ticket;
use crate::core::reference::ReferenceData;

pub const TICKET_SEPARATOR: &str = "------------------------------------";
pub const PRIORITY_TAG: &str = "🔥";

/// How far back a lookup searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchRange {
    #[default]
    TwoWeeks,
    OneMonth,
    TwoMonths,
}

impl SearchRange {
    /// Maps a range keyword to a range; anything unrecognized means two weeks.
    #[must_use]
    pub fn from_keyword(keyword: Option<&str>) -> Self {
        match keyword.map(str::trim) {
            Some("1m") => SearchRange::OneMonth,
            Some("2m") => SearchRange::TwoMonths,
            _ => SearchRange::TwoWeeks,
        }
    }

    #[must_use]
    pub fn days(self) -> i64 {
        match self {
            SearchRange::TwoWeeks => 14,
            SearchRange::OneMonth => 30,
            SearchRange::TwoMonths => 60,
        }
    }

    #[must_use]
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

/// Parsed ticket-lookup command text: `<robot> [range]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    pub robot: String,
    pub range: SearchRange,
}

impl TicketQuery {
    /// Returns `None` when the text carries no robot token.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let robot = parts.next()?.to_string();
        let range = SearchRange::from_keyword(parts.next());
        Some(Self { robot, range })
    }
}

/// Rule deciding whether a ticket belongs to a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Raw token contained in subject or description.
    Substring,
    /// Raw token, zero-stripped digits, or the `LR%08d` form.
    #[default]
    Canonical,
    /// Word-bounded regex allowing an `Aisle: n | Robot:` prefix and letter prefix.
    Pattern,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(MatchMode::Substring),
            "canonical" => Ok(MatchMode::Canonical),
            "pattern" | "regex" => Ok(MatchMode::Pattern),
            other => Err(format!(
                "unknown match mode {other:?} (expected substring, canonical or pattern)"
            )),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchMode::Substring => "substring",
            MatchMode::Canonical => "canonical",
            MatchMode::Pattern => "pattern",
        })
    }
}

/// Strips a leading letter prefix and zero padding: `LR00002255` -> `2255`.
///
/// Tokens without digits are only lowercased.
#[must_use]
pub fn canonicalize_robot_token(token: &str) -> String {
    let lowered = token.trim().to_lowercase();
    if !lowered.chars().any(|c| c.is_ascii_digit()) {
        return lowered;
    }
    let digits = lowered
        .trim_start_matches(|c: char| c.is_alphabetic())
        .trim_start_matches('0');
    if digits.is_empty() {
        "0".to_string()
    } else {
        digits.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct RobotMatcher {
    mode: MatchMode,
    raw: String,
    canonical: String,
    padded: Option<String>,
    pattern: Option<Regex>,
}

impl RobotMatcher {
    #[must_use]
    pub fn new(mode: MatchMode, token: &str) -> Self {
        let raw = token.trim().to_lowercase();
        let canonical = canonicalize_robot_token(token);
        let padded = canonical
            .parse::<u64>()
            .ok()
            .map(|n| format!("lr{n:08}"));

        let pattern = if mode == MatchMode::Pattern {
            let body = if canonical.chars().all(|c| c.is_ascii_digit()) {
                format!(r"\b[a-z]*0*{}\b", regex::escape(&canonical))
            } else {
                format!(r"\b{}\b", regex::escape(&canonical))
            };
            let source = format!(r"(?i)(?:aisle:\s*\d+\s*\|\s*robot:\s*)?{body}");
            match Regex::new(&source) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(token = %token, "Robot pattern did not compile, using canonical match: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            mode,
            raw,
            canonical,
            padded,
            pattern,
        }
    }

    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.matches_text(&ticket.subject)
            || ticket
                .description_text
                .as_deref()
                .is_some_and(|d| self.matches_text(d))
    }

    fn matches_text(&self, text: &str) -> bool {
        if self.raw.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        match (self.mode, &self.pattern) {
            (MatchMode::Substring, _) => lowered.contains(&self.raw),
            (MatchMode::Pattern, Some(re)) => re.is_match(text),
            (MatchMode::Canonical | MatchMode::Pattern, _) => {
                lowered.contains(&self.raw)
                    || lowered.contains(&self.canonical)
                    || self
                        .padded
                        .as_deref()
                        .is_some_and(|padded| lowered.contains(padded))
            }
        }
    }
}

/// Values the reply template needs beyond the tickets themselves.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub portal_base_url: &'a str,
    pub timezone: Tz,
    pub reference: &'a ReferenceData,
}

#[must_use]
pub fn no_tickets_message(token: &str) -> String {
    format!("No tickets found for robot {token}")
}

/// Renders every matching ticket, priority requesters first, otherwise in API order.
#[must_use]
pub fn render_ticket_report(
    tickets: &[Ticket],
    token: &str,
    matcher: &RobotMatcher,
    ctx: &ReportContext<'_>,
) -> String {
    let (priority, regular): (Vec<&Ticket>, Vec<&Ticket>) = tickets
        .iter()
        .filter(|ticket| matcher.matches(ticket))
        .partition(|ticket| {
            ticket
                .requester_name()
                .is_some_and(|name| ctx.reference.is_priority_requester(name))
        });

    if priority.is_empty() && regular.is_empty() {
        return no_tickets_message(token);
    }

    priority
        .iter()
        .map(|ticket| format_ticket(ticket, true, ctx))
        .chain(regular.iter().map(|ticket| format_ticket(ticket, false, ctx)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_ticket(ticket: &Ticket, priority: bool, ctx: &ReportContext<'_>) -> String {
    let tag = if priority {
        format!("{PRIORITY_TAG} ")
    } else {
        String::new()
    };
    let link = format!("{}/a/tickets/{}", ctx.portal_base_url, ticket.id);
    let status = ticket
        .status
        .as_ref()
        .map(|s| format!("*Status:* {s}\n"))
        .unwrap_or_default();

    format!(
        "{tag}*Ticket:* <{link}|#{id}>\n*Subject:* {subject}\n{status}*Date:* {date}\n{TICKET_SEPARATOR}",
        id = ticket.id,
        subject = ticket.subject,
        date = format_created_at(&ticket.created_at, ctx.timezone),
    )
}

/// `dd/mm/YYYY` in the display timezone; unparseable timestamps are shown as sent.
#[must_use]
pub fn format_created_at(created_at: &str, timezone: Tz) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|ts| ts.with_timezone(&timezone).format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Requester, TicketStatus};
    use chrono::TimeZone;

    fn ticket(id: u64, subject: &str) -> Ticket {
        Ticket {
            id,
            subject: subject.to_string(),
            description_text: None,
            created_at: "2025-03-01T08:30:00Z".to_string(),
            requester: None,
            status: None,
        }
    }

    fn with_requester(mut t: Ticket, name: &str) -> Ticket {
        t.requester = Some(Requester {
            name: Some(name.to_string()),
        });
        t
    }

    fn reference() -> ReferenceData {
        ReferenceData::builtin().unwrap()
    }

    fn ctx(reference: &ReferenceData) -> ReportContext<'_> {
        ReportContext {
            portal_base_url: "https://acme.freshdesk.com",
            timezone: Tz::UTC,
            reference,
        }
    }

    #[test]
    fn unrecognized_range_keywords_default_to_two_weeks() {
        for keyword in [None, Some(""), Some("3m"), Some("2_weeks"), Some("forever")] {
            assert_eq!(SearchRange::from_keyword(keyword).days(), 14, "{keyword:?}");
        }
        assert_eq!(SearchRange::from_keyword(Some("1m")).days(), 30);
        assert_eq!(SearchRange::from_keyword(Some("2m")).days(), 60);
    }

    #[test]
    fn cutoff_subtracts_range_days() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        let cutoff = SearchRange::OneMonth.cutoff(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn query_parses_robot_and_optional_range() {
        assert_eq!(
            TicketQuery::parse("  LR00002255  2m "),
            Some(TicketQuery {
                robot: "LR00002255".into(),
                range: SearchRange::TwoMonths,
            })
        );
        assert_eq!(TicketQuery::parse("2255 soon").unwrap().range, SearchRange::TwoWeeks);
        assert!(TicketQuery::parse("   ").is_none());
    }

    #[test]
    fn canonicalize_strips_prefix_and_padding() {
        assert_eq!(canonicalize_robot_token("LR00002255"), "2255");
        assert_eq!(canonicalize_robot_token("002255"), "2255");
        assert_eq!(canonicalize_robot_token("E17"), "17");
        assert_eq!(canonicalize_robot_token("0000"), "0");
        assert_eq!(canonicalize_robot_token("Shuttle"), "shuttle");
    }

    #[test]
    fn canonical_match_finds_padded_subject() {
        let reference = reference();
        let tickets = vec![ticket(101, "LR00002255 needs service"), ticket(102, "unrelated")];
        let matcher = RobotMatcher::new(MatchMode::Canonical, "2255");

        let report = render_ticket_report(&tickets, "2255", &matcher, &ctx(&reference));

        assert_eq!(report.matches(TICKET_SEPARATOR).count(), 1);
        assert!(report.contains("<https://acme.freshdesk.com/a/tickets/101|#101>"));
        assert!(!report.contains("#102"));
    }

    #[test]
    fn canonical_match_finds_short_token_from_padded_query() {
        let matcher = RobotMatcher::new(MatchMode::Canonical, "LR00002255");
        assert!(matcher.matches(&ticket(1, "robot 2255 stuck")));
        assert!(matcher.matches(&ticket(2, "lr00002255 stuck")));
        assert!(!matcher.matches(&ticket(3, "robot 2256 stuck")));
    }

    #[test]
    fn substring_mode_only_uses_raw_token() {
        let matcher = RobotMatcher::new(MatchMode::Substring, "002255");
        assert!(matcher.matches(&ticket(1, "LR00002255 needs service")));
        assert!(!matcher.matches(&ticket(2, "robot 2255 stuck")));
    }

    #[test]
    fn pattern_mode_respects_word_boundaries() {
        let matcher = RobotMatcher::new(MatchMode::Pattern, "2255");
        assert!(matcher.matches(&ticket(1, "Aisle: 3 | Robot: LR00002255")));
        assert!(matcher.matches(&ticket(2, "robot E2255 fault")));
        assert!(matcher.matches(&ticket(3, "2255")));
        assert!(!matcher.matches(&ticket(4, "robot 12255 fault")));
        assert!(!matcher.matches(&ticket(5, "robot 22550 fault")));
    }

    #[test]
    fn description_is_searched_too() {
        let mut t = ticket(1, "Robot fault");
        t.description_text = Some("Unit LR00002255 stopped in aisle 3".into());
        let matcher = RobotMatcher::new(MatchMode::Canonical, "2255");
        assert!(matcher.matches(&t));
    }

    #[test]
    fn no_matches_yields_not_found_message() {
        let reference = reference();
        let tickets = vec![ticket(1, "unrelated")];
        let matcher = RobotMatcher::new(MatchMode::Canonical, "2255");
        let report = render_ticket_report(&tickets, "2255", &matcher, &ctx(&reference));
        assert_eq!(report, "No tickets found for robot 2255");
    }

    #[test]
    fn priority_requesters_move_to_front_in_stable_order() {
        let reference = reference();
        let tickets = vec![
            ticket(1, "2255 first"),
            with_requester(ticket(2, "2255 second"), "Mor Levi"),
            ticket(3, "2255 third"),
            with_requester(ticket(4, "2255 fourth"), "WAR ROOM"),
        ];
        let matcher = RobotMatcher::new(MatchMode::Canonical, "2255");
        let report = render_ticket_report(&tickets, "2255", &matcher, &ctx(&reference));

        let order: Vec<usize> = ["#2>", "#4>", "#1>", "#3>"]
            .iter()
            .map(|needle| report.find(needle).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{report}");
        assert!(report.starts_with("🔥 *Ticket:*"));
        assert_eq!(report.matches(PRIORITY_TAG).count(), 2);
    }

    #[test]
    fn block_template_includes_status_and_date() {
        let reference = reference();
        let mut t = ticket(7, "LR00002255 battery");
        t.status = Some(TicketStatus::Code(3));
        let matcher = RobotMatcher::new(MatchMode::Canonical, "2255");
        let report = render_ticket_report(&[t], "2255", &matcher, &ctx(&reference));

        assert_eq!(
            report,
            "*Ticket:* <https://acme.freshdesk.com/a/tickets/7|#7>\n\
             *Subject:* LR00002255 battery\n\
             *Status:* Pending\n\
             *Date:* 01/03/2025\n\
             ------------------------------------"
        );
    }

    #[test]
    fn created_at_is_rendered_in_display_timezone() {
        assert_eq!(
            format_created_at("2025-03-01T23:30:00Z", chrono_tz::Asia::Jerusalem),
            "02/03/2025"
        );
        assert_eq!(format_created_at("yesterday", Tz::UTC), "yesterday");
    }

    #[test]
    fn match_mode_parses_case_insensitively() {
        assert_eq!("Pattern".parse::<MatchMode>(), Ok(MatchMode::Pattern));
        assert_eq!("SUBSTRING".parse::<MatchMode>(), Ok(MatchMode::Substring));
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }
}
