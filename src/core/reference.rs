//! Static reference data: priority requesters and per-site column tables.
//!
//! The built-in copy ships with the binary; `DESKBOT_REFERENCE_FILE` points at a
//! replacement with the same JSON shape.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::errors::DeskbotError;

const BUILTIN_REFERENCE: &str = include_str!("../../config/reference.json");

/// Column-numbering table for one physical site.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SiteTable {
    pub menu_key: String,
    pub name: String,
    pub default_max_column: i64,
    #[serde(default)]
    pub aisles: BTreeMap<i64, i64>,
}

impl SiteTable {
    /// Highest column number in `aisle`, falling back to the site default.
    #[must_use]
    pub fn max_column(&self, aisle: i64) -> i64 {
        self.aisles
            .get(&aisle)
            .copied()
            .unwrap_or(self.default_max_column)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawReference {
    #[serde(default)]
    priority_requesters: Vec<String>,
    sites: Vec<SiteTable>,
}

#[derive(Debug, Clone)]
pub struct ReferenceData {
    priority_requesters: HashSet<String>,
    sites: Vec<SiteTable>,
}

impl ReferenceData {
    /// # Errors
    ///
    /// Returns an error if the bundled JSON is malformed or inconsistent.
    pub fn builtin() -> Result<Self, DeskbotError> {
        Self::from_json(BUILTIN_REFERENCE)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not validate.
    pub fn from_file(path: &Path) -> Result<Self, DeskbotError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DeskbotError::ReferenceDataError(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// # Errors
    ///
    /// Returns an error on invalid JSON, an empty site list, or duplicate site
    /// names / menu keys.
    pub fn from_json(raw: &str) -> Result<Self, DeskbotError> {
        let parsed: RawReference = serde_json::from_str(raw)?;

        if parsed.sites.is_empty() {
            return Err(DeskbotError::ReferenceDataError(
                "at least one site is required".to_string(),
            ));
        }

        validate_sites(&parsed.sites)?;

        Ok(Self {
            priority_requesters: parsed
                .priority_requesters
                .iter()
                .map(|name| name.trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
            sites: parsed.sites,
        })
    }

    #[must_use]
    pub fn is_priority_requester(&self, name: &str) -> bool {
        self.priority_requesters
            .contains(&name.trim().to_lowercase())
    }

    #[must_use]
    pub fn sites(&self) -> &[SiteTable] {
        &self.sites
    }

    #[must_use]
    pub fn site_by_menu_key(&self, key: &str) -> Option<&SiteTable> {
        let key = key.trim();
        self.sites.iter().find(|s| s.menu_key.trim() == key)
    }

    #[must_use]
    pub fn site_by_name(&self, name: &str) -> Option<&SiteTable> {
        let name = name.trim();
        self.sites.iter().find(|s| s.name.trim() == name)
    }
}

fn validate_sites(sites: &[SiteTable]) -> Result<(), DeskbotError> {
    let mut keys = HashSet::new();
    let mut names = HashSet::new();
    for site in sites {
        if site.menu_key.trim().is_empty() {
            return Err(DeskbotError::ReferenceDataError(format!(
                "site {} has an empty menu key",
                site.name
            )));
        }
        if !keys.insert(site.menu_key.trim()) {
            return Err(DeskbotError::ReferenceDataError(format!(
                "duplicate menu key {}",
                site.menu_key
            )));
        }
        if !names.insert(site.name.trim()) {
            return Err(DeskbotError::ReferenceDataError(format!(
                "duplicate site name {}",
                site.name
            )));
        }
    }

    Ok(())
}
