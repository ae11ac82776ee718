//! Storage-location decoding for the `aisle:(side,column,floor):cell` code.

use std::fmt;

use crate::core::reference::{ReferenceData, SiteTable};
use crate::errors::LocationError;

/// Reply sent for any malformed code.
pub const LOCATION_FORMAT_ERROR: &str =
    "❌ קוד מיקום לא תקין. הפורמט הנדרש: מעבר:(צד,עמודה,קומה):תא, לדוגמה 3:(-1,10,2):A5";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// `-1` is the left side; every other value is the right side.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        if code == -1 { Side::Left } else { Side::Right }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "שמאל",
            Side::Right => "ימין",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCode {
    pub aisle: i64,
    pub side: Side,
    pub column: i64,
    pub floor: i64,
    pub cell: String,
}

impl LocationCode {
    /// # Errors
    ///
    /// Returns a [`LocationError`] describing the first malformed part.
    pub fn parse(raw: &str) -> Result<Self, LocationError> {
        let parts: Vec<&str> = raw.trim().split(':').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(LocationError::FieldCount {
                part: "colon-separated parts",
                expected: 3,
                found: parts.len(),
            });
        }

        let position = parts[1]
            .strip_prefix('(')
            .unwrap_or(parts[1])
            .strip_suffix(')')
            .unwrap_or_else(|| parts[1].trim_start_matches('('));
        let coords: Vec<&str> = position.split(',').map(str::trim).collect();
        if coords.len() != 3 {
            return Err(LocationError::FieldCount {
                part: "position values",
                expected: 3,
                found: coords.len(),
            });
        }

        let cell = parts[2];
        if cell.is_empty() {
            return Err(LocationError::EmptyField("cell"));
        }

        Ok(Self {
            aisle: parse_field("aisle", parts[0])?,
            side: Side::from_code(parse_field("side", coords[0])?),
            column: parse_field("column", coords[1])?,
            floor: parse_field("floor", coords[2])?,
            cell: cell.to_string(),
        })
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<i64, LocationError> {
    if value.is_empty() {
        return Err(LocationError::EmptyField(field));
    }
    value.parse::<i64>().map_err(|_| LocationError::NonNumeric {
        field,
        value: value.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLocation {
    pub raw: String,
    pub site: String,
    pub code: LocationCode,
    pub max_column: i64,
    pub columns_from_back: i64,
}

impl DecodedLocation {
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "📍 מיקום {raw} באתר {site}\n\
             מעבר: {aisle}\n\
             צד: {side}\n\
             עמודה: {column} ({from_back} עמודות מהסוף, מתוך {max})\n\
             קומה: {floor}\n\
             תא: {cell}",
            raw = self.raw,
            site = self.site,
            aisle = self.code.aisle,
            side = self.code.side,
            column = self.code.column,
            from_back = self.columns_from_back,
            max = self.max_column,
            floor = self.code.floor,
            cell = self.code.cell,
        )
    }
}

/// Decodes `raw` against the table of the site called `site_name`.
///
/// # Errors
///
/// Returns a shape error for malformed codes, [`LocationError::UnknownSite`]
/// when no site has that name and [`LocationError::OutOfRange`] when the
/// column cannot be counted back from the aisle's last column.
pub fn decode_location(
    raw: &str,
    site_name: &str,
    reference: &ReferenceData,
) -> Result<DecodedLocation, LocationError> {
    let code = LocationCode::parse(raw)?;
    let site = reference
        .site_by_name(site_name)
        .ok_or_else(|| LocationError::UnknownSite(site_name.to_string()))?;
    decode_for_site(raw, code, site)
}

fn decode_for_site(
    raw: &str,
    code: LocationCode,
    site: &SiteTable,
) -> Result<DecodedLocation, LocationError> {
    let max_column = site.max_column(code.aisle);
    let columns_from_back = max_column
        .checked_sub(code.column)
        .ok_or(LocationError::OutOfRange("column"))?;
    Ok(DecodedLocation {
        raw: raw.trim().to_string(),
        site: site.name.clone(),
        columns_from_back,
        max_column,
        code,
    })
}

/// User-facing text for a decoding failure.
#[must_use]
pub fn location_error_message(error: &LocationError) -> String {
    match error {
        LocationError::UnknownSite(name) => format!("❌ אתר לא מוכר: {name}"),
        LocationError::FieldCount { .. }
        | LocationError::NonNumeric { .. }
        | LocationError::EmptyField(_)
        | LocationError::OutOfRange(_) => LOCATION_FORMAT_ERROR.to_string(),
    }
}

/// Numbered site menu shown after a location code is received.
#[must_use]
pub fn site_menu(reference: &ReferenceData) -> String {
    reference
        .sites()
        .iter()
        .map(|site| format!("{} - {}", site.menu_key, site.name))
        .collect::<Vec<_>>()
        .join("\n")
}
