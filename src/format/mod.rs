//! Display formatters for untrusted scalar fields
//!
//! Every function here is total: missing or garbage input degrades to
//! [`PLACEHOLDER`] instead of an empty string or a panic.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Rendered in place of any value that is missing or cannot be parsed
pub const PLACEHOLDER: &str = "-";

/// Type label of a PDF document
pub const PDF_LABEL: &str = "PDF";

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count as "2.3 MB" (binary steps, one fractional digit)
pub fn format_byte_size(bytes: Option<f64>) -> String {
    let Some(bytes) = bytes else {
        return PLACEHOLDER.to_string();
    };
    if !bytes.is_finite() || bytes <= 0.0 {
        return PLACEHOLDER.to_string();
    }

    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, SIZE_UNITS[unit])
}

/// "application/pdf" -> "PDF"
pub fn format_mime_subtype(mime: Option<&str>) -> String {
    let mime = match mime {
        Some(m) if !m.is_empty() => m,
        _ => return PLACEHOLDER.to_string(),
    };

    match mime.split('/').nth(1) {
        Some(subtype) if !subtype.is_empty() => subtype.to_uppercase(),
        _ => mime.to_string(),
    }
}

/// Host of a URL without a leading "www."; unparsable input is echoed back
pub fn extract_hostname(url: Option<&str>) -> String {
    let raw = match url {
        Some(u) if !u.is_empty() => u,
        _ => return PLACEHOLDER.to_string(),
    };

    match url::Url::parse(raw) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => host.strip_prefix("www.").unwrap_or(host).to_string(),
            _ => raw.to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

/// Short-date style used when rendering timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateLocale {
    /// 1/15/2024
    #[default]
    EnUs,
    /// 15/01/2024
    EnGb,
    /// 15.01.2024
    De,
    /// 2024-01-15
    Iso,
}

impl DateLocale {
    fn render_pattern(self) -> &'static str {
        match self {
            DateLocale::EnUs => "%-m/%-d/%Y",
            DateLocale::EnGb => "%d/%m/%Y",
            DateLocale::De => "%d.%m.%Y",
            DateLocale::Iso => "%Y-%m-%d",
        }
    }

    // chrono accepts one or two digits for %m/%d when parsing
    fn parse_pattern(self) -> &'static str {
        match self {
            DateLocale::EnUs => "%m/%d/%Y",
            DateLocale::EnGb => "%d/%m/%Y",
            DateLocale::De => "%d.%m.%Y",
            DateLocale::Iso => "%Y-%m-%d",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DateLocale::EnUs => "en-us",
            DateLocale::EnGb => "en-gb",
            DateLocale::De => "de",
            DateLocale::Iso => "iso",
        }
    }
}

impl fmt::Display for DateLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "en-us" | "en" | "us" => Ok(DateLocale::EnUs),
            "en-gb" | "gb" | "uk" => Ok(DateLocale::EnGb),
            "de" | "de-de" => Ok(DateLocale::De),
            "iso" => Ok(DateLocale::Iso),
            other => Err(format!("unknown date locale: {other}")),
        }
    }
}

/// Parse the timestamp shapes the backend is known to emit.
///
/// Instants with an offset are converted to UTC before the calendar date is
/// taken. The locale's own short form is accepted too, so a label that was
/// already formatted survives a second pass unchanged.
pub fn parse_date(raw: &str, locale: DateLocale) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(dt.date());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDate::parse_from_str(s, locale.parse_pattern()).ok()
}

/// Parse a backend timestamp to the instant it names.
///
/// Offset-less values are read as UTC and a bare date is midnight UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Format an ISO timestamp as a short en-US date
pub fn format_date(iso: Option<&str>) -> String {
    format_date_in(iso, DateLocale::default())
}

/// Format an ISO timestamp as a short date in `locale`
pub fn format_date_in(iso: Option<&str>, locale: DateLocale) -> String {
    iso.and_then(|s| parse_date(s, locale))
        .map(|date| date.format(locale.render_pattern()).to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
