//! String shape predicates: temporal formats, numeric literals, identifiers.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// ISO-8601 temporal shapes, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    DateTime,
    Date,
    Time,
}

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})[Tt ](\d{2}):(\d{2})(?::(\d{2})(?:[.,]\d+)?)?(?:[Zz]|[+-]\d{2}(?::?\d{2})?)?$")
        .unwrap()
});

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2})(?::(\d{2})(?:[.,]\d+)?)?(?:[Zz]|[+-]\d{2}(?::?\d{2})?)?$").unwrap()
});

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

static SEASON_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2,4}\s*[/\-_]\s*\d{2,4}$").unwrap());

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.:\-]*$").unwrap());

const MAX_TAG_LEN: usize = 64;

/// Classify one string against the temporal patterns. Shapes that match the
/// pattern but name an impossible calendar date or clock time are rejected.
pub fn temporal_kind(s: &str) -> Option<Temporal> {
    if let Some(caps) = DATETIME_REGEX.captures(s) {
        let ok = valid_date(&caps[1])
            && valid_clock(&caps[2], &caps[3], caps.get(4).map(|m| m.as_str()));
        return ok.then_some(Temporal::DateTime);
    }
    if DATE_REGEX.is_match(s) {
        return valid_date(s).then_some(Temporal::Date);
    }
    if let Some(caps) = TIME_REGEX.captures(s) {
        let ok = valid_clock(&caps[1], &caps[2], caps.get(3).map(|m| m.as_str()));
        return ok.then_some(Temporal::Time);
    }
    None
}

fn valid_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn valid_clock(hour: &str, minute: &str, second: Option<&str>) -> bool {
    let in_range = |s: &str, max: u32| s.parse::<u32>().map(|n| n <= max).unwrap_or(false);
    // 60 admits leap seconds
    in_range(hour, 23) && in_range(minute, 59) && second.map(|s| in_range(s, 60)).unwrap_or(true)
}

pub fn is_numeric_string(s: &str) -> bool {
    NUMERIC_REGEX.is_match(s.trim())
}

pub fn is_boolean_word(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "true" | "false" | "yes" | "no")
}

pub fn is_season_like(s: &str) -> bool {
    SEASON_REGEX.is_match(s.trim())
}

/// Could this value be a type tag? Tags start with a letter and contain no
/// whitespace; numbers, booleans, dates and seasons never qualify.
pub fn is_identifier_like(s: &str) -> bool {
    s.len() <= MAX_TAG_LEN
        && IDENTIFIER_REGEX.is_match(s)
        && !is_boolean_word(s)
        && !is_numeric_string(s)
        && !is_season_like(s)
        && temporal_kind(s).is_none()
}

/// Field names that conventionally hold identifiers or keys.
pub fn looks_like_id_field(name: &str) -> bool {
    let name = name.trim_start_matches(|c: char| !c.is_alphanumeric());
    let lower = name.to_ascii_lowercase();
    if matches!(
        lower.as_str(),
        "id" | "ids" | "uuid" | "guid" | "key" | "keys" | "identifier" | "oid" | "pk"
    ) {
        return true;
    }
    for suffix in ["id", "uuid", "guid", "key"] {
        for sep in ['_', '-', '.'] {
            if lower.ends_with(&format!("{sep}{suffix}")) {
                return true;
            }
        }
    }
    // camelCase: userId, orderUUID, cacheKey
    ["Id", "ID", "Uuid", "UUID", "Guid", "GUID", "Key"].iter().any(|suffix| {
        name.len() > suffix.len()
            && name.ends_with(suffix)
            && name[..name.len() - suffix.len()]
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    })
}

/// Field names that conventionally carry a variant tag: `type`, `kind`,
/// `@type`, `event_type`, `messageKind` and the like.
pub fn looks_like_tag_field(name: &str) -> bool {
    let name = name.trim_start_matches(|c: char| !c.is_alphanumeric());
    let lower = name.to_ascii_lowercase();
    if matches!(
        lower.as_str(),
        "type" | "kind" | "tag" | "variant" | "event" | "category" | "class" | "discriminator"
    ) {
        return true;
    }
    for suffix in ["type", "kind"] {
        for sep in ['_', '-', '.'] {
            if lower.ends_with(&format!("{sep}{suffix}")) {
                return true;
            }
        }
    }
    ["Type", "Kind"].iter().any(|suffix| {
        name.len() > suffix.len()
            && name.ends_with(suffix)
            && name[..name.len() - suffix.len()]
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    })
}
