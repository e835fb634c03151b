//! Field-name resolution and temporal-field detection

use crate::config::FieldAliases;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pharmatrace_domain::{FieldValue, Record};
use std::collections::HashSet;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
];

/// Unix seconds for 2000-01-01 and 2100-01-01
const EPOCH_SECS_RANGE: std::ops::Range<i64> = 946_684_800..4_102_444_800;

/// The part a field plays in rule evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Storage condition description
    StorageCondition,
    /// Manufacturer on the sending side
    SourceManufacturer,
    /// Manufacturer on the receiving side
    DestManufacturer,
    /// Declared batch number
    BatchNumber,
    /// Source or destination address
    Address,
}

/// Lowercase a key's last meaningful segment and drop non-alphanumerics
///
/// `shipment.Batch No.` → `batchno`; `addresses.0` → `addresses`.
pub(crate) fn normalize_key(key: &str) -> String {
    let segment = key
        .rsplit('.')
        .find(|s| !s.is_empty() && !s.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(key);
    segment
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Last word of a key's last meaningful segment, lowercased
///
/// Words break at non-alphanumerics and lower-to-upper case changes:
/// `shippedAt` → `at`, `received_on` → `on`, `Batch No.` → `no`.
pub(crate) fn last_key_word(key: &str) -> String {
    let segment = key
        .rsplit('.')
        .find(|s| !s.is_empty() && !s.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(key);

    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in segment.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words.pop().unwrap_or_default()
}

/// Lowercase text and collapse every run of non-alphanumerics to one space
pub(crate) fn normalize_text(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a text value parses as a date or date-time
pub(crate) fn looks_like_datetime(text: &str) -> bool {
    let text = text.trim();
    if text.len() < 8 {
        return false;
    }
    if DateTime::parse_from_rfc3339(text).is_ok() || DateTime::parse_from_rfc2822(text).is_ok() {
        return true;
    }
    DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(text, fmt).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(text, fmt).is_ok())
}

/// Whether a number (or numeric text) falls in the Unix-seconds or
/// Unix-milliseconds range of 2000..2100
pub(crate) fn looks_like_epoch(value: &FieldValue) -> bool {
    let n = match value {
        FieldValue::Number(n) if n.fract() == 0.0 => *n,
        FieldValue::Text(text) => match text.trim().parse::<i64>() {
            Ok(n) => n as f64,
            Err(_) => return false,
        },
        _ => return false,
    };
    let in_range = |v: f64| v >= EPOCH_SECS_RANGE.start as f64 && v < EPOCH_SECS_RANGE.end as f64;
    in_range(n) || in_range(n / 1000.0)
}

/// Whether the key alone names a date or time
///
/// True if the normalized key contains a temporal marker (`expiryDate`)
/// or its last word is a temporal suffix (`shippedAt`, `received_on`).
pub fn is_temporal_key(key: &str, aliases: &FieldAliases) -> bool {
    let normalized = normalize_key(key);
    if aliases
        .temporal_markers
        .iter()
        .any(|m| !m.is_empty() && normalized.contains(m.as_str()))
    {
        return true;
    }
    let last = last_key_word(key);
    aliases
        .temporal_suffixes
        .iter()
        .any(|s| s.eq_ignore_ascii_case(&last))
}

/// Whether the value alone looks like a date, date-time or epoch timestamp
pub fn is_temporal_value(value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(text) => looks_like_datetime(text) || looks_like_epoch(value),
        FieldValue::Number(_) => looks_like_epoch(value),
        FieldValue::Bool(_) => false,
    }
}

/// Whether a field holds a date or time, ignoring rule roles
///
/// True if the key names a date or time, or the value looks like one.
/// Rule evaluation goes through the role-aware check instead, so a
/// date-shaped batch number is still a batch number.
///
/// # Examples
///
/// ```
/// use pharmatrace_domain::FieldValue;
/// use pharmatrace_evaluator::{is_temporal_field, FieldAliases};
///
/// let aliases = FieldAliases::default();
/// assert!(is_temporal_field("shippedAt", &FieldValue::from("2025-03-21T10:00:00Z"), &aliases));
/// assert!(is_temporal_field("expiryDate", &FieldValue::from("soon"), &aliases));
/// assert!(is_temporal_field("dispatched", &FieldValue::Number(1711000000.0), &aliases));
/// assert!(is_temporal_field("note", &FieldValue::from("21 Mar 2025 10:00"), &aliases));
/// assert!(!is_temporal_field("batchNo", &FieldValue::from("B1023"), &aliases));
/// ```
pub fn is_temporal_field(key: &str, value: &FieldValue, aliases: &FieldAliases) -> bool {
    is_temporal_key(key, aliases) || is_temporal_value(value)
}

/// Resolves record fields to rule roles
pub(crate) struct FieldResolver {
    aliases: FieldAliases,
    storage: HashSet<String>,
    source_manufacturer: HashSet<String>,
    dest_manufacturer: HashSet<String>,
    batch: HashSet<String>,
    address: HashSet<String>,
}

impl FieldResolver {
    pub(crate) fn new(aliases: &FieldAliases) -> Self {
        let set = |names: &[String]| -> HashSet<String> { names.iter().map(|n| normalize_key(n)).collect() };
        Self {
            aliases: aliases.clone(),
            storage: set(&aliases.storage_condition),
            source_manufacturer: set(&aliases.source_manufacturer),
            dest_manufacturer: set(&aliases.dest_manufacturer),
            batch: set(&aliases.batch_number),
            address: set(&aliases.address),
        }
    }

    /// Role of a field, if any. Source roles win over destination on overlap.
    pub(crate) fn role_of(&self, key: &str) -> Option<FieldRole> {
        let normalized = normalize_key(key);
        if self.storage.contains(&normalized) {
            Some(FieldRole::StorageCondition)
        } else if self.source_manufacturer.contains(&normalized) {
            Some(FieldRole::SourceManufacturer)
        } else if self.dest_manufacturer.contains(&normalized) {
            Some(FieldRole::DestManufacturer)
        } else if self.batch.contains(&normalized) {
            Some(FieldRole::BatchNumber)
        } else if self.address.contains(&normalized) {
            Some(FieldRole::Address)
        } else {
            None
        }
    }

    /// Whether a field is a date or time for evaluation purposes
    ///
    /// Fields playing a rule role are temporal only by key; any other field
    /// is temporal by key or by value.
    pub(crate) fn is_temporal(&self, key: &str, value: &FieldValue) -> bool {
        if is_temporal_key(key, &self.aliases) {
            return true;
        }
        self.role_of(key).is_none() && is_temporal_value(value)
    }

    /// Non-temporal fields of a record playing the given role, in key order
    pub(crate) fn values<'a>(&self, record: &'a Record, role: FieldRole) -> Vec<&'a FieldValue> {
        record
            .fields()
            .filter(|(key, value)| !self.is_temporal(key, value))
            .filter(|(key, _)| self.role_of(key) == Some(role))
            .map(|(_, value)| value)
            .collect()
    }
}
