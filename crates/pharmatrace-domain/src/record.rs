//! Content-addressed records

use std::collections::BTreeMap;
use std::fmt;

/// Minimum length of a content address (a CIDv0 is 46 characters)
pub const MIN_CONTENT_ADDRESS_LEN: usize = 46;

/// Content address naming one immutable payload in the object store
///
/// The same `RecordRef` always resolves to the same payload. Refs are stored
/// exactly as the ledger reported them; [`RecordRef::check`] decides whether
/// one is well-formed enough to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef(String);

impl RecordRef {
    /// Wrap a ledger-reported content address without validating it
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the content address as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that the address is at least `min_len` ASCII alphanumeric characters
    ///
    /// # Examples
    ///
    /// ```
    /// use pharmatrace_domain::RecordRef;
    ///
    /// let ok = RecordRef::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG");
    /// assert!(ok.check(46).is_ok());
    /// assert!(RecordRef::new("Qm123").check(46).is_err());
    /// ```
    pub fn check(&self, min_len: usize) -> Result<(), String> {
        if self.0.len() < min_len {
            return Err(format!(
                "content address '{}' is {} chars (min: {})",
                self.0,
                self.0.len(),
                min_len
            ));
        }
        if let Some(c) = self.0.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(format!(
                "content address '{}' contains invalid character {:?}",
                self.0, c
            ));
        }
        Ok(())
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value of a single record field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free text
    Text(String),

    /// Numeric value
    Number(f64),

    /// Boolean flag
    Bool(bool),
}

impl FieldValue {
    /// Borrow the text if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value kind
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Decoded payload of one record: an open mapping of field names to values
///
/// The schema is not fixed. Field names are kept exactly as the payload
/// spelled them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    ///
    /// # Examples
    ///
    /// ```
    /// use pharmatrace_domain::{FieldValue, Record};
    ///
    /// let record = Record::new()
    ///     .with("batchNo", "B1023")
    ///     .with("quantity", 120.0);
    /// assert_eq!(record.get("batchNo"), Some(&FieldValue::Text("B1023".into())));
    /// assert_eq!(record.len(), 2);
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Look up a field by its exact name
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Iterate over fields in key order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CID_V0: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

    #[test]
    fn test_record_ref_check() {
        assert!(RecordRef::new(CID_V0).check(MIN_CONTENT_ADDRESS_LEN).is_ok());
        assert!(RecordRef::new("").check(MIN_CONTENT_ADDRESS_LEN).is_err());
        assert!(RecordRef::new(&CID_V0[..45]).check(MIN_CONTENT_ADDRESS_LEN).is_err());
    }

    #[test]
    fn test_record_ref_rejects_path_characters() {
        let with_slash = format!("{}/x", CID_V0);
        let err = RecordRef::new(with_slash).check(MIN_CONTENT_ADDRESS_LEN).unwrap_err();
        assert!(err.contains("invalid character"));
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::from("cold").to_string(), "cold");
        assert_eq!(FieldValue::from(2.5).to_string(), "2.5");
        assert_eq!(FieldValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_record_from_iter_last_write_wins() {
        let record: Record = vec![("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a").and_then(FieldValue::as_text), Some("3"));
    }
}
