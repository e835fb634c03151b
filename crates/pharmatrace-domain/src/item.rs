//! Item and custodian identifiers

use std::fmt;

/// Identifier of a tracked item on the ledger
///
/// Supplied by the scanning surface. Only non-emptiness is checked here;
/// decoding scan payloads into an id is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    /// Create an item id from raw scanner input
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// Returns error if the trimmed input is empty
    ///
    /// # Examples
    ///
    /// ```
    /// use pharmatrace_domain::ItemId;
    ///
    /// let id = ItemId::parse(" 42 ").unwrap();
    /// assert_eq!(id.as_str(), "42");
    /// assert!(ItemId::parse("   ").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("Item id cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A custodian identity as reported by the ledger (typically an address)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Wrap a ledger-reported identity
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the identity as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_trims_input() {
        let id = ItemId::parse("\n 1001\t").unwrap();
        assert_eq!(id.as_str(), "1001");
        assert_eq!(id.to_string(), "1001");
    }

    #[test]
    fn test_item_id_rejects_empty() {
        assert!(ItemId::parse("").is_err());
        assert!(ItemId::parse(" \t ").is_err());
        assert!("".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_identity_display() {
        let owner = Identity::new("0xAbC");
        assert_eq!(owner.to_string(), "0xAbC");
    }
}
