//! Reconstructed provenance history and ownership

use crate::{Identity, Record, RecordRef};

/// One resolved record together with its place in the provenance chain
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Zero-based position of the ref in the ledger's provenance chain
    pub position: usize,

    /// Content address the record was fetched from
    pub record_ref: RecordRef,

    /// Decoded payload
    pub record: Record,
}

/// Records that resolved successfully, in provenance-chain order
///
/// Unresolved chain entries are absent, never reordered or fabricated.
/// Positions are strictly increasing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from entries in any order
    ///
    /// Entries are sorted by chain position. If two entries claim the same
    /// position only the first is kept.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.sort_by_key(|e| e.position);
        entries.dedup_by_key(|e| e.position);
        Self { entries }
    }

    /// Build a history from bare records, numbering them 0..n
    ///
    /// Useful for evaluating records that did not come from a ledger
    /// (e.g. a local JSON export).
    pub fn from_records(records: Vec<Record>) -> Self {
        let entries = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| HistoryEntry {
                position,
                record_ref: RecordRef::new(format!("local:{}", position)),
                record,
            })
            .collect();
        Self { entries }
    }

    /// Entries in chain order
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Records in chain order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Number of resolved records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no record resolved
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Current and prior custodians of an item, as reported by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    /// Current owner
    pub current: Identity,

    /// Prior owners, oldest first
    pub prior: Vec<Identity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(position: usize, batch: &str) -> HistoryEntry {
        HistoryEntry {
            position,
            record_ref: RecordRef::new(format!("ref{}", position)),
            record: Record::new().with("batchNo", batch),
        }
    }

    #[test]
    fn test_from_entries_sorts_by_position() {
        let history = History::from_entries(vec![entry(4, "B4"), entry(0, "B0"), entry(2, "B2")]);
        let positions: Vec<_> = history.entries().iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![0, 2, 4]);
    }

    #[test]
    fn test_from_entries_drops_duplicate_positions() {
        let history = History::from_entries(vec![entry(1, "first"), entry(1, "second")]);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_from_records_numbers_positions() {
        let history = History::from_records(vec![Record::new(), Record::new()]);
        assert_eq!(history.entries()[1].position, 1);
        assert_eq!(history.entries()[1].record_ref.as_str(), "local:1");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: whatever order entries arrive in, the history is in chain order
        #[test]
        fn test_history_order_is_chain_order(positions in proptest::collection::hash_set(0usize..500, 0..40)) {
            let mut entries: Vec<HistoryEntry> = positions
                .iter()
                .map(|&p| HistoryEntry {
                    position: p,
                    record_ref: RecordRef::new(format!("ref{}", p)),
                    record: Record::new(),
                })
                .collect();
            entries.reverse();

            let history = History::from_entries(entries);
            let got: Vec<_> = history.entries().iter().map(|e| e.position).collect();
            let mut expected: Vec<_> = positions.into_iter().collect();
            expected.sort();
            prop_assert_eq!(got, expected);
        }
    }
}
