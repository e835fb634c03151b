//! Evaluation verdicts

use std::fmt;

/// Outcome of evaluating a history: exactly one per evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No anomaly found
    Legitimate,

    /// An anomaly was found; carries a short human-readable reason
    Flagged(String),
}

impl Verdict {
    /// Whether the verdict is `Flagged`
    pub fn is_flagged(&self) -> bool {
        matches!(self, Verdict::Flagged(_))
    }

    /// The flag reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Legitimate => None,
            Verdict::Flagged(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Legitimate => f.write_str("Legitimate"),
            Verdict::Flagged(reason) => write!(f, "Flagged: {}", reason),
        }
    }
}

/// Deterministic rules, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Storage condition indicates poor or unsafe handling
    StorageCondition,

    /// Source and destination manufacturer names differ
    ManufacturerMismatch,

    /// Batch number does not follow the prefix convention
    BatchFormat,

    /// Source or destination address is not a known locality
    UnknownLocality,
}

impl RuleKind {
    /// All rules in the fixed order they are checked
    pub const ORDERED: [RuleKind; 4] = [
        RuleKind::StorageCondition,
        RuleKind::ManufacturerMismatch,
        RuleKind::BatchFormat,
        RuleKind::UnknownLocality,
    ];

    /// Get the rule name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::StorageCondition => "storage_condition",
            RuleKind::ManufacturerMismatch => "manufacturer_mismatch",
            RuleKind::BatchFormat => "batch_format",
            RuleKind::UnknownLocality => "unknown_locality",
        }
    }
}

/// Which evaluation layer produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictSource {
    /// A deterministic rule fired
    Rule(RuleKind),

    /// The heuristic reasoning pass answered canonically
    Heuristic,

    /// No rule fired and the heuristic was not consulted (empty history or disabled)
    NoEvidence,

    /// No rule fired and the heuristic failed; defaulted to `Legitimate`
    Fallback,
}

impl fmt::Display for VerdictSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictSource::Rule(kind) => write!(f, "rule:{}", kind.as_str()),
            VerdictSource::Heuristic => f.write_str("heuristic"),
            VerdictSource::NoEvidence => f.write_str("no_evidence"),
            VerdictSource::Fallback => f.write_str("fallback"),
        }
    }
}
