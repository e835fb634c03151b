//! Deterministic anomaly rules

use crate::config::EvaluatorConfig;
use crate::error::EvaluatorError;
use crate::fields::{normalize_text, FieldResolver, FieldRole};
use crate::gazetteer::Gazetteer;
use pharmatrace_domain::{FieldValue, History, RuleKind};
use tracing::debug;

/// Reason reported by the batch-format rule
pub const BATCH_FORMAT_REASON: &str = "batch number does not follow expected format";

/// A deterministic rule that fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    /// Which rule fired
    pub kind: RuleKind,

    /// Short human-readable reason
    pub reason: String,

    /// Chain position of the record that triggered it
    pub position: usize,
}

/// Applies the four deterministic rules in fixed order
///
/// The first rule that fires decides; later rules are not evaluated.
/// Date and time fields are invisible to every rule.
pub struct RuleEngine {
    resolver: FieldResolver,
    poor_terms: Vec<String>,
    batch_prefix: String,
    batch_prefix_case_sensitive: bool,
    gazetteer: Gazetteer,
}

impl RuleEngine {
    /// Build a rule engine from configuration and a gazetteer
    pub fn new(config: &EvaluatorConfig, gazetteer: Gazetteer) -> Self {
        Self {
            resolver: FieldResolver::new(&config.fields),
            poor_terms: config
                .poor_storage_terms
                .iter()
                .map(|t| normalize_text(t))
                .filter(|t| !t.is_empty())
                .collect(),
            batch_prefix: config.batch_prefix.trim().to_string(),
            batch_prefix_case_sensitive: config.batch_prefix_case_sensitive,
            gazetteer,
        }
    }

    /// Build a rule engine, loading the built-in gazetteer plus any configured extras
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, EvaluatorError> {
        config.validate().map_err(EvaluatorError::Config)?;

        let mut gazetteer = Gazetteer::builtin();
        gazetteer.extend(config.extra_localities.iter().map(String::as_str));
        if let Some(path) = &config.gazetteer_path {
            let added = gazetteer.load_file(path)?;
            debug!("Loaded {} localities from {}", added, path.display());
        }

        Ok(Self::new(config, gazetteer))
    }

    /// Run the rules over a history; `None` if nothing fired
    pub fn check(&self, history: &History) -> Option<RuleHit> {
        RuleKind::ORDERED
            .iter()
            .find_map(|kind| self.check_rule(*kind, history))
    }

    /// Run a single rule over a history
    pub fn check_rule(&self, kind: RuleKind, history: &History) -> Option<RuleHit> {
        match kind {
            RuleKind::StorageCondition => self.check_storage(history),
            RuleKind::ManufacturerMismatch => self.check_manufacturers(history),
            RuleKind::BatchFormat => self.check_batch(history),
            RuleKind::UnknownLocality => self.check_localities(history),
        }
    }

    /// Rule 1: storage condition mentions a poor/unsafe term
    fn check_storage(&self, history: &History) -> Option<RuleHit> {
        for entry in history.entries() {
            for value in self.resolver.values(&entry.record, FieldRole::StorageCondition) {
                let Some(text) = value.as_text() else { continue };
                let padded = format!(" {} ", normalize_text(text));
                if let Some(term) = self
                    .poor_terms
                    .iter()
                    .find(|term| padded.contains(&format!(" {} ", term)))
                {
                    debug!("Storage term '{}' found at record #{}", term, entry.position);
                    return Some(RuleHit {
                        kind: RuleKind::StorageCondition,
                        reason: format!("poor storage condition reported ({})", text.trim()),
                        position: entry.position,
                    });
                }
            }
        }
        None
    }

    /// Rule 2: every manufacturer name in the history, source or
    /// destination, must match the first one seen
    fn check_manufacturers(&self, history: &History) -> Option<RuleHit> {
        let mut baseline: Option<(String, String)> = None;

        for entry in history.entries() {
            let names = self
                .resolver
                .values(&entry.record, FieldRole::SourceManufacturer)
                .into_iter()
                .chain(self.resolver.values(&entry.record, FieldRole::DestManufacturer));

            for value in names {
                let display = value.to_string().trim().to_string();
                let normalized = normalize_text(&display);
                if normalized.is_empty() {
                    continue;
                }
                match &baseline {
                    None => baseline = Some((normalized, display)),
                    Some((expected, first)) if *expected != normalized => {
                        return Some(RuleHit {
                            kind: RuleKind::ManufacturerMismatch,
                            reason: format!(
                                "source and destination manufacturer names differ ({} vs {})",
                                first, display
                            ),
                            position: entry.position,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        None
    }

    /// Rule 3: batch number must start with the configured prefix
    fn check_batch(&self, history: &History) -> Option<RuleHit> {
        for entry in history.entries() {
            for value in self.resolver.values(&entry.record, FieldRole::BatchNumber) {
                if !self.batch_matches(value) {
                    debug!("Batch '{}' at record #{} lacks prefix", value, entry.position);
                    return Some(RuleHit {
                        kind: RuleKind::BatchFormat,
                        reason: BATCH_FORMAT_REASON.to_string(),
                        position: entry.position,
                    });
                }
            }
        }
        None
    }

    fn batch_matches(&self, value: &FieldValue) -> bool {
        let text = value.to_string();
        let text = text.trim();
        if self.batch_prefix_case_sensitive {
            text.starts_with(&self.batch_prefix)
        } else {
            text.to_lowercase()
                .starts_with(&self.batch_prefix.to_lowercase())
        }
    }

    /// Rule 4: addresses must name a known locality
    fn check_localities(&self, history: &History) -> Option<RuleHit> {
        for entry in history.entries() {
            for value in self.resolver.values(&entry.record, FieldRole::Address) {
                let Some(text) = value.as_text() else { continue };
                let text = text.trim();
                if text.is_empty() || is_wallet_address(text) {
                    continue;
                }
                if !self.gazetteer.mentions_locality(text) {
                    return Some(RuleHit {
                        kind: RuleKind::UnknownLocality,
                        reason: format!("address '{}' is not a recognised locality", text),
                        position: entry.position,
                    });
                }
            }
        }
        None
    }
}

/// `0x` followed by 40 hex digits: a ledger identity, not a place
fn is_wallet_address(text: &str) -> bool {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
