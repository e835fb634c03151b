//! Prompt construction for the heuristic reasoning pass

use crate::config::EvaluatorConfig;
use crate::fields::FieldResolver;
use chrono::NaiveDate;
use pharmatrace_domain::{FieldValue, History, Record};
use serde_json::{Map, Value};

/// Builds the heuristic review prompt for a history
///
/// Date and time fields are dropped before rendering, so the prompt for two
/// histories differing only in timestamps is byte-identical. Fields feeding
/// a rule are kept unless their key names a date or time.
pub struct PromptBuilder {
    reference_date: NaiveDate,
    batch_prefix: String,
    resolver: FieldResolver,
}

impl PromptBuilder {
    /// Create a prompt builder for the given reference date
    pub fn new(reference_date: NaiveDate, config: &EvaluatorConfig) -> Self {
        Self {
            reference_date,
            batch_prefix: config.batch_prefix.clone(),
            resolver: FieldResolver::new(&config.fields),
        }
    }

    /// Build the complete review prompt
    pub fn build(&self, history: &History) -> String {
        let mut prompt = String::new();

        // 1. Task
        prompt.push_str(REVIEW_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Records, oldest first
        prompt.push_str("Records:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.render_records(history));
        prompt.push_str("\n---\n\n");

        // 3. Context and criteria
        prompt.push_str(&format!(
            "Assume that the current date today is {}.\n",
            self.reference_date.format("%Y-%m-%d")
        ));
        prompt.push_str("Only flag clear issues based on:\n");
        prompt.push_str("1. Storage conditions are poor\n");
        prompt.push_str("2. Source and destination manufacturer names are different\n");
        prompt.push_str("3. Do not make decisions based on any dates or times\n");
        prompt.push_str(&format!(
            "4. Batch number does not start with {}\n",
            self.batch_prefix
        ));
        prompt.push_str("5. Addresses do not contain real places (for example Mumbai)\n\n");

        // 4. Output format
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    fn render_records(&self, history: &History) -> String {
        let records: Vec<Value> = history
            .records()
            .map(|record| self.record_to_json(record))
            .collect();
        serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
    }

    fn record_to_json(&self, record: &Record) -> Value {
        let map: Map<String, Value> = record
            .fields()
            .filter(|(key, value)| !self.resolver.is_temporal(key, value))
            .map(|(key, value)| (key.to_string(), field_to_json(value)))
            .collect();
        Value::Object(map)
    }
}

fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string())),
        FieldValue::Bool(b) => Value::Bool(*b),
    }
}

const REVIEW_INSTRUCTIONS: &str = "Review the following medicine supply chain records for inconsistencies. \
The records are one batch's transfer history, oldest first.";

const OUTPUT_FORMAT_REMINDER: &str = r#"Keep the response short, a single line:
- If valid: Legitimate
- If issues: Flagged: <concise reason>"#;
