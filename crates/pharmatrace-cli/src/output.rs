//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chrono::NaiveDate;
use colored::*;
use pharmatrace_domain::{Diagnostic, FieldValue, History, Record, Verdict, VerdictSource};
use pharmatrace_evaluator::Evaluation;
use pharmatrace_service::ProvenanceResult;
use serde_json::{json, Map, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Get the output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the result of a provenance lookup.
    pub fn format_provenance(&self, result: &ProvenanceResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_provenance_json(result),
            OutputFormat::Table => Ok(self.format_provenance_table(result)),
            OutputFormat::Quiet => Ok(result.verdict.to_string()),
        }
    }

    /// Format the result of an offline check.
    pub fn format_check(
        &self,
        history: &History,
        evaluation: &Evaluation,
        reference_date: NaiveDate,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "verdict": verdict_json(&evaluation.verdict),
                    "verdict_source": evaluation.source.to_string(),
                    "reference_date": reference_date.to_string(),
                    "history": history_json(history),
                    "diagnostics": diagnostics_json(&evaluation.diagnostics),
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                builder.push_record(["Verdict".to_string(), self.verdict_text(&evaluation.verdict)]);
                builder.push_record(["Source".to_string(), source_text(evaluation.source)]);
                builder.push_record(["Reference date".to_string(), reference_date.to_string()]);
                builder.push_record(["Records".to_string(), history.len().to_string()]);

                let mut sections = vec![self.table(builder)];
                if !history.is_empty() {
                    sections.push(self.history_table(history));
                }
                sections.extend(self.diagnostic_lines(&evaluation.diagnostics));
                Ok(sections.join("\n"))
            }
            OutputFormat::Quiet => Ok(evaluation.verdict.to_string()),
        }
    }

    fn format_provenance_json(&self, result: &ProvenanceResult) -> Result<String> {
        let value = json!({
            "request_id": result.request_id.to_string(),
            "item_id": result.item_id.to_string(),
            "verdict": verdict_json(&result.verdict),
            "verdict_source": result.verdict_source.to_string(),
            "reference_date": result.reference_date.to_string(),
            "complete": result.is_complete(),
            "ownership": {
                "current": result.current_owner().to_string(),
                "prior": result
                    .prior_owners()
                    .iter()
                    .map(|owner| owner.to_string())
                    .collect::<Vec<_>>(),
            },
            "history": history_json(&result.history),
            "diagnostics": diagnostics_json(&result.diagnostics),
        });

        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_provenance_table(&self, result: &ProvenanceResult) -> String {
        let prior = if result.prior_owners().is_empty() {
            "-".to_string()
        } else {
            result
                .prior_owners()
                .iter()
                .map(|owner| owner.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        };

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        builder.push_record(["Item".to_string(), result.item_id.to_string()]);
        builder.push_record(["Verdict".to_string(), self.verdict_text(&result.verdict)]);
        builder.push_record(["Source".to_string(), source_text(result.verdict_source)]);
        builder.push_record(["Current owner".to_string(), result.current_owner().to_string()]);
        builder.push_record(["Prior owners".to_string(), prior]);
        builder.push_record(["Reference date".to_string(), result.reference_date.to_string()]);
        builder.push_record(["Request".to_string(), result.request_id.to_string()]);

        let mut sections = vec![self.table(builder)];
        if result.history.is_empty() {
            sections.push(self.info("No provenance records were resolved."));
        } else {
            sections.push(self.history_table(&result.history));
        }
        sections.extend(self.diagnostic_lines(&result.diagnostics));
        sections.join("\n")
    }

    fn history_table(&self, history: &History) -> String {
        let mut builder = Builder::default();
        builder.push_record(["#", "Record", "Fields"]);
        for entry in history.entries() {
            builder.push_record([
                entry.position.to_string(),
                entry.record_ref.to_string(),
                record_lines(&entry.record),
            ]);
        }
        self.table(builder)
    }

    fn diagnostic_lines(&self, diagnostics: &[Diagnostic]) -> Vec<String> {
        diagnostics
            .iter()
            .map(|d| self.warning(&format!("[{}] {}", d.code(), d)))
            .collect()
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn verdict_text(&self, verdict: &Verdict) -> String {
        match verdict {
            Verdict::Legitimate => self.colorize("Legitimate", "green"),
            Verdict::Flagged(reason) => self.colorize(&format!("Flagged: {}", reason), "red"),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn source_text(source: VerdictSource) -> String {
    match source {
        VerdictSource::Rule(kind) => format!("rule ({})", kind.as_str()),
        VerdictSource::Heuristic => "heuristic review".to_string(),
        VerdictSource::NoEvidence => "no evidence".to_string(),
        VerdictSource::Fallback => "fallback (heuristic unavailable)".to_string(),
    }
}

fn record_lines(record: &Record) -> String {
    if record.is_empty() {
        return "-".to_string();
    }
    record
        .fields()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn verdict_json(verdict: &Verdict) -> Value {
    match verdict {
        Verdict::Legitimate => json!({ "status": "legitimate" }),
        Verdict::Flagged(reason) => json!({ "status": "flagged", "reason": reason }),
    }
}

fn field_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Number(n) => json!(n),
        FieldValue::Bool(b) => Value::Bool(*b),
    }
}

fn history_json(history: &History) -> Vec<Value> {
    history
        .entries()
        .iter()
        .map(|entry| {
            let fields: Map<String, Value> = entry
                .record
                .fields()
                .map(|(key, value)| (key.to_string(), field_json(value)))
                .collect();
            json!({
                "position": entry.position,
                "record_ref": entry.record_ref.to_string(),
                "fields": fields,
            })
        })
        .collect()
}

fn diagnostics_json(diagnostics: &[Diagnostic]) -> Vec<Value> {
    diagnostics
        .iter()
        .map(|d| json!({ "code": d.code(), "message": d.to_string() }))
        .collect()
}
