//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use pharmatrace_ipfs::StoreConfig;
use pharmatrace_ledger::LedgerConfig;
use pharmatrace_llm::ReasoningConfig;
use pharmatrace_service::ProvenanceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
///
/// Every table is optional; a missing file or table means defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Registry contract connection
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Content-addressed store gateway
    #[serde(default)]
    pub store: StoreConfig,

    /// Heuristic reasoning backend
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// Fetch, aggregation and evaluation policy
    #[serde(default)]
    pub provenance: ProvenanceConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (verdict only) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".pharmatrace").join("config.toml"))
    }

    /// Resolve an explicit path or fall back to the default one.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate every section.
    ///
    /// The ledger section is only checked when a command needs it, so
    /// `check` and `config` work without a contract address.
    pub fn validate(&self) -> Result<()> {
        self.store
            .validate()
            .map_err(|e| CliError::Config(format!("store: {}", e)))?;
        self.reasoning
            .validate()
            .map_err(|e| CliError::Config(format!("reasoning: {}", e)))?;
        self.provenance
            .validate()
            .map_err(|e| CliError::Config(format!("provenance: {}", e)))?;
        Ok(())
    }

    /// Validate the ledger section.
    pub fn validate_ledger(&self) -> Result<()> {
        self.ledger
            .validate()
            .map_err(|e| CliError::Config(format!("ledger: {}", e)))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmatrace_llm::ProviderKind;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.provenance.deadline_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.ledger.contract_address = "0x1111111111111111111111111111111111111111".into();
        config.reasoning.provider = ProviderKind::Ollama;
        config.provenance.deadline_secs = 20;
        config.provenance.evaluator.batch_prefix = "LOT".into();
        config.settings.format = OutputFormat::Json;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[ledger]
rpc_url = "https://rpc.example.org"

[provenance]
deadline_secs = 15

[provenance.aggregator]
max_in_flight = 2
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.ledger.rpc_url, "https://rpc.example.org");
        assert_eq!(config.provenance.deadline_secs, 15);
        assert_eq!(config.provenance.aggregator.max_in_flight, 2);
        assert_eq!(config.store, StoreConfig::default());
        assert!(config.settings.color);
    }

    #[test]
    fn test_invalid_section_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[provenance]\ndeadline_secs = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("provenance"));
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ledger\nrpc_url = ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_ledger_checked_separately() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.validate_ledger().is_err());
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let explicit = PathBuf::from("/tmp/pharmatrace.toml");
        assert_eq!(Config::resolve_path(Some(&explicit)).unwrap(), explicit);
    }
}
