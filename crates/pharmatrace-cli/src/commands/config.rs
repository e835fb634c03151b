//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

const REDACTED: &str = "<redacted>";

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Show => print!("{}", redacted(config).to_toml()?),
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            Config::default().save_to(path)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote default configuration to {}", path.display()))
            );
        }
    }
    Ok(())
}

fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.reasoning.api_key.is_some() {
        shown.reasoning.api_key = Some(REDACTED.to_string());
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use tempfile::TempDir;

    fn formatter() -> Formatter {
        Formatter::new(OutputFormat::Table, false)
    }

    fn init(force: bool) -> ConfigArgs {
        ConfigArgs {
            action: ConfigAction::Init { force },
        }
    }

    #[test]
    fn test_init_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        execute_config(init(false), &Config::default(), &path, &formatter()).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\ncolor = false\n").unwrap();

        assert!(execute_config(init(false), &Config::default(), &path, &formatter()).is_err());
        assert!(!Config::load_from(&path).unwrap().settings.color);

        execute_config(init(true), &Config::default(), &path, &formatter()).unwrap();
        assert!(Config::load_from(&path).unwrap().settings.color);
    }

    #[test]
    fn test_show_redacts_api_key() {
        let mut config = Config::default();
        config.reasoning.api_key = Some("secret-key".into());

        let shown = redacted(&config).to_toml().unwrap();
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains(REDACTED));
    }
}
