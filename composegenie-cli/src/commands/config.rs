//! `composegenie config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use composegenie_core::config::ComposeGenieConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
///
/// `config` is handled before the effective configuration is built so that
/// `validate` can report a broken file instead of failing on startup.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show => execute_show(config_path, writer).await,
    }
}

async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match ComposeGenieConfig::load_or_default(config_path).await {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

async fn execute_show(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = ComposeGenieConfig::load_or_default(config_path).await?;
    let store_path = config
        .selection
        .resolved_store_path()
        .map(|p| p.display().to_string());
    writer.render(&ConfigReport { config, store_path })
}

#[derive(Debug, Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.valid {
            writeln!(w, "{} {}", "valid".green(), self.source)?;
        } else {
            writeln!(w, "{} {}", "invalid".red(), self.source)?;
            for error in &self.errors {
                writeln!(w, "  {error}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigReport {
    #[serde(flatten)]
    pub config: ComposeGenieConfig,
    /// Where selections are persisted; `None` means in memory only.
    pub store_path: Option<String>,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let toml = toml::to_string_pretty(&self.config).map_err(std::io::Error::other)?;
        w.write_all(toml.as_bytes())?;
        match &self.store_path {
            Some(path) => writeln!(w, "\n# selections stored at {path}")?,
            None => writeln!(w, "\n# selections kept in memory")?,
        }
        Ok(())
    }
}
