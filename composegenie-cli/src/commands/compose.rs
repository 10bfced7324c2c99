//! `composegenie compose` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use composegenie_compose::{ServiceResolver, Synthesizer};
use composegenie_core::config::ComposeGenieConfig;
use composegenie_core::types::SelectionEntry;
use composegenie_selection::SelectionStore;

use crate::cli::{ComposeArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `compose` command.
///
/// Without `--out`, text mode prints the compose document itself so it can be
/// piped into a file.
pub async fn execute(
    args: ComposeArgs,
    config: &ComposeGenieConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let entries = SelectionStore::from_config(&config.selection).load();
    if entries.is_empty() {
        warn!("no services selected, the compose file will be empty");
    }

    let version = args
        .compose_version
        .unwrap_or_else(|| config.compose.version.clone());
    let (services, document) = generate(&entries, &version, &config.compose.default_restart);

    match args.out {
        Some(path) => {
            write_document(&path, &document).await?;
            info!(path = %path.display(), services = services.len(), "compose file written");
            writer.render(&ComposeReport {
                path: Some(path.display().to_string()),
                services,
                document: None,
            })
        }
        None if writer.format() == OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
        None => writer.render(&ComposeReport {
            path: None,
            services,
            document: Some(document),
        }),
    }
}

/// Resolve the selection into services and synthesize the document.
///
/// Returns the service names in document order alongside the text.
pub fn generate(
    entries: &[SelectionEntry],
    version: &str,
    default_restart: &str,
) -> (Vec<String>, String) {
    let services = ServiceResolver::new(default_restart).resolve_all(entries);
    let document = Synthesizer::new(version).render(&services);
    let names = services.into_iter().map(|s| s.name).collect();
    (names, document)
}

async fn write_document(path: &Path, document: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, document).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ComposeReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl Render for ComposeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(path) = &self.path {
            writeln!(
                w,
                "{} {} ({} services: {})",
                "Wrote".green(),
                path.bold(),
                self.services.len(),
                self.services.join(", ")
            )?;
        }
        if let Some(document) = &self.document {
            w.write_all(document.as_bytes())?;
        }
        Ok(())
    }
}
