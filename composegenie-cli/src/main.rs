//! composegenie -- catalog browsing, service selection and compose generation.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;

use composegenie_core::config::ComposeGenieConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config: config_path,
        log_level,
        output,
        command,
    } = cli;
    let writer = OutputWriter::new(output);

    // `config validate` must be able to report a broken file, so it runs on defaults.
    if let Commands::Config(args) = command {
        let mut config = ComposeGenieConfig::default();
        apply_cli_overrides(&mut config, log_level.as_deref())?;
        logging::init_tracing(&config.general).map_err(|e| CliError::Command(e.to_string()))?;
        return commands::config::execute(args, &config_path, &writer).await;
    }

    let mut config = ComposeGenieConfig::load_or_default(&config_path).await?;
    apply_cli_overrides(&mut config, log_level.as_deref())?;
    logging::init_tracing(&config.general).map_err(|e| CliError::Command(e.to_string()))?;

    composegenie_core::metrics::describe_all();
    tracing::debug!(config = %config_path.display(), "composegenie starting");

    match command {
        Commands::Catalog(args) => commands::catalog::execute(args, &config, &writer).await,
        Commands::Select(args) => commands::select::execute(args, &config, &writer).await,
        Commands::Compose(args) => commands::compose::execute(args, &config, &writer).await,
        Commands::Security(args) => commands::security::execute(args, &writer).await,
        Commands::Template(args) => commands::template::execute(args, &writer).await,
        Commands::Validate(args) => commands::validate::execute(args, &writer).await,
        Commands::Config(_) => Ok(()),
    }
}

/// CLI flags have the highest precedence, above env overrides and the file.
fn apply_cli_overrides(
    config: &mut ComposeGenieConfig,
    log_level: Option<&str>,
) -> Result<(), CliError> {
    if let Some(level) = log_level {
        config.general.log_level = level.to_lowercase();
        config.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_flag_overrides_config() {
        let mut config = ComposeGenieConfig::default();
        apply_cli_overrides(&mut config, Some("DEBUG")).unwrap();
        assert_eq!(config.general.log_level, "debug");
    }

    #[test]
    fn test_invalid_log_level_flag_is_config_error() {
        let mut config = ComposeGenieConfig::default();
        let err = apply_cli_overrides(&mut config, Some("loud")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
