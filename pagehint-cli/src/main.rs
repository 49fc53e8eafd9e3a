use clap::Parser;
use tracing::debug;

use pagehint_cli::cli::{Cli, Commands, ConfigAction};
use pagehint_cli::commands;
use pagehint_cli::error::CliError;
use pagehint_cli::logging;
use pagehint_cli::output::OutputWriter;
use pagehint_core::config::GeneralConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let config_path = cli.config.as_deref();

    match cli.command {
        // validate reports load errors itself, so logging falls back to defaults
        Commands::Config(args) if matches!(args.action, ConfigAction::Validate) => {
            let mut general = GeneralConfig::default();
            if let Some(level) = cli.log_level {
                general.log_level = level;
            }
            logging::init_tracing(&general)?;
            commands::config::execute(args, config_path, &writer).await
        }
        command => {
            let mut loaded = commands::load_config(config_path).await?;
            if let Some(level) = cli.log_level {
                loaded.config.general.log_level = level;
                loaded.config.validate()?;
            }
            logging::init_tracing(&loaded.config.general)?;
            debug!(source = %loaded.source, "configuration loaded");

            match command {
                Commands::Scan(args) => {
                    commands::scan::execute(args, loaded.config, &writer).await
                }
                Commands::Hints(args) => commands::hints::execute(args, &loaded.config, &writer),
                Commands::Config(args) => {
                    commands::config::execute(args, config_path, &writer).await
                }
            }
        }
    }
}
