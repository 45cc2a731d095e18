//! URL Rewrite Binary Entry Point

use clap::Parser;
use rewrite_cli::logging::{init_logging, LoggingConfig};
use rewrite_cli::{run, Cli, Outcome};
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_config_file(cli.config.as_deref())?.with_verbosity(cli.verbose);
    if cli.log_file.is_some() {
        logging.log_file = cli.log_file.clone();
    }
    init_logging(&logging)?;

    let mut stdout = std::io::stdout().lock();
    match run(&cli, &mut stdout) {
        Ok(Outcome::Success) => Ok(ExitCode::SUCCESS),
        Ok(Outcome::Rejected) => Ok(ExitCode::FAILURE),
        Err(e) => {
            tracing::error!("url-rewrite failed: {:#}", e);
            Err(e)
        }
    }
}
