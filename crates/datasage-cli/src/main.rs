//! DataSage CLI - batch data-quality pipeline for tabular data.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use logging::LogConfig;

fn main() {
    let cli = Cli::parse();

    logging::init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(cli.log_format));

    let result = match cli.command {
        Commands::Run {
            input,
            outdir,
            config,
        } => commands::run::run(input, outdir, config),

        Commands::Inspect { file, json } => commands::inspect::run(file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
