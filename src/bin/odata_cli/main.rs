mod app;
mod commands;
mod context;
mod formatters;
mod payload;
mod repl;
mod utils;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    let cli = app::Cli::parse();

    // Initialiser le logger (RUST_LOG reste prioritaire)
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    info!("Démarrage de odata-cli");

    // Exécuter l'application
    let result = app::run(cli);

    info!("Fin de odata-cli");

    result
}
