mod cache;
mod cli;
mod engine;
mod error;
mod export;
mod fmt;
mod importer;
mod index_table;
mod models;
mod period;
mod settings;
mod summary;

use clap::Parser;

use cli::{CacheCommands, Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Adjust {
            file,
            index,
            closing,
            output,
            no_export,
        } => cli::adjust::run(
            &file,
            index.as_deref(),
            closing.as_deref(),
            output.as_deref(),
            no_export,
        ),
        Commands::Index { index, all } => cli::index::run(index.as_deref(), all),
        Commands::Template { output, force } => cli::template::run(&output, force),
        Commands::Config {
            index,
            symbol,
            export_dir,
        } => cli::config::run(index.as_deref(), symbol.as_deref(), export_dir.as_deref()),
        Commands::Cache { command } => match command {
            CacheCommands::Clear => cli::cache::clear(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
