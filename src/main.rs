use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sat_o_cast::catalog::{parse_feed, FileFeed, ValidationMode};
use sat_o_cast::{Config, Pipeline};

#[derive(Parser)]
#[command(name = "sat-o-cast")]
#[command(about = "Satellite position computation and broadcast")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP/WebSocket server with the live position loop
    Serve {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
    },
    /// Ingest element sets once and exit
    Ingest {
        #[arg(short, long, default_value = "config.yaml")]
        config: String,
        /// Read the feed from a local file instead of the configured URL
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Check an element set file without storing it
    Validate {
        feed: PathBuf,
        /// Enforce line numbers, lengths and checksums
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config).await,
        Commands::Ingest { config, file } => ingest(&config, file).await,
        Commands::Validate { feed, strict } => validate(&feed, strict),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            None
        }
    }
}

async fn serve(config_path: &str) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let pipeline = match Pipeline::from_config(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error setting up pipeline: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match sat_o_cast::web::run_server(config, pipeline).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn ingest(config_path: &str, file: Option<PathBuf>) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };
    if !config.storage.is_persistent() {
        eprintln!("Memory storage would discard the ingested records; set storage.backend: file");
        return ExitCode::FAILURE;
    }

    let pipeline = match file {
        Some(path) => Pipeline::with_feed(&config, Box::new(FileFeed::new(path, config.feed.max_body_bytes))),
        None => Pipeline::from_config(&config),
    };
    let pipeline = match pipeline {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error setting up pipeline: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match pipeline.ingestor().ingest().await {
        Ok(count) => {
            println!("Ingested {} element sets", count);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Ingest failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &Path, strict: bool) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mode = if strict {
        ValidationMode::Strict
    } else {
        ValidationMode::Permissive
    };

    match parse_feed(&content, mode) {
        Ok(records) => {
            println!("Feed is valid ({} element sets)", records.len());
            for record in &records {
                println!("  {:>5}: {}", record.catalog_id, record.name);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
            ExitCode::FAILURE
        }
    }
}
