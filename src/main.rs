use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hotstar_extract::{common::logger, configs::Config, sources::SourceManager};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "hotstar-extract", version, about = "Extract stream formats from hotstar.com pages")]
struct Cli {
    /// Content page or tray (playlist) URL
    url: String,

    /// Resolve tray references into full entries
    #[arg(long)]
    expand: bool,

    /// Config file (defaults to config.toml, then config.default.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logger::init(&config);

    let manager = match SourceManager::new(&config) {
        Ok(manager) => manager,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };
    info!("Sources: {}", manager.source_names().join(", "));

    let mut result = match manager.load(&cli.url).await {
        Ok(result) => result,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    if cli.expand {
        result = match manager.expand(result).await {
            Ok(result) => result,
            Err(e) => {
                report(&e);
                return ExitCode::FAILURE;
            }
        };
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };

    match json {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize result: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn report(e: &hotstar_extract::common::ExtractorError) {
    if e.is_expected() {
        eprintln!("ERROR: {}", e);
    } else {
        error!("Extraction failed: {:?}", e);
        eprintln!("ERROR: {}", e);
    }
}
