//! Race Disparity Card Service - Main Entry Point
//!
//! Loads the race/ethnicity dataset and either:
//! 1. Exports card models for every state (default), or
//! 2. Serves shaped groups and card models over HTTP (`--endpoint`)
//!
//! Usage:
//!   cargo run --release -- --data race-data.json            # Export all cards
//!   cargo run --release -- --url https://... --state AL      # Export one state
//!   cargo run --release -- --data race-data.json --endpoint 8080
//!
//! Options:
//!   --data FILE        Dataset JSON file (checked first)
//!   --url URL          Dataset URL (overrides RACE_DATA_URL and [source] in cards.toml)
//!   --config FILE      Configuration file (default: cards.toml)
//!   --state CODE       Only export this state
//!   --date YYYY-MM-DD  "As of" date printed on cards (default: today)
//!   --endpoint PORT    Serve the HTTP API instead of exporting
//!   --log-level LEVEL  debug | info | warn | error (default: info)
//!   --log-file FILE    Also append log lines to FILE
//!   --timestamps       Timestamped console log lines
//!
//! Environment:
//!   RACE_CARDS_CONFIG - configuration file path (must exist when set)
//!   RACE_DATA_URL     - dataset URL (overrides [source] in cards.toml)

use chrono::{Local, NaiveDate};
use race_card_service::config::{self, CardConfig, ConfigError};
use race_card_service::endpoint;
use race_card_service::export;
use race_card_service::ingest::race_data::{self, RaceDataset};
use race_card_service::logging::{self, LogLevel, Stage};
use race_card_service::model::RaceDataError;
use std::env;
use std::process;

#[derive(Default)]
struct Args {
    data_file: Option<String>,
    data_url: Option<String>,
    config_path: Option<String>,
    state: Option<String>,
    date: Option<NaiveDate>,
    endpoint_port: Option<u16>,
    log_level: Option<LogLevel>,
    log_file: Option<String>,
    timestamps: bool,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [--data FILE | --url URL] [--config FILE] [--state CODE] \
         [--date YYYY-MM-DD] [--endpoint PORT] [--log-level LEVEL] [--log-file FILE] [--timestamps]",
        program
    )
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut i = 1;

    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "--timestamps" {
            parsed.timestamps = true;
            i += 1;
            continue;
        }

        let value = args
            .get(i + 1)
            .ok_or_else(|| format!("{} requires a value", flag))?;

        match flag {
            "--data" => parsed.data_file = Some(value.clone()),
            "--url" => parsed.data_url = Some(value.clone()),
            "--config" => parsed.config_path = Some(value.clone()),
            "--state" => parsed.state = Some(value.to_ascii_uppercase()),
            "--date" => {
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|e| format!("--date must be YYYY-MM-DD: {}", e))?;
                parsed.date = Some(date);
            }
            "--endpoint" => {
                let port = value
                    .parse()
                    .map_err(|_| format!("--endpoint requires a port number, got '{}'", value))?;
                parsed.endpoint_port = Some(port);
            }
            "--log-level" => {
                let level = LogLevel::parse(value)
                    .ok_or_else(|| format!("Unknown log level '{}'", value))?;
                parsed.log_level = Some(level);
            }
            "--log-file" => parsed.log_file = Some(value.clone()),
            _ => return Err(format!("Unknown argument: {}", flag)),
        }
        i += 2;
    }

    Ok(parsed)
}

fn load_config(args: &Args) -> Result<CardConfig, ConfigError> {
    match &args.config_path {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
}

/// Where the dataset comes from.
#[derive(Debug, PartialEq)]
enum DataSource {
    File(String),
    Url(String),
}

/// Command-line flags win (`--data`, then `--url`), then `RACE_DATA_URL`,
/// then `[source]` in the configuration (file before URL).
fn choose_source(args: &Args, config: &CardConfig, env_url: Option<String>) -> Option<DataSource> {
    if let Some(path) = &args.data_file {
        return Some(DataSource::File(path.clone()));
    }
    if let Some(url) = args.data_url.clone().or(env_url) {
        return Some(DataSource::Url(url));
    }
    if let Some(path) = &config.source.data_file {
        return Some(DataSource::File(path.clone()));
    }
    config.source.data_url.clone().map(DataSource::Url)
}

fn load_dataset(args: &Args, config: &CardConfig) -> Result<RaceDataset, RaceDataError> {
    let source = choose_source(args, config, config::env_data_url()).ok_or_else(|| {
        RaceDataError::Io("no dataset given; pass --data or --url, or set [source] in cards.toml".to_string())
    })?;

    match source {
        DataSource::File(path) => {
            logging::info(Stage::Ingest, None, &format!("📥 Reading dataset from {}", path));
            race_data::load_dataset_file(&path)
        }
        DataSource::Url(url) => {
            logging::info(Stage::Ingest, None, &format!("📥 Fetching dataset from {}", url));
            let client = reqwest::blocking::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .map_err(|e| RaceDataError::RequestFailed(e.to_string()))?;
            race_data::fetch_dataset(&client, &url)
        }
    }
}

fn main() {
    let argv: Vec<String> = env::args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("race_card_service");

    dotenv::dotenv().ok();

    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", usage(program));
            process::exit(1);
        }
    };

    logging::init_logger(
        args.log_level.unwrap_or(LogLevel::Info),
        args.log_file.as_deref(),
        args.timestamps,
    );

    println!("📊 Race Disparity Cards");
    println!("=======================\n");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            logging::error(Stage::System, None, &e.to_string());
            process::exit(1);
        }
    };

    let dataset = match load_dataset(&args, &config) {
        Ok(dataset) => dataset,
        Err(e) => {
            logging::log_data_failure(None, "Dataset load", &e);
            process::exit(1);
        }
    };
    logging::info(
        Stage::Ingest,
        None,
        &format!(
            "✓ Loaded {} states ({} separate, {} combined race records)\n",
            dataset.states.len(),
            dataset.separate.len(),
            dataset.combined.len()
        ),
    );

    if let Some(port) = args.endpoint_port {
        logging::info(Stage::System, None, "🚀 Starting HTTP endpoint server...");
        if let Err(e) = endpoint::start_endpoint_server(port, dataset, config) {
            logging::error(Stage::Http, None, &e);
            process::exit(1);
        }
        return;
    }

    let as_of = args.date.unwrap_or_else(|| Local::now().date_naive());
    logging::info(
        Stage::Export,
        None,
        &format!(
            "🖼  Building cards as of {} into {}",
            as_of,
            export::output_dir(&config).display()
        ),
    );

    match export::export_cards(&dataset, &config, as_of, args.state.as_deref()) {
        Ok(summary) => {
            for state in &summary.skipped {
                logging::debug(Stage::Export, Some(state.as_str()), "no race record, skipped");
            }
            if !summary.failed.is_empty() {
                process::exit(1);
            }
        }
        Err(e) => {
            logging::log_data_failure(args.state.as_deref(), "Export", &e);
            process::exit(1);
        }
    }
}
