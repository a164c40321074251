//! chscan-ingest: replays a channel scan event stream into a channel database.
//!
//! Events are read as JSON lines from a file or from stdin.

use std::path::PathBuf;

use chscan::{Database, ScanConfig, ScanSession};
use clap::Parser;
use log::{error, info, warn};

mod ingest;
mod logging;
mod notify;

/// chscan-ingest - Channel scan event ingestion
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Event stream to read (JSON lines); stdin when omitted
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Path to the database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'f', long)]
    config: Option<PathBuf>,

    /// Input (tuner source) the scanned channels belong to
    #[arg(short, long)]
    input_id: Option<String>,

    /// First display number handed out
    #[arg(long)]
    initial_number: Option<u32>,

    /// Language picked out of multilingual service names
    #[arg(long)]
    preferred_language: Option<String>,

    /// Print the last N scan history entries when done
    #[arg(long, default_value = "0")]
    history: i32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory where log files are stored
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Number of days to keep log files
    #[arg(long, default_value = "7")]
    log_retention_days: u64,
}

/// Configuration file format.
#[derive(Debug, serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    scan: ScanConfig,
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, serde::Deserialize, Default)]
struct LoggingSection {
    log_dir: Option<String>,
    retention_days: Option<u64>,
    level: Option<String>,
}

#[derive(Debug, serde::Deserialize, Default)]
struct DatabaseSection {
    path: Option<String>,
}

fn load_config(path: &PathBuf) -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Apply command line overrides to the scan section of the config file.
fn scan_config(args: &Args, mut config: ScanConfig) -> ScanConfig {
    if let Some(input_id) = &args.input_id {
        config.input_id = input_id.clone();
    }
    if let Some(number) = args.initial_number {
        config.initial_display_number = number;
    }
    if let Some(lang) = &args.preferred_language {
        config.preferred_language = Some(lang.clone());
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load config file: explicit path > auto-detect > default
    let config_path = args.config.clone().or_else(|| {
        let default_path = PathBuf::from("chscan-ingest.toml");
        if default_path.exists() {
            Some(default_path)
        } else {
            None
        }
    });
    let file_config = if let Some(config_path) = &config_path {
        match load_config(config_path) {
            Ok(c) => {
                eprintln!("Loaded config from: {}", config_path.display());
                c
            }
            Err(e) => {
                eprintln!("Failed to load config file: {}", e);
                return Err(e);
            }
        }
    } else {
        ConfigFile::default()
    };

    // Merge logging configs (command line takes precedence)
    let log_dir = if args.log_dir.to_string_lossy() != "logs" {
        args.log_dir.clone()
    } else {
        PathBuf::from(file_config.logging.log_dir.as_deref().unwrap_or("logs"))
    };

    let log_retention_days = if args.log_retention_days != 7 {
        args.log_retention_days
    } else {
        file_config.logging.retention_days.unwrap_or(7)
    };

    let log_level = file_config.logging.level.as_deref();
    logging::init_logging(&log_dir, log_retention_days, args.verbose, log_level)?;

    let db_path = args
        .database
        .clone()
        .or_else(|| file_config.database.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("chscan.db"));

    info!("Opening database: {:?}", db_path);
    let db = match Database::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let config = scan_config(&args, file_config.scan);
    let input_id = config.input_id.clone();
    info!("Ingesting scan events for input {}", input_id);

    let (sender, logger) = notify::spawn_logger();
    let mut session = ScanSession::new(config, db, sender);

    let result = match &args.events {
        Some(path) => {
            info!("Reading events from {:?}", path);
            let file = tokio::fs::File::open(path).await?;
            ingest::ingest(file, &mut session).await
        }
        None => {
            info!("Reading events from stdin");
            ingest::ingest(tokio::io::stdin(), &mut session).await
        }
    };

    if session.has_pending() {
        warn!("Scan ended with an unflushed commit plan; channel list may be incomplete");
    }

    let (db, sender) = session.into_parts();
    drop(sender);
    match logger.await {
        Ok(count) => info!("{} notifications delivered", count),
        Err(e) => warn!("Notification logger failed: {}", e),
    }

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            error!("Ingest aborted: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Done: {} events, {} malformed lines, {} failed, {} channels stored",
        stats.events,
        stats.malformed,
        stats.failed,
        db.channel_count(&input_id)?
    );

    if args.history > 0 {
        for entry in db.get_scan_history(&input_id, args.history)? {
            println!(
                "{} {} {} {} channels={} {} {}",
                entry.scan_time,
                entry.store_mode,
                entry.scan_mode,
                entry.sort_mode,
                entry.channel_count.unwrap_or(0),
                entry.summary,
                entry.error_message.as_deref().unwrap_or("ok"),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_file() {
        let config: ConfigFile = toml::from_str(
            r#"
            [scan]
            input_id = "dvb-t"
            lcn_overflow_start = 800
            preferred_language = "fra"

            [database]
            path = "channels.db"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.input_id, "dvb-t");
        assert_eq!(config.scan.lcn_overflow_start, 800);
        assert_eq!(config.scan.initial_display_number, 1);
        assert_eq!(config.database.path.as_deref(), Some("channels.db"));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_command_line_overrides_scan_section() {
        let args = Args::parse_from(["chscan-ingest", "-i", "cable", "--initial-number", "100"]);
        let config = scan_config(&args, ScanConfig::for_input("dvb-t").with_preferred_language("deu"));

        assert_eq!(config.input_id, "cable");
        assert_eq!(config.initial_display_number, 100);
        assert_eq!(config.preferred_language.as_deref(), Some("deu"));
    }
}
