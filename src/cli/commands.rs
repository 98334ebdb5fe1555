//! CLI command implementations
//!
//! Every command loads the JSON config, opens the configured store and
//! either serves HTTP or runs one balance operation and exits.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::balance::BalanceEngine;
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::model::NameIdentifier;
use crate::observability::{log_event, log_event_with_fields, Event, Logger, MetricsRegistry, Severity};
use crate::store::{image_path, Database};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory. Absent means an in-memory store.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Minimum logged severity (optional, default "info")
    #[serde(default)]
    pub log_level: Option<String>,

    /// HTTP listener settings
    #[serde(default)]
    pub http: HttpServerConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", &path.display().to_string())],
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.http.port == 0 {
            return Err(CliError::config_error("http.port must be > 0"));
        }

        if let Some(dir) = &self.data_dir {
            if dir.trim().is_empty() {
                return Err(CliError::config_error(
                    "data_dir must not be empty; omit it for an in-memory store",
                ));
            }
        }

        self.severity()?;

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(PathBuf::from)
    }

    fn severity(&self) -> CliResult<Option<Severity>> {
        self.log_level
            .as_deref()
            .map(|level| level.parse::<Severity>())
            .transpose()
            .map_err(CliError::config_error)
    }

    fn apply_log_level(&self) -> CliResult<()> {
        if let Some(severity) = self.severity()? {
            Logger::set_min_severity(severity);
        }
        Ok(())
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::Check {
            config,
            name_identifier,
        } => check(&config, name_identifier),
        Command::Fix { config } => fix(&config),
    }
}

/// Initialize a new data directory
///
/// Creates the directory and an empty, checksummed table image.
/// Does not start the server.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    config.apply_log_level()?;

    let data_dir = config
        .data_path()
        .ok_or_else(|| CliError::config_error("init requires data_dir"))?;

    if is_initialized(&data_dir) {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(&data_dir).map_err(|e| {
        CliError::config_error(format!("Failed to create directory {:?}: {}", data_dir, e))
    })?;

    let db = Database::open(&data_dir)?;
    db.begin_write()?.commit()?;

    write_response(&json!({"initialized": true}))?;

    Ok(())
}

/// Start the HTTP server
///
/// 1. Load configuration
/// 2. Open the store
/// 3. Start the Axum server on the configured (or overridden) port
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let config = Config::load(config_path)?;
    config.apply_log_level()?;
    log_event(Event::BootStart);

    let db = match boot(&config) {
        Ok(db) => db,
        Err(e) => {
            log_event_with_fields(Event::BootFailed, &[("reason", e.message())]);
            return Err(e);
        }
    };

    let mut http_config = config.http.clone();
    if let Some(port) = port {
        if port == 0 {
            return Err(CliError::config_error("--port must be > 0"));
        }
        http_config.port = port;
    }
    let server = HttpServer::with_config(http_config, db);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Check one family group and print the verdict
pub fn check(config_path: &Path, name_identifier: NameIdentifier) -> CliResult<()> {
    let config = Config::load(config_path)?;
    config.apply_log_level()?;

    let engine = engine(&config)?;
    let verdict = engine.check(name_identifier)?;

    write_response(&json!({
        "name_identifier": name_identifier,
        "verdict": verdict,
        "result": verdict.message(),
    }))
}

/// Rebalance every family group and print the report
pub fn fix(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    config.apply_log_level()?;

    let engine = engine(&config)?;
    let report = engine.repair()?;

    write_response(&report)
}

fn engine(config: &Config) -> CliResult<BalanceEngine> {
    let db = boot(config)?;
    Ok(BalanceEngine::new(db, Arc::new(MetricsRegistry::new())))
}

/// Open the configured store. A durable store must be initialized first.
fn boot(config: &Config) -> CliResult<Arc<Database>> {
    let db = match config.data_path() {
        Some(data_dir) => {
            if !is_initialized(&data_dir) {
                return Err(CliError::not_initialized());
            }
            let db = Database::open(&data_dir)?;
            log_event_with_fields(
                Event::StoreOpened,
                &[("data_dir", &data_dir.display().to_string()), ("durable", "true")],
            );
            db
        }
        None => {
            log_event_with_fields(Event::StoreOpened, &[("durable", "false")]);
            Database::in_memory()
        }
    };
    Ok(Arc::new(db))
}

fn is_initialized(data_dir: &Path) -> bool {
    image_path(data_dir).exists()
}
