use std::path::PathBuf;

use bosssec_core::compiler::CompilerOptions;
use bosssec_core::whitelist::PatternMode;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running next to a local PBX.
/// Override via environment variables (or a `.env` file).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// sqlx connection URL for the rule store.
    pub database_url: String,
    /// File the rendered dialplan is written to on apply.
    pub dialplan_output_path: PathBuf,
    /// Options handed to the rule compiler on every build.
    pub compiler: CompilerOptions,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                          |
    /// |---------------------------|----------------------------------|
    /// | `HOST`                    | `127.0.0.1`                      |
    /// | `PORT`                    | `3000`                           |
    /// | `CORS_ORIGINS`            | `http://localhost`               |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                             |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                             |
    /// | `DATABASE_URL`            | `sqlite://bosssec.db?mode=rwc`   |
    /// | `DIALPLAN_OUTPUT_PATH`    | `extensions_bosssec.conf`        |
    /// | `BOSSSEC_RESUME_PRIORITY` | `2`                              |
    /// | `BOSSSEC_WHITELIST_MODE`  | `literal`                        |
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://bosssec.db?mode=rwc".into());

        let dialplan_output_path = std::env::var("DIALPLAN_OUTPUT_PATH")
            .unwrap_or_else(|_| "extensions_bosssec.conf".into())
            .into();

        let resume_priority: u32 = std::env::var("BOSSSEC_RESUME_PRIORITY")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("BOSSSEC_RESUME_PRIORITY must be a valid u32");

        let pattern_mode = PatternMode::parse(
            &std::env::var("BOSSSEC_WHITELIST_MODE").unwrap_or_else(|_| "literal".into()),
        )
        .unwrap_or_else(|e| panic!("BOSSSEC_WHITELIST_MODE: {e}"));

        let compiler = CompilerOptions {
            resume_priority,
            pattern_mode,
            ..CompilerOptions::default()
        };
        compiler
            .validate()
            .unwrap_or_else(|e| panic!("Invalid compiler options: {e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            dialplan_output_path,
            compiler,
        }
    }
}
