//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    DEFAULT_ACME_ROOT, DEFAULT_INFO_CMD, DEFAULT_MPD_HOST, DEFAULT_MPD_PORT,
};
pub use validation::ConnectionTarget;

/// CLI options for samc. Values are validated before any window is created.
#[derive(Debug, Parser, Clone)]
#[command(about = "samc: MPD playlist and browser for acme", author, version)]
pub struct AppConfig {
    /// Directory where acme's file system is mounted
    #[arg(long = "acme-root", env = "SAMC_ACME_ROOT", default_value = DEFAULT_ACME_ROOT)]
    pub acme_root: PathBuf,

    /// MPD host; `password@host` also logs in
    #[arg(long, env = "MPD_HOST")]
    pub host: Option<String>,

    /// MPD port
    #[arg(long, env = "MPD_PORT")]
    pub port: Option<u16>,

    /// Helper that prints song details for the browse window's Info command
    #[arg(long = "info-cmd", env = "SAMC_INFO_CMD", default_value = DEFAULT_INFO_CMD)]
    pub info_cmd: String,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SAMC_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SAMC_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging clicked text and library paths (debug log only)
    #[arg(long = "log-content", env = "SAMC_LOG_CONTENT", default_value_t = false)]
    pub log_content: bool,
}
