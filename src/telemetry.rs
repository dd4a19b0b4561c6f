//! JSON-lines export of the `tracing` events emitted by the session and the
//! window loops. Nothing is recorded unless file logging is on.

use crate::config::AppConfig;
use crate::log_debug;
use std::env;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

const TRACE_LOG_ENV: &str = "SAMC_TRACE_LOG";
const TRACE_LOG_NAME: &str = "samc_trace.jsonl";

/// Whether the global subscriber went in; decided once per process.
static INSTALLED: OnceLock<bool> = OnceLock::new();

fn trace_log_path(configured: Option<PathBuf>) -> PathBuf {
    configured.unwrap_or_else(|| env::temp_dir().join(TRACE_LOG_NAME))
}

/// `--no-logs` wins over `--logs`, as for the debug log.
fn wants_trace(config: &AppConfig) -> bool {
    config.logs && !config.no_logs
}

fn open_trace_log(path: &Path) -> Option<File> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(err) => {
            log_debug(&format!("trace log {} unavailable: {err}", path.display()));
            None
        }
    }
}

/// Route `tracing` events to `SAMC_TRACE_LOG`. Returns whether a subscriber
/// is installed.
pub fn init_tracing(config: &AppConfig) -> bool {
    if !wants_trace(config) {
        return false;
    }
    *INSTALLED.get_or_init(|| {
        let path = trace_log_path(env::var_os(TRACE_LOG_ENV).map(PathBuf::from));
        let Some(file) = open_trace_log(&path) else {
            return false;
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_target(true)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    })
}
