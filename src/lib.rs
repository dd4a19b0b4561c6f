//! Drive an MPD server from acme windows.
//!
//! A playlist window shows the queue and the player status, a browse window
//! walks the music database. Clicks arrive on each window's event file, are
//! decoded into [`acme::Event`]s and dispatched against the shared
//! [`session::Session`].

pub mod acme;
pub mod config;
pub mod dispatch;
mod lock;
mod logging;
pub mod mpd;
pub mod pathcodec;
pub mod session;
mod telemetry;

pub(crate) use lock::lock_or_recover;
pub use logging::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
pub use telemetry::init_tracing;
