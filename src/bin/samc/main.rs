//! samc entrypoint: connect to MPD, open the playlist window and serve it.
//!
//! # Threads
//!
//! - Main thread: playlist window loop
//! - One event reader per open window
//! - Browse loop while a browse window is open

use anyhow::{Context, Result};
use samc::acme::Acme;
use samc::config::AppConfig;
use samc::dispatch::App;
use samc::mpd::MpdConnector;
use samc::session::Session;
use samc::{init_logging, init_tracing, log_debug, log_file_path, log_panic};
use std::panic;

fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        log_panic(info);
        previous(info);
    }));
}

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    let tracing = init_tracing(&config);
    install_panic_hook();
    log_debug("=== samc started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));
    if tracing {
        log_debug("tracing events exported as JSON lines");
    }

    let info_cmd = config.info_command()?;
    let target = config.connection_target();
    let session = Session::establish(Box::new(MpdConnector::new(target)))
        .context("cannot reach MPD")?;

    let acme = Acme::new(&config.acme_root);
    log_debug(&format!("acme root: {}", acme.root().display()));
    let app = App::start(acme, session, info_cmd)?;
    let result = app.run();
    log_debug(&format!(
        "=== samc exiting ({} reconnects) ===",
        app.session().reconnect_count()
    ));
    result
}
