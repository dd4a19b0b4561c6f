//! Window loops and the commands clicked in them.
//!
//! The playlist loop runs on the caller's thread for the life of the
//! process; each browse window gets a loop thread of its own. Locks are taken
//! in the order browse state, playlist body, session.

mod browse;
mod playlist;
mod view;

#[cfg(test)]
mod tests;

use crate::acme::{request_quit, spawn_event_thread, Acme, Body, Window, WindowInput};
use crate::mpd::MpdError;
use crate::session::Session;
use crate::{lock_or_recover, log_debug, log_debug_content};
use anyhow::{bail, Context, Result};
use crossbeam_channel::{Receiver, Sender};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use std::thread;

const PLAYLIST_NAME: &str = "samc:";
const PLAYLIST_TAG: &str = "Quit Clear Play Pause Stop Next Browse Refresh";
const BROWSE_NAME: &str = "browse:";
const BROWSE_TAG: &str = "Close Update Info ..";
const INFO_NAME: &str = "/tmp/songinfo";
const INFO_TAG: &str = "Delete";

/// What a window loop does after handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Tear everything down and leave the playlist loop.
    Quit,
    /// Close the browse window and end its loop.
    Close,
}

struct BrowserState {
    view: Option<Body>,
    /// Glyph-free absolute path; moves only after a listing succeeded.
    current_path: String,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self {
            view: None,
            current_path: "/".to_string(),
        }
    }
}

/// Shared state of the running client.
pub struct App {
    acme: Acme,
    session: Session,
    playlist: Mutex<Body>,
    browser: Mutex<BrowserState>,
    info_cmd: Vec<String>,
    playlist_tx: Sender<WindowInput>,
    playlist_rx: Receiver<WindowInput>,
    /// Spawn reader threads and browse loops; off when tests drive events directly.
    event_loops: bool,
}

/// Report a failure the user should see; acme shows our stderr in +Errors.
fn report(what: &str, err: &dyn Display) {
    eprintln!("samc: {what}: {err}");
    log_debug(&format!("{what}: {err}"));
}

impl App {
    /// Open and fill the playlist window. Failures here end the program.
    pub fn start(acme: Acme, session: Session, info_cmd: Vec<String>) -> Result<Arc<Self>> {
        Self::with_event_loops(acme, session, info_cmd, true)
    }

    fn with_event_loops(
        acme: Acme,
        session: Session,
        info_cmd: Vec<String>,
        event_loops: bool,
    ) -> Result<Arc<Self>> {
        let window = acme
            .create_window()
            .context("failed to create playlist window")?;
        window.set_name(PLAYLIST_NAME)?;
        window.set_tag(PLAYLIST_TAG)?;
        let mut body = window.open_body()?;

        let songs = session
            .call("playlistinfo", |mpd| mpd.playlist_info(None))
            .context("failed to read the playlist")?;
        let status = session
            .call("status", |mpd| mpd.status())
            .context("failed to read the player status")?;
        body.write_str(&view::render_playlist(&songs))?;
        body.write_str(&view::render_status(&status))?;
        tracing::info!(window = window.id(), songs = songs.len(), "playlist window ready");

        let (playlist_tx, playlist_rx) = crossbeam_channel::unbounded();
        Ok(Arc::new(Self {
            acme,
            session,
            playlist: Mutex::new(body),
            browser: Mutex::new(BrowserState::default()),
            info_cmd,
            playlist_tx,
            playlist_rx,
            event_loops,
        }))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn playlist_window(&self) -> Window {
        lock_or_recover(&self.playlist, "playlist body").window().clone()
    }

    /// Serve the playlist window until Quit or until acme drops the window.
    pub fn run(self: &Arc<Self>) -> Result<()> {
        let window = self.playlist_window();
        spawn_event_thread(window, self.playlist_tx.clone())?;
        loop {
            let input = self
                .playlist_rx
                .recv()
                .context("playlist event channel closed")?;
            match input {
                WindowInput::Event(event) => {
                    if self.handle_playlist_event(&event)? == Flow::Quit {
                        return Ok(());
                    }
                }
                WindowInput::Closed => {
                    log_debug("playlist window closed");
                    request_quit();
                    self.close_browser();
                    return Ok(());
                }
                WindowInput::Failed(msg) => bail!(msg),
            }
        }
    }

    /// Rewrite the playlist window: queue and status when `full`, else the
    /// status line only. Service failures are reported; window failures are
    /// returned.
    fn refresh(&self, full: bool) -> Result<()> {
        let mut body = lock_or_recover(&self.playlist, "playlist body");
        if full {
            body.clear()?;
            match self.session.call("playlistinfo", |mpd| mpd.playlist_info(None)) {
                Ok(songs) => body.write_str(&view::render_playlist(&songs))?,
                Err(err) => report("playlist", &err),
            }
        }
        match self.session.call("status", |mpd| mpd.status()) {
            Ok(status) => {
                if !full {
                    body.erase(view::STATUS_WIDTH)?;
                }
                body.write_str(&view::render_status(&status))?;
            }
            Err(err) => report("status", &err),
        }
        Ok(())
    }

    /// Show `path` in the browse window, opening one if none is open.
    fn open_browser(self: &Arc<Self>, path: &str) -> Result<()> {
        let mut browser = lock_or_recover(&self.browser, "browse state");
        let state = &mut *browser;
        if let Some(body) = state.view.as_mut() {
            if self.show_listing(body, path)? {
                state.current_path = path.to_string();
            }
            return Ok(());
        }

        let window = self
            .acme
            .create_window()
            .context("failed to create browse window")?;
        window.set_name(BROWSE_NAME)?;
        window.set_tag(BROWSE_TAG)?;
        let mut body = window.open_body()?;
        if self.show_listing(&mut body, path)? {
            state.current_path = path.to_string();
        }
        state.view = Some(body);
        tracing::info!(window = window.id(), path, "browse window opened");

        if self.event_loops {
            self.spawn_browse_loop(window)?;
        }
        Ok(())
    }

    /// List `path` into `body`. `Ok(false)` when the service refused.
    fn show_listing(&self, body: &mut Body, path: &str) -> Result<bool> {
        let entries = match self.session.call("lsinfo", |mpd| mpd.list_info(path)) {
            Ok(entries) => entries,
            Err(err) => {
                log_debug_content(&format!("cannot list {path:?}"));
                log_failure("lsinfo", &err);
                return Ok(false);
            }
        };
        body.clear()?;
        body.write_str(&view::render_listing(path, &entries))?;
        Ok(true)
    }

    /// Delete the browse window, if any.
    fn close_browser(&self) {
        let view = lock_or_recover(&self.browser, "browse state").view.take();
        if let Some(body) = view {
            let window = body.window().clone();
            drop(body);
            if let Err(err) = window.delete() {
                log_debug(&format!("failed to delete browse window: {err:#}"));
            }
        }
    }

    /// Drop our handle on a browse window acme already deleted.
    fn forget_browser(&self, window: &Window) {
        let mut browser = lock_or_recover(&self.browser, "browse state");
        if browser.view.as_ref().map(Body::window) == Some(window) {
            browser.view = None;
        }
    }

    fn spawn_browse_loop(self: &Arc<Self>, window: Window) -> Result<()> {
        let (tx, rx) = crossbeam_channel::unbounded();
        spawn_event_thread(window.clone(), tx)?;
        let app = Arc::clone(self);
        let id = window.id();
        thread::Builder::new()
            .name(format!("browse-{id}"))
            .spawn(move || app.browse_loop(&window, rx))
            .with_context(|| format!("failed to spawn loop for browse window {id}"))?;
        Ok(())
    }

    fn browse_loop(&self, window: &Window, rx: Receiver<WindowInput>) {
        for input in rx {
            match input {
                WindowInput::Event(event) => match self.handle_browse_event(&event) {
                    Ok(Flow::Close) => {
                        self.close_browser();
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => report("browse", &format!("{err:#}")),
                },
                WindowInput::Closed => {
                    self.forget_browser(window);
                    break;
                }
                WindowInput::Failed(msg) => {
                    // The event stream is the window's only liveness signal;
                    // the playlist loop turns this into an exit.
                    let _ = self.playlist_tx.send(WindowInput::Failed(msg));
                    break;
                }
            }
        }
        log_debug(&format!("browse loop for window {} done", window.id()));
    }

    /// Quit: stop readers and delete both windows.
    fn shutdown(&self) {
        request_quit();
        self.close_browser();
        if let Err(err) = self.playlist_window().delete() {
            log_debug(&format!("failed to delete playlist window: {err:#}"));
        }
        tracing::info!(reconnects = self.session.reconnect_count(), "quitting");
    }
}

/// Log a service failure the user does not need to see.
fn log_failure(op: &str, err: &MpdError) {
    log_debug(&format!("{op} failed: {err}"));
    tracing::warn!(op, error = %err, "MPD call failed");
}
