use super::event::{Event, EventDecoder};
use super::runes::RuneReader;
use super::Window;
use crate::{log_debug, log_debug_content};
use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use std::io::BufReader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

static QUIT: AtomicBool = AtomicBool::new(false);

/// Ask every event reader to stop after its current record.
pub fn request_quit() {
    QUIT.store(true, Ordering::SeqCst);
}

pub fn quit_requested() -> bool {
    QUIT.load(Ordering::SeqCst)
}

/// What a window's reader thread reports to its dispatch loop.
#[derive(Debug)]
pub enum WindowInput {
    Event(Event),
    /// The event file reached end of stream; acme deleted the window.
    Closed,
    /// Reading the event file failed.
    Failed(String),
}

/// Decode `window`'s event file on a dedicated thread.
///
/// The thread stops after reporting `Closed` or `Failed`, or once the
/// receiver is gone.
pub fn spawn_event_thread(
    window: Window,
    tx: Sender<WindowInput>,
) -> Result<thread::JoinHandle<()>> {
    let events = window.open_events()?;
    let id = window.id();
    thread::Builder::new()
        .name(format!("acme-events-{id}"))
        .spawn(move || {
            let mut runes = RuneReader::new(BufReader::new(events));
            let mut decoder = EventDecoder::new();
            while !quit_requested() {
                let input = match decoder.next_event(&mut runes, &window) {
                    Ok(Some(event)) => {
                        log_debug_content(&format!(
                            "window {} event middle={} text={:?}",
                            window.id(),
                            event.middle,
                            event.text
                        ));
                        WindowInput::Event(event)
                    }
                    Ok(None) => WindowInput::Closed,
                    Err(err) => {
                        log_debug(&format!("window {} event read error: {err}", window.id()));
                        WindowInput::Failed(format!(
                            "reading events of window {}: {err}",
                            window.id()
                        ))
                    }
                };
                let last = !matches!(input, WindowInput::Event(_));
                if tx.send(input).is_err() || last {
                    break;
                }
            }
        })
        .with_context(|| format!("failed to spawn event reader for window {id}"))
}
