//! acme's file-system interface, as far as samc uses it.
//!
//! Every window is a directory `<root>/<id>/` with `ctl`, `tag`, `body`,
//! `addr`, `data` and `event` files; reading `<root>/new/ctl` creates a
//! window and reports its id.

mod event;
mod overflow;
mod runes;
mod spawn;


pub use event::{Event, EventDecoder, OverflowText, INLINE_TEXT_LIMIT};
pub use runes::RuneReader;
pub use spawn::{quit_requested, request_quit, spawn_event_thread, WindowInput};

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Index of the body length among the numbers in a window's `ctl` file.
const CTL_BODY_LENGTH_FIELD: usize = 2;

const BACKSPACE: char = '\u{8}';

/// Handle on the mounted acme file system.
#[derive(Debug, Clone)]
pub struct Acme {
    root: PathBuf,
}

impl Acme {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open a fresh window.
    pub fn create_window(&self) -> Result<Window> {
        let ctl = self.root.join("new").join("ctl");
        let contents = fs::read_to_string(&ctl)
            .with_context(|| format!("failed to create window via {}", ctl.display()))?;
        let id = contents
            .split_whitespace()
            .next()
            .and_then(|field| field.parse::<u32>().ok())
            .ok_or_else(|| anyhow!("{} did not report a window id", ctl.display()))?;
        Ok(self.window(id))
    }

    /// Handle on an existing window.
    pub fn window(&self, id: u32) -> Window {
        Window {
            dir: self.root.join(id.to_string()),
            id,
        }
    }
}

/// One acme window. Cloning does not open anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    dir: PathBuf,
    id: u32,
}

impl Window {
    pub fn id(&self) -> u32 {
        self.id
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn append_to(&self, name: &str, text: &str) -> Result<()> {
        let path = self.file(name);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))
    }

    /// Send a control message such as `name x` or `delete`.
    pub fn ctl(&self, message: &str) -> Result<()> {
        self.append_to("ctl", &format!("{message}\n"))
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        self.ctl(&format!("name {name}"))
    }

    /// Append the clickable words shown in the window's tag.
    pub fn set_tag(&self, words: &str) -> Result<()> {
        self.append_to("tag", words)
    }

    pub fn delete(&self) -> Result<()> {
        self.ctl("delete")
    }

    /// Move the `addr` cursor that `data` reads from.
    pub fn set_addr(&self, addr: &str) -> Result<()> {
        self.append_to("addr", addr)
    }

    pub fn open_data(&self) -> Result<File> {
        let path = self.file("data");
        File::open(&path).with_context(|| format!("failed to open {}", path.display()))
    }

    pub fn open_events(&self) -> Result<File> {
        let path = self.file("event");
        File::open(&path).with_context(|| format!("failed to open {}", path.display()))
    }

    /// Number of runes in the body, as reported by `ctl`.
    pub fn body_length(&self) -> Result<usize> {
        let path = self.file("ctl");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        contents
            .split_whitespace()
            .nth(CTL_BODY_LENGTH_FIELD)
            .and_then(|field| field.parse::<usize>().ok())
            .ok_or_else(|| anyhow!("{} has no body length", path.display()))
    }

    pub fn open_body(&self) -> Result<Body> {
        let path = self.file("body");
        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Body {
            window: self.clone(),
            file,
        })
    }
}

/// Open `body` file of a window; writes append, backspaces erase.
#[derive(Debug)]
pub struct Body {
    window: Window,
    file: File,
}

impl Body {
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.file
            .write_all(text.as_bytes())
            .with_context(|| format!("failed to write body of window {}", self.window.id))
    }

    /// Erase the last `runes` runes.
    pub fn erase(&mut self, runes: usize) -> Result<()> {
        if runes == 0 {
            return Ok(());
        }
        let backspaces: String = std::iter::repeat(BACKSPACE).take(runes).collect();
        self.write_str(&backspaces)
    }

    /// Erase the whole body.
    pub fn clear(&mut self) -> Result<()> {
        let length = self.window.body_length()?;
        self.erase(length)
    }

    /// Second handle on the body, for handing to a child process as stdout.
    pub fn try_clone_file(&self) -> Result<File> {
        self.file
            .try_clone()
            .with_context(|| format!("failed to duplicate body of window {}", self.window.id))
    }
}
