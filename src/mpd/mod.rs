//! MPD access, reduced to the commands samc issues.
//!
//! The wire protocol belongs to the `mpd` crate. The rest of samc only sees
//! [`PlaybackService`] and [`Connector`], so the session can swap connections
//! and tests can stand in for a server.

mod client;
mod error;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{MpdClient, MpdConnector};
pub use error::MpdError;

/// Subset of `status` shown in the playlist window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStatus {
    pub state: String,
    pub song: String,
    /// `elapsed:total` in seconds; empty while stopped.
    pub time: String,
}

/// One queue entry from `playlistinfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Song {
    pub position: String,
    pub file: String,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub duration_secs: u64,
}

/// One browse entry; URIs are relative to the music directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEntry {
    Directory(String),
    File(String),
}

impl LibraryEntry {
    pub fn uri(&self) -> &str {
        match self {
            LibraryEntry::Directory(uri) | LibraryEntry::File(uri) => uri,
        }
    }
}

/// The calls samc makes against the playback service.
///
/// Paths are absolute browse paths (`/music/jazz`); implementations map them
/// to whatever the service expects.
pub trait PlaybackService: Send {
    fn status(&mut self) -> Result<PlayerStatus, MpdError>;
    /// Whole queue, or the single entry at `position`.
    fn playlist_info(&mut self, position: Option<i32>) -> Result<Vec<Song>, MpdError>;
    fn list_info(&mut self, path: &str) -> Result<Vec<LibraryEntry>, MpdError>;
    /// Resume or start the current song when `position` is `None`.
    fn play(&mut self, position: Option<i32>) -> Result<(), MpdError>;
    fn stop(&mut self) -> Result<(), MpdError>;
    fn pause(&mut self, paused: bool) -> Result<(), MpdError>;
    fn next(&mut self) -> Result<(), MpdError>;
    fn clear(&mut self) -> Result<(), MpdError>;
    fn shuffle(&mut self) -> Result<(), MpdError>;
    fn consume(&mut self, enabled: bool) -> Result<(), MpdError>;
    fn move_song(&mut self, from: i32, to: i32) -> Result<(), MpdError>;
    fn delete(&mut self, position: i32) -> Result<(), MpdError>;
    /// Remove positions `start..end`.
    fn delete_range(&mut self, start: i32, end: i32) -> Result<(), MpdError>;
    fn add(&mut self, path: &str) -> Result<(), MpdError>;
    /// Start a database rescan for `path`; returns the update job id.
    fn update(&mut self, path: &str) -> Result<u32, MpdError>;
}

/// Opens connections for the session, initially and after a drop.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn PlaybackService>, MpdError>;

    /// Where connections go, for log lines.
    fn describe(&self) -> String;
}
