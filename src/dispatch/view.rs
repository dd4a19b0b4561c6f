//! Text written into window bodies.

use crate::mpd::{LibraryEntry, PlayerStatus, Song};
use crate::pathcodec::{base_name, encode, service_uri};
use std::fmt::Write;

/// Columns of a status line, newline included. A status-only refresh erases
/// exactly this many runes before rewriting.
pub(crate) const STATUS_WIDTH: usize = 52;

fn clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub(crate) fn render_playlist(songs: &[Song]) -> String {
    let mut out = String::new();
    let mut total = 0;
    for song in songs {
        total += song.duration_secs;
        let time = clock(song.duration_secs);
        let _ = match (&song.artist, &song.title) {
            (Some(artist), Some(title)) if !artist.is_empty() && !title.is_empty() => {
                writeln!(out, "# {} # {artist} - {title} # {time}", song.position)
            }
            _ => writeln!(out, "# {} # {} # {time}", song.position, song.file),
        };
    }
    let _ = writeln!(out, "TOTAL: {}:{:02}", total / 60, total % 60);
    out
}

pub(crate) fn render_status(status: &PlayerStatus) -> String {
    format!(
        "State: {:<5} Song: {:<5} Time: {:<20}\n",
        status.state, status.song, status.time
    )
}

/// Browse body: a header naming `path`, then one clickable name per entry.
pub(crate) fn render_listing(path: &str, entries: &[LibraryEntry]) -> String {
    let mut out = format!("current path: /{}\n", encode(service_uri(path)));
    for entry in entries {
        out.push_str(&encode(base_name(entry.uri())));
        out.push('\n');
    }
    out
}
