use super::{log_failure, report, App, Flow};
use crate::acme::Event;
use crate::pathcodec::parent_dir;
use anyhow::Result;
use std::sync::Arc;

/// Middle-click commands of the playlist window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaylistCommand {
    Quit,
    Play,
    Stop,
    Pause,
    Next,
    Clear,
    Shuffle,
    Consume,
    NoConsume,
    Refresh,
    Browse,
    Move { from: i32, to: i32 },
    Delete(i32),
    /// End-exclusive, as MPD takes it.
    DeleteRange { start: i32, end: i32 },
    PlayPosition(i32),
}

/// Integer fields after a command word; `None` unless there are exactly `N`.
fn int_args<const N: usize>(text: &str) -> Option<[i32; N]> {
    let fields: Vec<&str> = text.split_whitespace().skip(1).collect();
    if fields.len() != N {
        return None;
    }
    let mut out = [0; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = field.parse().ok()?;
    }
    Some(out)
}

impl PlaylistCommand {
    pub(crate) fn parse(text: &str) -> Option<Self> {
        let command = match text {
            "Quit" => Self::Quit,
            "Play" => Self::Play,
            "Stop" => Self::Stop,
            "Pause" => Self::Pause,
            "Next" => Self::Next,
            "Clear" => Self::Clear,
            "Shuffle" => Self::Shuffle,
            "Consume" => Self::Consume,
            "NoConsume" => Self::NoConsume,
            "Refresh" => Self::Refresh,
            "Browse" => Self::Browse,
            _ => match text.split_whitespace().next()? {
                "Move" => {
                    let [from, to] = int_args::<2>(text)?;
                    Self::Move { from, to }
                }
                "Del" => {
                    let [position] = int_args::<1>(text)?;
                    Self::Delete(position)
                }
                "rDel" => {
                    let [start, end] = int_args::<2>(text)?;
                    Self::DeleteRange { start, end }
                }
                _ => Self::PlayPosition(text.parse().ok()?),
            },
        };
        Some(command)
    }

    /// Whether the queue itself changed, so the whole window is redrawn.
    fn full_refresh(self) -> bool {
        matches!(
            self,
            Self::Clear
                | Self::Shuffle
                | Self::Move { .. }
                | Self::Delete(_)
                | Self::DeleteRange { .. }
                | Self::Refresh
        )
    }
}

impl App {
    pub(crate) fn handle_playlist_event(self: &Arc<Self>, event: &Event) -> Result<Flow> {
        if event.middle {
            match PlaylistCommand::parse(&event.text) {
                Some(command) => return self.run_playlist_command(command),
                None => return Ok(Flow::Continue),
            }
        }

        // Look click on a queue position: browse the song's directory.
        let Ok(position) = event.text.parse::<i32>() else {
            return Ok(Flow::Continue);
        };
        let songs = match self
            .session
            .call("playlistinfo", |mpd| mpd.playlist_info(Some(position)))
        {
            Ok(songs) => songs,
            Err(err) => {
                report("playlist entry", &err);
                return Ok(Flow::Continue);
            }
        };
        if let Some(song) = songs.first() {
            if let Err(err) = self.open_browser(&parent_dir(&song.file)) {
                report("browse", &format!("{err:#}"));
            }
        }
        Ok(Flow::Continue)
    }

    fn run_playlist_command(self: &Arc<Self>, command: PlaylistCommand) -> Result<Flow> {
        let session = &self.session;
        let outcome = match command {
            PlaylistCommand::Quit => {
                self.shutdown();
                return Ok(Flow::Quit);
            }
            PlaylistCommand::Browse => {
                if let Err(err) = self.open_browser("/") {
                    report("browse", &format!("{err:#}"));
                }
                Ok(())
            }
            PlaylistCommand::Refresh => Ok(()),
            PlaylistCommand::Play => session.call("play", |mpd| mpd.play(None)),
            PlaylistCommand::Stop => session.call("stop", |mpd| mpd.stop()),
            PlaylistCommand::Pause => session.call("pause", |mpd| mpd.pause(true)),
            PlaylistCommand::Next => session.call("next", |mpd| mpd.next()),
            PlaylistCommand::Clear => session.call("clear", |mpd| mpd.clear()),
            PlaylistCommand::Shuffle => session.call("shuffle", |mpd| mpd.shuffle()),
            PlaylistCommand::Consume => session.call("consume", |mpd| mpd.consume(true)),
            PlaylistCommand::NoConsume => session.call("consume", |mpd| mpd.consume(false)),
            PlaylistCommand::Move { from, to } => {
                session.call("move", |mpd| mpd.move_song(from, to))
            }
            PlaylistCommand::Delete(position) => {
                session.call("delete", |mpd| mpd.delete(position))
            }
            PlaylistCommand::DeleteRange { start, end } => {
                session.call("delete", |mpd| mpd.delete_range(start, end))
            }
            PlaylistCommand::PlayPosition(position) => {
                session.call("play", |mpd| mpd.play(Some(position)))
            }
        };
        if let Err(err) = outcome {
            log_failure(&format!("{command:?}"), &err);
        }
        self.refresh(command.full_refresh())?;
        Ok(Flow::Continue)
    }
}
