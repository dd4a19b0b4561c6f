//! Scripted in-memory service for session and dispatcher tests.

use super::{Connector, LibraryEntry, MpdError, PlaybackService, PlayerStatus, Song};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    /// Every call, as `name args`, in order.
    pub calls: Vec<String>,
    pub connects: usize,
    /// Upcoming `connect` attempts that fail.
    pub failing_connects: usize,
    /// Errors returned by the next calls, front first.
    pub failures: VecDeque<MpdError>,
    /// Errors returned by the first call matching the given text.
    pub failing_calls: Vec<(String, MpdError)>,
    pub status: PlayerStatus,
    pub queue: Vec<Song>,
    pub listings: Vec<(String, Vec<LibraryEntry>)>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeMpd {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeMpd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().expect("fake state");
        f(&mut state)
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|state| state.calls.clone())
    }

    pub fn fail_next(&self, err: MpdError) {
        self.with(|state| state.failures.push_back(err));
    }

    pub fn fail_call(&self, call: &str, err: MpdError) {
        self.with(|state| state.failing_calls.push((call.to_string(), err)));
    }

    pub fn connector(&self) -> Box<dyn Connector> {
        Box::new(self.clone())
    }

    fn record(&self, call: String) -> Result<(), MpdError> {
        self.with(|state| {
            let targeted = state
                .failing_calls
                .iter()
                .position(|(text, _)| *text == call)
                .map(|idx| state.failing_calls.remove(idx).1);
            state.calls.push(call);
            if let Some(err) = targeted {
                return Err(err);
            }
            match state.failures.pop_front() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }
}

pub(crate) fn closed() -> MpdError {
    MpdError::ConnectionClosed("end of stream".to_string())
}

pub(crate) fn rejected(command: &str) -> MpdError {
    MpdError::Ack {
        code: 50,
        command: command.to_string(),
        message: "No such file".to_string(),
    }
}

pub(crate) fn song(position: u32, file: &str, secs: u64) -> Song {
    Song {
        position: position.to_string(),
        file: file.to_string(),
        artist: None,
        title: None,
        duration_secs: secs,
    }
}

impl Connector for FakeMpd {
    fn connect(&self) -> Result<Box<dyn PlaybackService>, MpdError> {
        self.with(|state| {
            state.connects += 1;
            if state.failing_connects > 0 {
                state.failing_connects -= 1;
                return Err(MpdError::Connect {
                    address: "fake:6600".to_string(),
                    source: std::io::ErrorKind::ConnectionRefused.into(),
                });
            }
            Ok(())
        })?;
        Ok(Box::new(self.clone()))
    }

    fn describe(&self) -> String {
        "fake:6600".to_string()
    }
}

fn position(position: Option<i32>) -> String {
    position.map(|p| format!(" {p}")).unwrap_or_default()
}

impl PlaybackService for FakeMpd {
    fn status(&mut self) -> Result<PlayerStatus, MpdError> {
        self.record("status".to_string())?;
        Ok(self.with(|state| state.status.clone()))
    }

    fn playlist_info(&mut self, pos: Option<i32>) -> Result<Vec<Song>, MpdError> {
        self.record(format!("playlistinfo{}", position(pos)))?;
        Ok(self.with(|state| match pos {
            Some(pos) => state
                .queue
                .iter()
                .filter(|song| song.position == pos.to_string())
                .cloned()
                .collect(),
            None => state.queue.clone(),
        }))
    }

    fn list_info(&mut self, path: &str) -> Result<Vec<LibraryEntry>, MpdError> {
        self.record(format!("lsinfo {path}"))?;
        Ok(self.with(|state| {
            state
                .listings
                .iter()
                .find(|(dir, _)| dir == path)
                .map(|(_, entries)| entries.clone())
                .unwrap_or_default()
        }))
    }

    fn play(&mut self, pos: Option<i32>) -> Result<(), MpdError> {
        self.record(format!("play{}", position(pos)))
    }

    fn stop(&mut self) -> Result<(), MpdError> {
        self.record("stop".to_string())
    }

    fn pause(&mut self, paused: bool) -> Result<(), MpdError> {
        self.record(format!("pause {}", u8::from(paused)))
    }

    fn next(&mut self) -> Result<(), MpdError> {
        self.record("next".to_string())
    }

    fn clear(&mut self) -> Result<(), MpdError> {
        self.record("clear".to_string())
    }

    fn shuffle(&mut self) -> Result<(), MpdError> {
        self.record("shuffle".to_string())
    }

    fn consume(&mut self, enabled: bool) -> Result<(), MpdError> {
        self.record(format!("consume {}", u8::from(enabled)))
    }

    fn move_song(&mut self, from: i32, to: i32) -> Result<(), MpdError> {
        self.record(format!("move {from} {to}"))
    }

    fn delete(&mut self, pos: i32) -> Result<(), MpdError> {
        self.record(format!("delete {pos}"))
    }

    fn delete_range(&mut self, start: i32, end: i32) -> Result<(), MpdError> {
        self.record(format!("delete {start}:{end}"))
    }

    fn add(&mut self, path: &str) -> Result<(), MpdError> {
        self.record(format!("add {path}"))
    }

    fn update(&mut self, path: &str) -> Result<u32, MpdError> {
        self.record(format!("update {path}"))?;
        Ok(1)
    }
}
