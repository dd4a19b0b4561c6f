use super::error::MpdError;
use super::{Connector, LibraryEntry, PlaybackService, PlayerStatus, Song};
use crate::config::ConnectionTarget;
use crate::log_debug;
use crate::pathcodec::service_uri;
use mpd::{Query, State, Status, Term};
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// TCP stream that remembers when the server hung up.
///
/// `mpd` ends a reply quietly at end of stream, so without this a dead
/// server reads as an empty answer.
#[derive(Debug)]
pub(super) struct Watched {
    stream: TcpStream,
    hung_up: Arc<AtomicBool>,
}

impl Read for Watched {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.stream.read(buf)?;
        if read == 0 && !buf.is_empty() {
            self.hung_up.store(true, Ordering::Relaxed);
        }
        Ok(read)
    }
}

impl Write for Watched {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// One TCP connection to MPD.
#[derive(Debug)]
pub struct MpdClient {
    client: mpd::Client<Watched>,
    hung_up: Arc<AtomicBool>,
    /// Set after a reply failed to parse; the stream position is unknown.
    desync: Option<String>,
}

impl MpdClient {
    /// Connect, read the greeting and log in when the target carries a password.
    pub fn connect(target: &ConnectionTarget) -> Result<Self, MpdError> {
        let address = target.address();
        let stream = TcpStream::connect((target.host.as_str(), target.port)).map_err(|source| {
            MpdError::Connect {
                address: address.clone(),
                source,
            }
        })?;
        let _ = stream.set_nodelay(true);
        let hung_up = Arc::new(AtomicBool::new(false));
        let watched = Watched {
            stream,
            hung_up: Arc::clone(&hung_up),
        };
        let client = match mpd::Client::new(watched) {
            Ok(client) => client,
            Err(_) if hung_up.load(Ordering::Relaxed) => {
                return Err(MpdError::ConnectionClosed(format!(
                    "{address} hung up before the greeting"
                )))
            }
            Err(err) => return Err(err.into()),
        };
        let mpd::Version(major, minor, patch) = client.version;
        log_debug(&format!(
            "connected to MPD {major}.{minor}.{patch} at {address}"
        ));

        let mut client = Self {
            client,
            hung_up,
            desync: None,
        };
        if let Some(password) = &target.password {
            client.run(|mpd| mpd.login(password))?;
        }
        Ok(client)
    }

    /// Run one exchange. A hang-up wins over whatever `mpd` made of the
    /// truncated reply; a parse failure poisons the connection.
    fn run<T>(
        &mut self,
        exchange: impl FnOnce(&mut mpd::Client<Watched>) -> mpd::error::Result<T>,
    ) -> Result<T, MpdError> {
        if let Some(reason) = &self.desync {
            return Err(MpdError::ConnectionClosed(format!(
                "out of step after {reason}"
            )));
        }
        let result = exchange(&mut self.client);
        if self.hung_up.load(Ordering::Relaxed) {
            return Err(MpdError::ConnectionClosed("server hung up".to_string()));
        }
        result.map_err(|err| {
            let err = MpdError::from(err);
            if let MpdError::Protocol(reason) = &err {
                self.desync = Some(reason.clone());
            }
            err
        })
    }
}

fn place(position: i32) -> Result<u32, MpdError> {
    u32::try_from(position).map_err(|_| MpdError::BadPosition(position))
}

/// `mpd` takes paths as songs.
fn song_path(uri: &str) -> mpd::Song {
    mpd::Song {
        file: uri.to_string(),
        ..Default::default()
    }
}

fn child_uri(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

pub(super) fn player_status(status: &Status) -> PlayerStatus {
    let state = match status.state {
        State::Play => "play",
        State::Pause => "pause",
        State::Stop => "stop",
    };
    PlayerStatus {
        state: state.to_string(),
        song: status
            .song
            .map(|song| song.pos.to_string())
            .unwrap_or_default(),
        time: status
            .time
            .map(|(elapsed, total)| format!("{}:{}", elapsed.as_secs(), total.as_secs()))
            .unwrap_or_default(),
    }
}

/// Whole seconds from `Time`, else from the fractional `duration` tag.
pub(super) fn queue_song(song: mpd::Song) -> Song {
    let duration_secs = song
        .duration
        .map(|duration| duration.as_secs())
        .or_else(|| {
            song.tags
                .iter()
                .find(|(key, _)| key == "duration")
                .and_then(|(_, secs)| secs.parse::<f64>().ok())
                .map(|secs| secs.max(0.0) as u64)
        })
        .unwrap_or(0);
    Song {
        position: song
            .place
            .map(|place| place.pos.to_string())
            .unwrap_or_default(),
        file: song.file,
        artist: song.artist,
        title: song.title,
        duration_secs,
    }
}

impl PlaybackService for MpdClient {
    fn status(&mut self) -> Result<PlayerStatus, MpdError> {
        self.run(|mpd| mpd.status()).map(|status| player_status(&status))
    }

    fn playlist_info(&mut self, position: Option<i32>) -> Result<Vec<Song>, MpdError> {
        let songs = match position {
            Some(position) => {
                let position = place(position)?;
                self.run(|mpd| mpd.songs(position))?
            }
            None => self.run(|mpd| mpd.queue())?,
        };
        Ok(songs.into_iter().map(queue_song).collect())
    }

    /// Directories from `listfiles`, then the songs `lsinfo` knows about.
    fn list_info(&mut self, path: &str) -> Result<Vec<LibraryEntry>, MpdError> {
        let uri = service_uri(path);
        let mut entries: Vec<LibraryEntry> = self
            .run(|mpd| mpd.listfiles(uri))?
            .into_iter()
            .filter(|(key, _)| key == "directory")
            .map(|(_, name)| LibraryEntry::Directory(child_uri(uri, &name)))
            .collect();
        let songs = self.run(|mpd| mpd.lsinfo(&song_path(uri)))?;
        // A listing without songs comes back as one record with no file.
        entries.extend(
            songs
                .into_iter()
                .filter(|song| !song.file.is_empty())
                .map(|song| LibraryEntry::File(song.file)),
        );
        Ok(entries)
    }

    fn play(&mut self, position: Option<i32>) -> Result<(), MpdError> {
        match position {
            Some(position) => {
                let position = place(position)?;
                self.run(|mpd| mpd.switch(position))
            }
            None => self.run(|mpd| mpd.play()),
        }
    }

    fn stop(&mut self) -> Result<(), MpdError> {
        self.run(|mpd| mpd.stop())
    }

    fn pause(&mut self, paused: bool) -> Result<(), MpdError> {
        self.run(|mpd| mpd.pause(paused))
    }

    fn next(&mut self) -> Result<(), MpdError> {
        self.run(|mpd| mpd.next())
    }

    fn clear(&mut self) -> Result<(), MpdError> {
        self.run(|mpd| mpd.clear())
    }

    fn shuffle(&mut self) -> Result<(), MpdError> {
        self.run(|mpd| mpd.shuffle(..))
    }

    fn consume(&mut self, enabled: bool) -> Result<(), MpdError> {
        self.run(|mpd| mpd.consume(enabled))
    }

    fn move_song(&mut self, from: i32, to: i32) -> Result<(), MpdError> {
        let (from, to) = (place(from)?, place(to)?);
        self.run(|mpd| mpd.shift(from, to as usize))
    }

    fn delete(&mut self, position: i32) -> Result<(), MpdError> {
        let position = place(position)?;
        self.run(|mpd| mpd.delete(position))
    }

    fn delete_range(&mut self, start: i32, end: i32) -> Result<(), MpdError> {
        let range = place(start)?..place(end)?;
        self.run(|mpd| mpd.delete(range))
    }

    /// One `findadd`: by exact file when `lsinfo` names the path as a song,
    /// otherwise everything below it. A retry never queues a song twice.
    fn add(&mut self, path: &str) -> Result<(), MpdError> {
        let uri = service_uri(path);
        let is_song = !uri.is_empty()
            && self
                .run(|mpd| mpd.lsinfo(&song_path(uri)))?
                .iter()
                .any(|song| song.file == uri);
        let term = if is_song { Term::File } else { Term::Base };
        let mut query = Query::new();
        query.and(term, uri);
        self.run(|mpd| mpd.findadd(&query))
    }

    /// `mpd` only issues a bare `update`, so the whole database is rescanned.
    fn update(&mut self, path: &str) -> Result<u32, MpdError> {
        log_debug(&format!("database update requested for '{}'", service_uri(path)));
        self.run(|mpd| mpd.update())
    }
}

/// Connects to a fixed MPD target.
#[derive(Debug, Clone)]
pub struct MpdConnector {
    target: ConnectionTarget,
}

impl MpdConnector {
    pub fn new(target: ConnectionTarget) -> Self {
        Self { target }
    }
}

impl Connector for MpdConnector {
    fn connect(&self) -> Result<Box<dyn PlaybackService>, MpdError> {
        Ok(Box::new(MpdClient::connect(&self.target)?))
    }

    fn describe(&self) -> String {
        self.target.address()
    }
}
