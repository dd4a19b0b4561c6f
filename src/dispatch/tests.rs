use super::playlist::PlaylistCommand;
use super::view::{render_listing, render_playlist, render_status, STATUS_WIDTH};
use super::*;
use crate::acme::Event;
use crate::mpd::fake::{closed, rejected, song, FakeMpd};
use crate::mpd::{LibraryEntry, PlayerStatus};
use crate::pathcodec::encode;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const PLAYLIST_ID: u32 = 1;
const PLAYLIST_BODY_LEN: usize = 10;

struct Harness {
    root: PathBuf,
    fake: FakeMpd,
    app: Arc<App>,
}

fn temp_acme_root(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let root = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    fs::create_dir_all(root.join("new")).unwrap();
    root
}

fn fake_window(root: &Path, id: u32, body_len: usize) {
    let dir = root.join(id.to_string());
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("ctl"),
        format!("{id:>11} {:>11} {body_len:>11} {:>11} {:>11} ", 32, 0, 0),
    )
    .unwrap();
    for name in ["tag", "body", "addr", "data", "event"] {
        fs::write(dir.join(name), "").unwrap();
    }
}

/// Make the next window acme hands out be `id`.
fn next_window(root: &Path, id: u32) {
    fake_window(root, id, 0);
    fs::write(root.join("new").join("ctl"), format!("{id:>11} ")).unwrap();
}

fn read(root: &Path, id: u32, name: &str) -> String {
    fs::read_to_string(root.join(id.to_string()).join(name)).unwrap()
}

fn status() -> PlayerStatus {
    PlayerStatus {
        state: "play".to_string(),
        song: "0".to_string(),
        time: "3:200".to_string(),
    }
}

fn harness(prefix: &str, info_cmd: &[&str]) -> Harness {
    let root = temp_acme_root(prefix);
    fake_window(&root, PLAYLIST_ID, PLAYLIST_BODY_LEN);
    fs::write(root.join("new").join("ctl"), format!("{PLAYLIST_ID:>11} ")).unwrap();

    let fake = FakeMpd::new();
    fake.with(|state| {
        state.status = status();
        state.queue = vec![song(0, "music/jazz/so_what.flac", 545)];
        state.listings = vec![
            (
                "/".to_string(),
                vec![LibraryEntry::Directory("music".to_string())],
            ),
            (
                "/music/jazz".to_string(),
                vec![LibraryEntry::File("music/jazz/so_what.flac".to_string())],
            ),
        ];
    });
    let session = Session::establish(fake.connector()).unwrap();
    let info_cmd = info_cmd.iter().map(|s| s.to_string()).collect();
    let app = App::with_event_loops(Acme::new(&root), session, info_cmd, false).unwrap();
    fake.with(|state| state.calls.clear());
    Harness { root, fake, app }
}

fn middle(text: &str) -> Event {
    Event {
        middle: true,
        text: text.to_string(),
    }
}

fn look(text: &str) -> Event {
    Event {
        middle: false,
        text: text.to_string(),
    }
}

fn current_path(app: &App) -> String {
    app.browser.lock().unwrap().current_path.clone()
}

// -------------------------------------------------------------------------
// Views
// -------------------------------------------------------------------------

#[test]
fn playlist_lines_prefer_artist_and_title() {
    let mut tagged = song(0, "a.flac", 61);
    tagged.artist = Some("Miles Davis".to_string());
    tagged.title = Some("So What".to_string());
    let mut untitled = song(1, "dir/b.ogg", 3599);
    untitled.artist = Some("Nobody".to_string());

    assert_eq!(
        render_playlist(&[tagged, untitled]),
        "# 0 # Miles Davis - So What # 01:01\n\
         # 1 # dir/b.ogg # 59:59\n\
         TOTAL: 61:00\n"
    );
    assert_eq!(render_playlist(&[]), "TOTAL: 0:00\n");
}

#[test]
fn status_line_is_fixed_width() {
    let line = render_status(&status());
    assert_eq!(line, "State: play  Song: 0     Time: 3:200               \n");
    assert_eq!(line.chars().count(), STATUS_WIDTH);
    assert_eq!(
        render_status(&PlayerStatus::default()).chars().count(),
        STATUS_WIDTH
    );
}

#[test]
fn listing_encodes_base_names() {
    let entries = vec![
        LibraryEntry::Directory("music/Kind of Blue (1959)".to_string()),
        LibraryEntry::File("music/intro.flac".to_string()),
    ];
    assert_eq!(
        render_listing("/music", &entries),
        format!(
            "current path: /music\n{}\n{}\n",
            encode("Kind of Blue (1959)"),
            encode("intro.flac")
        )
    );
    assert_eq!(render_listing("/", &[]), "current path: /\n");
}

// -------------------------------------------------------------------------
// Playlist commands
// -------------------------------------------------------------------------

#[test]
fn command_words_match_exactly() {
    assert_eq!(PlaylistCommand::parse("Play"), Some(PlaylistCommand::Play));
    assert_eq!(
        PlaylistCommand::parse("NoConsume"),
        Some(PlaylistCommand::NoConsume)
    );
    assert_eq!(PlaylistCommand::parse("play"), None);
    assert_eq!(PlaylistCommand::parse("Play "), None);
    assert_eq!(
        PlaylistCommand::parse("Move 3  7"),
        Some(PlaylistCommand::Move { from: 3, to: 7 })
    );
    assert_eq!(
        PlaylistCommand::parse("rDel 2 5"),
        Some(PlaylistCommand::DeleteRange { start: 2, end: 5 })
    );
    assert_eq!(
        PlaylistCommand::parse("12"),
        Some(PlaylistCommand::PlayPosition(12))
    );
}

#[test]
fn parametrized_commands_need_the_exact_word() {
    for text in [
        "Delete 3",
        "Dele 3",
        "Moves 1 2",
        "Movement 1 2",
        "rDelete 1 2",
        "rDel1 2 3",
    ] {
        assert_eq!(PlaylistCommand::parse(text), None, "{text}");
    }
    assert_eq!(PlaylistCommand::parse("Del 3"), Some(PlaylistCommand::Delete(3)));
    assert_eq!(
        PlaylistCommand::parse("  Del\t3 "),
        Some(PlaylistCommand::Delete(3))
    );
}

#[test]
fn start_fills_playlist_window() {
    let Harness { root, .. } = harness("samc_start", &["true"]);
    let ctl = read(&root, PLAYLIST_ID, "ctl");
    assert!(ctl.ends_with("name samc:\n"), "{ctl:?}");
    assert_eq!(read(&root, PLAYLIST_ID, "tag"), PLAYLIST_TAG);
    assert_eq!(
        read(&root, PLAYLIST_ID, "body"),
        format!(
            "# 0 # music/jazz/so_what.flac # 09:05\nTOTAL: 9:05\n{}",
            render_status(&status())
        )
    );
}

#[test]
fn del_deletes_and_redraws_whole_playlist() {
    let Harness { root, fake, app } = harness("samc_del", &["true"]);
    let before = read(&root, PLAYLIST_ID, "body");

    assert_eq!(app.handle_playlist_event(&middle("Del 3")).unwrap(), Flow::Continue);

    assert_eq!(fake.calls(), vec!["delete 3", "playlistinfo", "status"]);
    let after = read(&root, PLAYLIST_ID, "body");
    let redraw = &after[before.len()..];
    assert!(redraw.starts_with(&"\u{8}".repeat(PLAYLIST_BODY_LEN)));
    assert!(redraw.ends_with(&render_status(&status())));
    assert!(redraw.contains("TOTAL: 9:05\n"));
}

#[test]
fn malformed_commands_are_ignored() {
    let Harness { root, fake, app } = harness("samc_malformed", &["true"]);
    let before = read(&root, PLAYLIST_ID, "body");

    for text in [
        "Move 1", "Move a b", "Move 1 2 3", "Del", "Del x", "Delete 3", "rDel 1",
        "rDel 1 2 3", "rDel 1 x", "hello", "4.5",
    ] {
        assert_eq!(app.handle_playlist_event(&middle(text)).unwrap(), Flow::Continue);
    }
    assert_eq!(app.handle_playlist_event(&look("nope")).unwrap(), Flow::Continue);

    assert!(fake.calls().is_empty(), "{:?}", fake.calls());
    assert_eq!(read(&root, PLAYLIST_ID, "body"), before);
}

#[test]
fn transport_commands_rewrite_only_the_status_line() {
    let Harness { root, fake, app } = harness("samc_status", &["true"]);
    let before = read(&root, PLAYLIST_ID, "body");

    app.handle_playlist_event(&middle("Pause")).unwrap();
    app.handle_playlist_event(&middle("4")).unwrap();

    assert_eq!(fake.calls(), vec!["pause 1", "status", "play 4", "status"]);
    let erase_and_write = format!(
        "{}{}",
        "\u{8}".repeat(STATUS_WIDTH),
        render_status(&status())
    );
    assert_eq!(
        read(&root, PLAYLIST_ID, "body"),
        format!("{before}{erase_and_write}{erase_and_write}")
    );
}

#[test]
fn failed_command_still_refreshes() {
    let Harness { fake, app, .. } = harness("samc_rejected", &["true"]);
    fake.fail_call("move 0 9", rejected("move"));

    app.handle_playlist_event(&middle("Move 0 9")).unwrap();

    assert_eq!(fake.calls(), vec!["move 0 9", "playlistinfo", "status"]);
    assert_eq!(app.session().reconnect_count(), 0);
}

#[test]
fn browse_opens_window_at_root() {
    let Harness { root, fake, app } = harness("samc_browse", &["true"]);
    next_window(&root, 2);

    app.handle_playlist_event(&middle("Browse")).unwrap();

    assert_eq!(fake.calls(), vec!["lsinfo /", "status"]);
    assert!(read(&root, 2, "ctl").ends_with("name browse:\n"));
    assert_eq!(read(&root, 2, "tag"), BROWSE_TAG);
    assert_eq!(read(&root, 2, "body"), "current path: /\nmusic\n");
    assert_eq!(current_path(&app), "/");
}

#[test]
fn browse_reuses_open_window() {
    let Harness { root, fake, app } = harness("samc_browse_again", &["true"]);
    next_window(&root, 2);
    app.handle_playlist_event(&middle("Browse")).unwrap();
    next_window(&root, 3);

    app.handle_playlist_event(&middle("Browse")).unwrap();

    assert_eq!(read(&root, 3, "ctl").matches("name").count(), 0);
    assert_eq!(
        fake.calls(),
        vec!["lsinfo /", "status", "lsinfo /", "status"]
    );
    let view_id = app
        .browser
        .lock()
        .unwrap()
        .view
        .as_ref()
        .map(|body| body.window().id());
    assert_eq!(view_id, Some(2));
}

#[test]
fn look_click_on_queue_entry_browses_its_directory() {
    let Harness { root, fake, app } = harness("samc_look", &["true"]);
    next_window(&root, 2);

    app.handle_playlist_event(&look("0")).unwrap();

    assert_eq!(fake.calls(), vec!["playlistinfo 0", "lsinfo /music/jazz"]);
    assert_eq!(current_path(&app), "/music/jazz");
    assert_eq!(
        read(&root, 2, "body"),
        format!("current path: /music/jazz\n{}\n", encode("so_what.flac"))
    );
}

// -------------------------------------------------------------------------
// Browse commands
// -------------------------------------------------------------------------

fn browsing(prefix: &str, path: &str, info_cmd: &[&str]) -> Harness {
    let harness = harness(prefix, info_cmd);
    next_window(&harness.root, 2);
    harness.app.open_browser(path).unwrap();
    harness.fake.with(|state| state.calls.clear());
    harness
}

#[test]
fn clicked_path_is_added_relative_to_current_path() {
    let Harness { fake, app, .. } = browsing("samc_add", "/music", &["true"]);

    let flow = app.handle_browse_event(&middle("foo/bar.flac")).unwrap();

    assert_eq!(flow, Flow::Continue);
    assert_eq!(
        fake.calls(),
        vec!["add /music/foo/bar.flac", "playlistinfo", "status"]
    );
}

#[test]
fn only_the_first_of_several_adds_reconnects() {
    let Harness { fake, app, .. } = browsing("samc_multi_add", "/music", &["true"]);
    fake.fail_next(closed());

    app.handle_browse_event(&middle("a.flac\n\n  \nb.flac\n"))
        .unwrap();

    assert_eq!(app.session().reconnect_count(), 1);
    assert_eq!(
        fake.calls(),
        vec![
            "add /music/a.flac",
            "add /music/a.flac",
            "add /music/b.flac",
            "playlistinfo",
            "status",
        ]
    );
}

#[test]
fn failed_last_add_skips_refresh() {
    let Harness { fake, app, .. } = browsing("samc_add_fail", "/music", &["true"]);
    fake.fail_call("add /music/b.flac", closed());

    app.handle_browse_event(&middle("a.flac\nb.flac")).unwrap();

    assert_eq!(app.session().reconnect_count(), 0);
    assert_eq!(fake.calls(), vec!["add /music/a.flac", "add /music/b.flac"]);
}

#[test]
fn encoded_click_navigates_to_decoded_path() {
    let Harness { root, fake, app } = browsing("samc_nav", "/music", &["true"]);

    app.handle_browse_event(&look(&encode("jazz (live)"))).unwrap();
    assert_eq!(fake.calls(), vec!["lsinfo /music/jazz (live)"]);
    assert_eq!(current_path(&app), "/music/jazz (live)");

    app.handle_browse_event(&look("..")).unwrap();
    assert_eq!(current_path(&app), "/music");
    assert!(read(&root, 2, "body").ends_with("current path: /music\n"));
}

#[test]
fn failed_listing_keeps_current_path() {
    let Harness { root, fake, app } = browsing("samc_nav_fail", "/music", &["true"]);
    let before = read(&root, 2, "body");
    fake.fail_call("lsinfo /music/missing", rejected("lsinfo"));

    app.handle_browse_event(&look("missing")).unwrap();

    assert_eq!(current_path(&app), "/music");
    assert_eq!(read(&root, 2, "body"), before);
}

#[test]
fn close_and_update_are_browse_commands() {
    let Harness { fake, app, .. } = browsing("samc_close", "/music", &["true"]);

    assert_eq!(
        app.handle_browse_event(&middle("Update")).unwrap(),
        Flow::Continue
    );
    assert_eq!(fake.calls(), vec!["update /music"]);
    assert_eq!(app.handle_browse_event(&middle("Close")).unwrap(), Flow::Close);
}

#[test]
fn close_deletes_browse_window() {
    let Harness { root, app, .. } = browsing("samc_close_window", "/music", &["true"]);

    app.close_browser();

    assert!(read(&root, 2, "ctl").ends_with("delete\n"));
    assert!(app.browser.lock().unwrap().view.is_none());
    assert_eq!(current_path(&app), "/music");
}

#[test]
fn info_runs_helper_into_new_window() {
    let Harness { root, fake, app } = browsing("samc_info", "/music", &["echo", "-n"]);
    next_window(&root, 3);

    app.handle_browse_event(&middle(&format!("Info {}", encode("a b.flac"))))
        .unwrap();

    assert!(fake.calls().is_empty());
    assert!(read(&root, 3, "ctl").ends_with("name /tmp/songinfo\n"));
    assert_eq!(read(&root, 3, "tag"), "Delete");
    assert_eq!(read(&root, 3, "body"), "music/a b.flac");
}

#[test]
fn info_without_path_does_nothing() {
    let Harness { root, app, .. } = browsing("samc_info_empty", "/music", &["echo"]);
    next_window(&root, 3);

    app.handle_browse_event(&middle("Info")).unwrap();

    assert_eq!(read(&root, 3, "ctl").matches("name").count(), 0);
}
