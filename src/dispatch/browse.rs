use super::{log_failure, report, App, Flow, INFO_NAME, INFO_TAG};
use crate::acme::Event;
use crate::pathcodec::{decode, resolve, service_uri};
use crate::{lock_or_recover, log_debug, log_debug_content};
use anyhow::{Context, Result};
use std::process::{Command, Stdio};

impl App {
    fn current_path(&self) -> String {
        lock_or_recover(&self.browser, "browse state")
            .current_path
            .clone()
    }

    pub(crate) fn handle_browse_event(&self, event: &Event) -> Result<Flow> {
        let text = decode(&event.text);
        if !event.middle {
            self.navigate(text.trim_matches(' '))?;
            return Ok(Flow::Continue);
        }

        match text.as_str() {
            "Close" => return Ok(Flow::Close),
            "Update" => self.update(),
            _ if text.starts_with("Info") => self.show_info(&text)?,
            _ => self.add_paths(&text)?,
        }
        Ok(Flow::Continue)
    }

    /// Look click: list the clicked directory, keeping the old path on failure.
    fn navigate(&self, rel: &str) -> Result<()> {
        let mut browser = lock_or_recover(&self.browser, "browse state");
        let state = &mut *browser;
        let target = resolve(&state.current_path, rel);
        let Some(body) = state.view.as_mut() else {
            return Ok(());
        };
        if self.show_listing(body, &target)? {
            log_debug_content(&format!("browsing {target:?}"));
            state.current_path = target;
        }
        Ok(())
    }

    fn update(&self) {
        let path = self.current_path();
        println!("Updating");
        match self.session.call("update", |mpd| mpd.update(&path)) {
            Ok(job) => log_debug(&format!("database update job {job} started")),
            Err(err) => report(
                &format!("failure to update path '{}'", service_uri(&path)),
                &err,
            ),
        }
    }

    /// `Info <rel...>`: run the helper on one path into a fresh window.
    fn show_info(&self, text: &str) -> Result<()> {
        let words: Vec<&str> = text.split_whitespace().skip(1).collect();
        if words.is_empty() {
            return Ok(());
        }
        let path = resolve(&self.current_path(), &words.join(" "));
        let uri = service_uri(&path);

        let window = self
            .acme
            .create_window()
            .context("failed to create info window")?;
        window.set_name(INFO_NAME)?;
        window.set_tag(INFO_TAG)?;
        let body = window.open_body()?;

        let Some((program, fixed_args)) = self.info_cmd.split_first() else {
            return Ok(());
        };
        let spawned = Command::new(program)
            .args(fixed_args)
            .arg(uri)
            .stdin(Stdio::null())
            .stdout(Stdio::from(body.try_clone_file()?))
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                report(&format!("failed to run {program}"), &err);
                return Ok(());
            }
        };
        match child.wait() {
            Ok(status) => log_debug(&format!("{program} exited with {status}")),
            Err(err) => log_debug(&format!("waiting for {program} failed: {err}")),
        }
        Ok(())
    }

    /// Queue every non-blank line of `text`, resolved against the current path.
    ///
    /// Only the first add may reconnect; the rest run on whatever connection
    /// that leaves, so a drop mid-way never queues a track twice.
    fn add_paths(&self, text: &str) -> Result<()> {
        let current = self.current_path();
        let paths: Vec<String> = text
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(|line| resolve(&current, line))
            .collect();
        let Some((first, rest)) = paths.split_first() else {
            return Ok(());
        };

        let mut last = self.session.call("add", |mpd| mpd.add(first));
        for path in rest {
            if let Err(err) = &last {
                log_failure("add", err);
            }
            last = self.session.call_once("add", |mpd| mpd.add(path));
        }
        match last {
            Ok(()) => {
                log_debug_content(&format!("queued {} path(s) from {current:?}", paths.len()));
                self.refresh(true)
            }
            Err(err) => {
                log_failure("add", &err);
                Ok(())
            }
        }
    }
}
