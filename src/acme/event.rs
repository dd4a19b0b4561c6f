//! Decoder for a window's `event` file.
//!
//! Each record reads `<origin><kind><q0> <q1> <flag> <nr> <text>\n`, where
//! `q0`/`q1` bound the clicked range in the body and `nr` is the rune length
//! of `text`. acme leaves `text` out (`nr == 0`) once the range reaches
//! [`INLINE_TEXT_LIMIT`] runes; it is then read back through `addr`/`data`.

use super::runes::RuneReader;
use crate::{log_debug, log_debug_content};
use std::io::{self, BufRead};
use std::mem;

/// Longest text acme puts in an event record.
pub const INLINE_TEXT_LIMIT: i64 = 256;

/// Number of fields terminated once the `nr` field is complete.
const LENGTH_FIELD: usize = 4;

/// A click the dispatcher acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Button 2 (execute) rather than button 3 (look).
    pub middle: bool,
    pub text: String,
}

/// Source for event text acme left out of the record.
pub trait OverflowText {
    fn overflow_text(&self, start: usize, end: usize) -> anyhow::Result<String>;
}

#[derive(Debug, Default)]
struct ParserCursor {
    field_index: usize,
    field: String,
    mouse: bool,
    middle: bool,
    start: Option<i64>,
    end: Option<i64>,
}

impl ParserCursor {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn read_origin(&mut self, field: &str) {
        if field.chars().count() <= 2 {
            return;
        }
        let mut chars = field.chars();
        if chars.next() != Some('M') {
            return;
        }
        match chars.next() {
            Some('x' | 'X') => self.middle = true,
            Some('l' | 'L') => self.middle = false,
            _ => return,
        }
        self.mouse = true;
        self.start = chars.as_str().parse().ok();
    }

    /// Range worth fetching through `data`, if the record really elided its text.
    fn overflow_range(&self) -> Option<(usize, usize)> {
        let (start, end) = (self.start?, self.end?);
        if start < 0 || end < 0 || end - start < INLINE_TEXT_LIMIT {
            return None;
        }
        Some((usize::try_from(start).ok()?, usize::try_from(end).ok()?))
    }
}

/// Rune-at-a-time state machine over one window's event stream.
#[derive(Debug, Default)]
pub struct EventDecoder {
    cursor: ParserCursor,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read until the next non-empty event. `Ok(None)` means the stream ended.
    pub fn next_event<R: BufRead>(
        &mut self,
        runes: &mut RuneReader<R>,
        overflow: &dyn OverflowText,
    ) -> io::Result<Option<Event>> {
        loop {
            let Some(ch) = runes.read_rune()? else {
                return Ok(None);
            };
            match ch {
                '\n' => self.cursor.reset(),
                ' ' => {
                    if let Some(event) = self.end_field(runes, overflow)? {
                        if !event.text.is_empty() {
                            return Ok(Some(event));
                        }
                    }
                }
                _ => self.cursor.field.push(ch),
            }
        }
    }

    fn end_field<R: BufRead>(
        &mut self,
        runes: &mut RuneReader<R>,
        overflow: &dyn OverflowText,
    ) -> io::Result<Option<Event>> {
        self.cursor.field_index += 1;
        let field = mem::take(&mut self.cursor.field);
        match self.cursor.field_index {
            1 => self.cursor.read_origin(&field),
            2 => self.cursor.end = field.parse().ok(),
            LENGTH_FIELD if self.cursor.mouse => return self.read_text(&field, runes, overflow),
            _ => {}
        }
        Ok(None)
    }

    fn read_text<R: BufRead>(
        &mut self,
        length_field: &str,
        runes: &mut RuneReader<R>,
        overflow: &dyn OverflowText,
    ) -> io::Result<Option<Event>> {
        let Ok(length) = length_field.parse::<i64>() else {
            return Ok(None);
        };
        let middle = self.cursor.middle;
        if length > 0 {
            let count = usize::try_from(length).unwrap_or(usize::MAX);
            let text = runes.read_runes(count)?;
            return Ok(Some(Event { middle, text }));
        }
        if length < 0 {
            return Ok(None);
        }

        let Some((start, end)) = self.cursor.overflow_range() else {
            return Ok(None);
        };
        match overflow.overflow_text(start, end) {
            Ok(text) => {
                log_debug_content(&format!("overflow text #{start},#{end}: {text:?}"));
                Ok(Some(Event { middle, text }))
            }
            Err(err) => {
                log_debug(&format!("dropping event #{start},#{end}: {err:#}"));
                Ok(None)
            }
        }
    }
}
