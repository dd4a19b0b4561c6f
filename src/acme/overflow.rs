use super::event::OverflowText;
use super::runes::RuneReader;
use super::Window;
use anyhow::{Context, Result};
use std::io::BufReader;

impl Window {
    /// Read the runes `#start,#end` of the body through `addr` and `data`.
    ///
    /// A short read is not an error: the body may have changed since the
    /// click was reported.
    pub fn read_range(&self, start: usize, end: usize) -> Result<String> {
        let count = end.saturating_sub(start);
        self.set_addr(&format!("#{start}"))?;
        let data = self.open_data()?;
        RuneReader::new(BufReader::new(data))
            .read_runes(count)
            .with_context(|| format!("failed to read data of window {}", self.id()))
    }
}

impl OverflowText for Window {
    fn overflow_text(&self, start: usize, end: usize) -> Result<String> {
        self.read_range(start, end)
    }
}
