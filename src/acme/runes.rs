use std::io::{self, BufRead, ErrorKind};

/// Reads a byte stream one UTF-8 rune at a time.
///
/// Malformed sequences come out as U+FFFD, one per offending byte run, the
/// way acme itself counts them.
#[derive(Debug)]
pub struct RuneReader<R> {
    inner: R,
}

impl<R: BufRead> RuneReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            let buf = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            self.inner.consume(1);
            return Ok(Some(byte));
        }
    }

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Next rune, or `None` at end of stream.
    pub fn read_rune(&mut self) -> io::Result<Option<char>> {
        let Some(lead) = self.next_byte()? else {
            return Ok(None);
        };
        let width = match lead {
            0x00..=0x7F => return Ok(Some(lead as char)),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Ok(Some(char::REPLACEMENT_CHARACTER)),
        };

        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            match self.peek_byte()? {
                Some(next) if next & 0xC0 == 0x80 => {
                    *slot = next;
                    self.inner.consume(1);
                }
                // Leave the byte for the next rune; it may be a newline.
                _ => return Ok(Some(char::REPLACEMENT_CHARACTER)),
            }
        }
        Ok(Some(
            std::str::from_utf8(&bytes[..width])
                .ok()
                .and_then(|s| s.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER),
        ))
    }

    /// Read up to `count` runes; stops early at end of stream.
    pub fn read_runes(&mut self, count: usize) -> io::Result<String> {
        let mut text = String::new();
        for _ in 0..count {
            match self.read_rune()? {
                Some(ch) => text.push(ch),
                None => break,
            }
        }
        Ok(text)
    }
}
