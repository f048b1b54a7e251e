//! Editable single-line buffer backing every prompt.

/// A cursor-repositioning operation over a [`Line`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Start,
    End,
    PrevChar,
    NextChar,
    PrevWord,
    NextWord,
}

/// Byte buffer with a cursor in `0..=buf.len()`.
///
/// All indices are clamped internally, so no operation can fail.
pub struct Line {
    buf: Vec<u8>,
    cursor: usize,
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// UTF-8 continuation byte; pre-filled buffers may hold multi-byte names.
fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

impl Line {
    /// Create a buffer pre-filled with `init`, cursor at the end.
    pub fn new(init: &str) -> Self {
        Self {
            buf: init.as_bytes().to_vec(),
            cursor: init.len(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Splice `ch` in at the cursor and advance past it.
    pub fn insert(&mut self, ch: u8) {
        self.buf.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn apply(&mut self, motion: Motion) {
        match motion {
            Motion::Start => self.cursor = 0,
            Motion::End => self.cursor = self.buf.len(),
            Motion::PrevChar => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    while self.cursor > 0 && is_continuation(self.buf[self.cursor]) {
                        self.cursor -= 1;
                    }
                }
            }
            Motion::NextChar => {
                if self.cursor < self.buf.len() {
                    self.cursor += 1;
                    while self.cursor < self.buf.len() && is_continuation(self.buf[self.cursor]) {
                        self.cursor += 1;
                    }
                }
            }
            Motion::PrevWord => {
                while self.cursor > 0 && !is_word(self.buf[self.cursor - 1]) {
                    self.cursor -= 1;
                }
                while self.cursor > 0 && is_word(self.buf[self.cursor - 1]) {
                    self.cursor -= 1;
                }
            }
            Motion::NextWord => {
                while self.cursor < self.buf.len() && !is_word(self.buf[self.cursor]) {
                    self.cursor += 1;
                }
                while self.cursor < self.buf.len() && is_word(self.buf[self.cursor]) {
                    self.cursor += 1;
                }
            }
        }
    }

    /// Delete the range swept out by `motion`, leaving the cursor at the
    /// lower bound. "Delete previous word" is `delete_by(Motion::PrevWord)`,
    /// backspace is `delete_by(Motion::PrevChar)`, and so on.
    pub fn delete_by(&mut self, motion: Motion) {
        let mark = self.cursor;
        self.apply(motion);

        let (start, end) = if mark <= self.cursor {
            (mark, self.cursor)
        } else {
            (self.cursor, mark)
        };

        self.buf.drain(start..end);
        self.cursor = start;
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    /// Text before the cursor, for positioning the terminal cursor.
    pub fn before_cursor(&self) -> String {
        String::from_utf8_lossy(&self.buf[..self.cursor]).into_owned()
    }
}
