/// Character-level scanner over the source text of a path expression.
///
/// The index is a byte offset. All syntax characters are ASCII, so the index
/// only ever lands on a char boundary; string literal contents may hold
/// arbitrary UTF-8 and are skipped by scanning for the ASCII quote byte.
pub(crate) struct Cursor<'a> {
    source: &'a str,
    pub(crate) index: usize,
}

pub(crate) struct NumberScan {
    pub is_number: bool,
    pub is_float: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str, index: usize) -> Self {
        Self { source, index }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn at_end(&self) -> bool {
        self.index >= self.source.len()
    }

    /// The source text from `from` up to the current position.
    pub fn text(&self, from: usize) -> &'a str {
        &self.source[from..self.index]
    }

    fn current_byte(&self) -> Option<u8> {
        self.source.as_bytes().get(self.index).copied()
    }

    /// Consume exactly one matching character, reporting whether it matched.
    pub fn skip(&mut self, b: u8) -> bool {
        if self.current_byte() == Some(b) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Test for a character without consuming it.
    pub fn peek(&self, b: u8) -> bool {
        self.current_byte() == Some(b)
    }

    /// Consume a maximal run of one repeated character.
    pub fn skip_all(&mut self, b: u8) -> bool {
        let start = self.index;
        while self.current_byte() == Some(b) {
            self.index += 1;
        }
        self.index > start
    }

    /// Consume an optional sign and a maximal digit run.
    pub fn skip_integer(&mut self) -> bool {
        let start = self.index;
        if !self.skip(b'-') {
            self.skip(b'+');
        }
        while self.current_byte().is_some_and(|b| b.is_ascii_digit()) {
            self.index += 1;
        }
        self.index > start
    }

    /// Consume an integer part, then an optional `.` and fractional digits.
    pub fn skip_number(&mut self) -> NumberScan {
        let start = self.index;
        self.skip_integer();
        let is_float = self.skip(b'.');
        if is_float {
            while self.current_byte().is_some_and(|b| b.is_ascii_digit()) {
                self.index += 1;
            }
        }
        NumberScan {
            is_number: self.index > start,
            is_float,
        }
    }

    /// Consume the wildcard token alone, or a maximal run of name characters.
    pub fn skip_name(&mut self) -> bool {
        if self.skip(b'*') {
            return true;
        }
        let start = self.index;
        while self.current_byte().is_some_and(is_name_byte) {
            self.index += 1;
        }
        self.index > start
    }

    /// Consume up to and including the next occurrence of `b`.
    pub fn skip_until(&mut self, b: u8) -> bool {
        match self.source.as_bytes()[self.index..]
            .iter()
            .position(|&c| c == b)
        {
            Some(pos) => {
                self.index += pos + 1;
                true
            }
            None => false,
        }
    }

    /// The character at the cursor, or `None` at end of input.
    pub fn current_char(&self) -> Option<char> {
        self.source.get(self.index..).and_then(|s| s.chars().next())
    }

    /// The character `offset` bytes away from the cursor.
    pub fn offset_char(&self, offset: isize) -> Option<char> {
        let pos = self.index.checked_add_signed(offset)?;
        self.source.get(pos..).and_then(|s| s.chars().next())
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}
