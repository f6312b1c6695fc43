/// Longest chunk handed to the converter at once.
pub const MAX_LINE: usize = 32768;

/// Splits a buffer after each `\n`, cutting overlong lines at `MAX_LINE`.
pub struct Lines<'a> {
    rest: &'a [u8],
}

impl<'a> Lines<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Lines { rest: buffer }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.rest.is_empty() {
            return None;
        }
        let window = &self.rest[..self.rest.len().min(MAX_LINE)];
        let len = memchr::memchr(b'\n', window).map_or(window.len(), |newline| newline + 1);
        let (line, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(line)
    }
}
