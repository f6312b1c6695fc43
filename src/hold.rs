use crate::error::Error;

pub const DEFAULT_HOLD_CAPACITY: usize = 8192;

/// Lines whose encoding is still undecided, waiting to be converted.
pub struct HoldBuffer {
    buffer: Vec<u8>,
    capacity: usize,
}

impl HoldBuffer {
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(capacity)?;
        Ok(HoldBuffer { buffer, capacity })
    }

    /// Appends `line` unless that would exceed the capacity, in which case
    /// nothing is stored and `false` is returned.
    pub fn append(&mut self, line: &[u8]) -> bool {
        if self.capacity - self.buffer.len() < line.len() {
            return false;
        }
        self.buffer.extend_from_slice(line);
        true
    }

    /// Takes the held bytes, leaving the buffer empty.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_until_full() {
        let mut hold = HoldBuffer::with_capacity(8).unwrap();
        assert!(hold.is_empty());
        assert!(hold.append(b"abcd"));
        assert!(hold.append(b"efgh"));
        assert!(!hold.append(b"i"));
        assert_eq!(hold.len(), 8);
        assert_eq!(hold.flush(), b"abcdefgh");
        assert!(hold.is_empty());
        assert!(hold.append(b"i"));
    }

    #[test]
    fn test_oversized_line_is_rejected_whole() {
        let mut hold = HoldBuffer::with_capacity(4).unwrap();
        assert!(hold.append(b"ab"));
        assert!(!hold.append(b"cde"));
        assert_eq!(hold.flush(), b"ab");
    }
}
