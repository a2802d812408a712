// mancala/src/decoder.rs
// Per-connection accumulation of raw bytes into terminated command lines.

use crate::defs::MAX_MESSAGE;
use crate::error::DecodeError;

/// Bytes received on one connection that have not formed a full line yet.
///
/// A line ends at the first `\r` or `\n`. A `\n` arriving right after a line
/// that ended in `\r` belongs to that terminator and is dropped, even when the
/// two bytes come in separate reads. Once a line overflows the cap, the rest
/// of it is dropped up to and including its terminator.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    after_cr: bool,
    discarding: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Bytes waiting for a terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Next complete line with its terminator stripped, or `None` while the
    /// terminator is still outstanding.
    pub fn next_line(&mut self) -> Result<Option<String>, DecodeError> {
        if self.discarding {
            match self.terminator() {
                Some(end) => {
                    self.after_cr = self.pending[end] == b'\r';
                    self.pending.drain(..=end);
                    self.discarding = false;
                }
                None => {
                    self.pending.clear();
                    return Ok(None);
                }
            }
        }

        if self.after_cr && !self.pending.is_empty() {
            if self.pending[0] == b'\n' {
                self.pending.remove(0);
            }
            self.after_cr = false;
        }

        match self.terminator() {
            Some(end) => {
                let rest = self.pending.split_off(end + 1);
                let mut line = std::mem::replace(&mut self.pending, rest);
                self.after_cr = line[end] == b'\r';
                line.truncate(end);
                String::from_utf8(line).map(Some).map_err(|_| DecodeError::InvalidUtf8)
            }
            None if self.pending.len() > MAX_MESSAGE => {
                self.pending.clear();
                self.discarding = true;
                Err(DecodeError::LineTooLong)
            }
            None => Ok(None),
        }
    }

    fn terminator(&self) -> Option<usize> {
        self.pending.iter().position(|&b| b == b'\r' || b == b'\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(buffer: &mut LineBuffer) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(Some(line)) = buffer.next_line() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_waits_for_terminator() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"ali");
        assert_eq!(buffer.next_line(), Ok(None));
        buffer.push(b"ce\n");
        assert_eq!(buffer.next_line(), Ok(Some("alice".to_string())));
        assert_eq!(buffer.next_line(), Ok(None));
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_crlf_is_one_terminator() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"3\r\n4\r\n");
        assert_eq!(drain(&mut buffer), vec!["3", "4"]);
    }

    #[test]
    fn test_crlf_split_across_reads() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"bob\r");
        assert_eq!(drain(&mut buffer), vec!["bob"]);
        buffer.push(b"\n");
        assert_eq!(buffer.next_line(), Ok(None));
        buffer.push(b"2\n");
        assert_eq!(drain(&mut buffer), vec!["2"]);
    }

    #[test]
    fn test_bare_terminator_is_empty_line() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"\n");
        assert_eq!(buffer.next_line(), Ok(Some(String::new())));

        let mut buffer = LineBuffer::new();
        buffer.push(b"\n\n");
        assert_eq!(drain(&mut buffer), vec!["", ""]);
    }

    #[test]
    fn test_lf_after_lf_is_not_swallowed() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"a\n");
        assert_eq!(drain(&mut buffer), vec!["a"]);
        buffer.push(b"\n");
        assert_eq!(buffer.next_line(), Ok(Some(String::new())));
    }

    #[test]
    fn test_overlong_line_is_discarded() {
        let mut buffer = LineBuffer::new();
        buffer.push(&[b'x'; MAX_MESSAGE + 1]);
        assert_eq!(buffer.next_line(), Err(DecodeError::LineTooLong));
        assert_eq!(buffer.pending_len(), 0);
        buffer.push(b"tail\n");
        assert_eq!(buffer.next_line(), Ok(None));
        buffer.push(b"ok\n");
        assert_eq!(buffer.next_line(), Ok(Some("ok".to_string())));
    }

    #[test]
    fn test_overlong_tail_split_across_reads() {
        let mut buffer = LineBuffer::new();
        buffer.push(&[b' '; MAX_MESSAGE + 1]);
        assert_eq!(buffer.next_line(), Err(DecodeError::LineTooLong));
        buffer.push(b"   3");
        assert_eq!(buffer.next_line(), Ok(None));
        buffer.push(b"\r");
        assert_eq!(buffer.next_line(), Ok(None));
        buffer.push(b"\n2\n");
        assert_eq!(drain(&mut buffer), vec!["2"]);
    }

    #[test]
    fn test_invalid_utf8_line_is_consumed() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"\xff\xfe\n1\n");
        assert_eq!(buffer.next_line(), Err(DecodeError::InvalidUtf8));
        assert_eq!(buffer.next_line(), Ok(Some("1".to_string())));
    }
}
