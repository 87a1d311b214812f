//! Positional token records per SIGTRACK-SPEC §4.2
//!
//! A growable vector of heap-owned fields with a bounds-safe accessor. Absent
//! fields (out of range, or a slot that was never populated) render as the
//! empty string at the public interface, never as a null.

use std::io::{self, BufRead};

#[derive(Debug, Clone, Default)]
pub struct TokenRecord {
    fields: Vec<Option<String>>,
}

impl TokenRecord {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Build a record directly from string-like fields, for tests and
    /// in-memory construction. An empty field and an absent field are
    /// indistinguishable through `get`, so both are stored the same way.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|f| {
                let s = f.into();
                if s.is_empty() {
                    None
                } else {
                    Some(s)
                }
            })
            .collect();
        Self { fields }
    }

    /// Free all fields and reset the record to empty, ready for reuse.
    pub fn reset(&mut self) {
        self.fields.clear();
    }

    pub fn append(&mut self, value: Option<String>) {
        self.fields.push(value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Positional accessor. Out-of-range or null slots return `""`.
    pub fn get(&self, pos: usize) -> &str {
        self.fields
            .get(pos)
            .and_then(|v| v.as_deref())
            .unwrap_or("")
    }

    /// Read one logical line from `reader`, splitting on `delimiter` and
    /// terminating on `\n`. Returns `Ok(false)` on a clean EOF or on an
    /// unterminated trailing line (no `\n` reached) — matching the original
    /// reader, which only commits a line once it sees the terminator.
    pub fn read_delimited_line<R: BufRead>(
        &mut self,
        reader: &mut R,
        delimiter: u8,
    ) -> io::Result<bool> {
        self.reset();

        let mut buf = Vec::new();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Ok(false);
        }
        if buf.last() != Some(&b'\n') {
            return Ok(false);
        }
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        for chunk in buf.split(|&b| b == delimiter) {
            if chunk.is_empty() {
                self.fields.push(None);
            } else {
                self.fields.push(Some(String::from_utf8_lossy(chunk).into_owned()));
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_lines_and_splits_on_delimiter() {
        let mut cursor = Cursor::new(b"a|b|c\nd||f\n".to_vec());
        let mut tr = TokenRecord::with_capacity(4);

        assert!(tr.read_delimited_line(&mut cursor, b'|').unwrap());
        assert_eq!(tr.get(0), "a");
        assert_eq!(tr.get(1), "b");
        assert_eq!(tr.get(2), "c");
        assert_eq!(tr.get(3), "");

        assert!(tr.read_delimited_line(&mut cursor, b'|').unwrap());
        assert_eq!(tr.get(0), "d");
        assert_eq!(tr.get(1), "");
        assert_eq!(tr.get(2), "f");

        assert!(!tr.read_delimited_line(&mut cursor, b'|').unwrap());
    }

    #[test]
    fn unterminated_trailing_line_is_dropped() {
        let mut cursor = Cursor::new(b"a|b\nc|d".to_vec());
        let mut tr = TokenRecord::with_capacity(4);

        assert!(tr.read_delimited_line(&mut cursor, b'|').unwrap());
        assert_eq!(tr.get(0), "a");

        assert!(!tr.read_delimited_line(&mut cursor, b'|').unwrap());
    }

    #[test]
    fn from_fields_matches_direct_reads() {
        let tr = TokenRecord::from_fields(["a", "", "c"]);
        assert_eq!(tr.get(0), "a");
        assert_eq!(tr.get(1), "");
        assert_eq!(tr.get(2), "c");
        assert_eq!(tr.get(99), "");
    }
}
