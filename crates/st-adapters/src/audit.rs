//! Audit-trail stream adapter, reading from a file or from stdin.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Stdin};
use std::path::Path;

use st_domain::token::TokenRecord;
use st_ports::{AuditSource, AuditSourceError};

enum Input {
    File(BufReader<File>),
    Stdin(Stdin),
}

impl Input {
    fn as_buf_read(&mut self) -> &mut dyn BufRead {
        match self {
            Input::File(r) => r,
            Input::Stdin(s) => s,
        }
    }
}

pub struct StreamAuditSource {
    input: Input,
}

impl StreamAuditSource {
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            input: Input::File(BufReader::new(file)),
        })
    }

    pub fn from_stdin() -> Self {
        Self {
            input: Input::Stdin(io::stdin()),
        }
    }
}

impl AuditSource for StreamAuditSource {
    fn next_record(&mut self, out: &mut TokenRecord) -> Result<bool, AuditSourceError> {
        let reader = self.input.as_buf_read();
        let mut cursor = ReadRef(reader);
        out.read_delimited_line(&mut cursor, b'|')
            .map_err(|e| AuditSourceError::Io(e.to_string()))
    }
}

/// `read_delimited_line` wants a concrete `R: BufRead`; this adapts a
/// `&mut dyn BufRead` trait object into one.
struct ReadRef<'a>(&'a mut dyn BufRead);

impl io::Read for ReadRef<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl BufRead for ReadRef<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.0.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.0.consume(amt)
    }
}
