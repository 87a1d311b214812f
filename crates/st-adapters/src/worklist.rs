//! Plain-text worklist and priority-file sinks.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use st_ports::{PriorityFileSink, PriorityFileSinkError, WorklistSink, WorklistSinkError};
use st_domain::worklist::WorklistEntry;

/// Emits one `pid|visit|sig_plate` row per worklist entry, matching the
/// original `write_drf`'s `%lld|%d|%d\n` format.
pub struct FileWorklistSink {
    path: PathBuf,
}

impl FileWorklistSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl WorklistSink for FileWorklistSink {
    fn write(&mut self, entries: &[WorklistEntry]) -> Result<(), WorklistSinkError> {
        let file = File::create(&self.path)
            .map_err(|e| WorklistSinkError::Io(format!("{}: {e}", self.path.display())))?;
        let mut writer = BufWriter::new(file);
        for entry in entries {
            writeln!(writer, "{}|{}|{}", entry.pid, entry.visit, entry.sig_plate)
                .map_err(|e| WorklistSinkError::Io(e.to_string()))?;
        }
        writer.flush().map_err(|e| WorklistSinkError::Io(e.to_string()))
    }
}

/// Emits one `plate|field|weight` row per priority entry, matching the
/// original `esc_priority_file`.
pub struct FilePriorityFileSink {
    path: PathBuf,
}

impl FilePriorityFileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PriorityFileSink for FilePriorityFileSink {
    fn write(&mut self, rows: &[(i64, i64, i64)]) -> Result<(), PriorityFileSinkError> {
        let file = File::create(&self.path)
            .map_err(|e| PriorityFileSinkError::Io(format!("{}: {e}", self.path.display())))?;
        let mut writer = BufWriter::new(file);
        for &(plate, field, weight) in rows {
            writeln!(writer, "{plate}|{field}|{weight}")
                .map_err(|e| PriorityFileSinkError::Io(e.to_string()))?;
        }
        writer.flush().map_err(|e| PriorityFileSinkError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_worklist_rows() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut sink = FileWorklistSink::new(file.path());
        sink.write(&[WorklistEntry {
            pid: 101,
            visit: 2,
            sig_plate: 10,
        }])
        .unwrap();
        let content = fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "101|2|10\n");
    }

    #[test]
    fn writes_priority_rows() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut sink = FilePriorityFileSink::new(file.path());
        sink.write(&[(10, 5, 1), (10, 20, 3)]).unwrap();
        let content = fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "10|5|1\n10|20|3\n");
    }
}
