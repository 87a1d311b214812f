//! File-backed signer-exclusion loader.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use st_domain::exclusions::ExclusionRegistry;
use st_domain::token::TokenRecord;
use st_ports::{ExclusionSource, ExclusionSourceError};
use tracing::warn;

pub struct FileExclusionSource {
    path: PathBuf,
}

impl FileExclusionSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ExclusionSource for FileExclusionSource {
    fn load(&self) -> Result<ExclusionRegistry, ExclusionSourceError> {
        let file = File::open(&self.path)
            .map_err(|e| ExclusionSourceError::Io(format!("{}: {e}", self.path.display())))?;
        let mut reader = BufReader::new(file);

        let mut registry = ExclusionRegistry::new();
        let mut record = TokenRecord::with_capacity(4);
        let mut line_no: u64 = 0;

        loop {
            match record.read_delimited_line(&mut reader, b'|') {
                Ok(true) => {
                    line_no += 1;
                    match ExclusionRegistry::parse_line(&record) {
                        Ok(Some(row)) => registry.push(row),
                        Ok(None) => {
                            warn!(line = line_no, "skipping exclusion row with invalid date");
                        }
                        Err(e) => {
                            warn!(line = line_no, error = %e, "skipping malformed exclusion row");
                        }
                    }
                }
                Ok(false) => break,
                Err(e) => {
                    return Err(ExclusionSourceError::Io(format!(
                        "{}: {e}",
                        self.path.display()
                    )))
                }
            }
        }

        Ok(registry)
    }
}
