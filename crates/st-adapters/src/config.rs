//! File-backed signature configuration loader.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use st_domain::config::ConfigRegistry;
use st_domain::token::TokenRecord;
use st_ports::{ConfigSource, ConfigSourceError};
use tracing::warn;

pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<ConfigRegistry, ConfigSourceError> {
        let file = File::open(&self.path)
            .map_err(|e| ConfigSourceError::Io(format!("{}: {e}", self.path.display())))?;
        let mut reader = BufReader::new(file);

        let mut registry = ConfigRegistry::new();
        let mut record = TokenRecord::with_capacity(6);
        let mut serial: u64 = 0;
        let mut line_no: u64 = 0;

        loop {
            match record.read_delimited_line(&mut reader, b'|') {
                Ok(true) => {
                    line_no += 1;
                    if record.is_empty() || record.get(0).is_empty() || record.get(0).starts_with('#') {
                        continue;
                    }
                    serial += 1;
                    let config = ConfigRegistry::parse_line(&record, serial).map_err(|e| {
                        warn!(line = line_no, error = %e, "skipping malformed signature configuration line");
                        e
                    })?;
                    registry.push(config);
                }
                Ok(false) => break,
                Err(e) => {
                    return Err(ConfigSourceError::Io(format!(
                        "{}: {e}",
                        self.path.display()
                    )))
                }
            }
        }

        Ok(registry)
    }
}
