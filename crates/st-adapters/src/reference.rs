//! File-backed centers/countries reference data loader.
//!
//! Both files use the same pipe-delimited grammar as the signature
//! configuration file rather than the original's positional, partly
//! space-separated column layout. Centers: `number|contact|affiliation|
//! address|primary_fax|secondary_fax|phone|investigator|investigator_phone|
//! reply_address|pids` where `pids` is either `ERROR_MONITOR` or a range-set
//! expression. Countries: `name|region|centers` where `centers` is a
//! range-set expression over center numbers.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use st_domain::rangeset::RangeSet;
use st_domain::reference::{Center, Centers, Country, Countries};
use st_domain::token::TokenRecord;
use st_ports::{ReferenceSource, ReferenceSourceError};

pub struct FileReferenceSource {
    centers_path: Option<PathBuf>,
    countries_path: Option<PathBuf>,
}

impl FileReferenceSource {
    pub fn new(centers_path: Option<PathBuf>, countries_path: Option<PathBuf>) -> Self {
        Self {
            centers_path,
            countries_path,
        }
    }
}

impl ReferenceSource for FileReferenceSource {
    fn load_centers(&self) -> Result<Centers, ReferenceSourceError> {
        let mut centers = Centers::new();
        let Some(path) = &self.centers_path else {
            return Ok(centers);
        };

        let file = File::open(path)
            .map_err(|e| ReferenceSourceError::Io(format!("{}: {e}", path.display())))?;
        let mut reader = BufReader::new(file);
        let mut record = TokenRecord::with_capacity(11);

        while record
            .read_delimited_line(&mut reader, b'|')
            .map_err(|e| ReferenceSourceError::Io(e.to_string()))?
        {
            if record.get(0).is_empty() {
                continue;
            }
            let number: i64 = record.get(0).parse().unwrap_or(0);
            let pids_field = record.get(10);
            let is_error_monitor = pids_field == "ERROR_MONITOR";
            let pids = if is_error_monitor {
                RangeSet::new()
            } else {
                RangeSet::parse(pids_field).unwrap_or_default()
            };

            centers.push(Center {
                number,
                is_error_monitor,
                contact: record.get(1).to_string(),
                affiliation: record.get(2).to_string(),
                address: record.get(3).to_string(),
                primary_fax: record.get(4).to_string(),
                secondary_fax: record.get(5).to_string(),
                phone: record.get(6).to_string(),
                investigator: record.get(7).to_string(),
                investigator_phone: record.get(8).to_string(),
                reply_address: record.get(9).to_string(),
                pids,
            });
        }

        Ok(centers)
    }

    fn load_countries(&self) -> Result<Countries, ReferenceSourceError> {
        let mut countries = Countries::new();
        let Some(path) = &self.countries_path else {
            return Ok(countries);
        };

        let file = File::open(path)
            .map_err(|e| ReferenceSourceError::Io(format!("{}: {e}", path.display())))?;
        let mut reader = BufReader::new(file);
        let mut record = TokenRecord::with_capacity(3);

        while record
            .read_delimited_line(&mut reader, b'|')
            .map_err(|e| ReferenceSourceError::Io(e.to_string()))?
        {
            if record.get(0).is_empty() {
                continue;
            }
            let centers = RangeSet::parse(record.get(2)).unwrap_or_default();
            countries.push(Country {
                name: record.get(0).to_string(),
                region: record.get(1).to_string(),
                centers,
            });
        }

        Ok(countries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_centers_and_resolves_error_monitor_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1||||||||||100-199").unwrap();
        writeln!(file, "99||||||||||ERROR_MONITOR").unwrap();

        let source = FileReferenceSource::new(Some(file.path().to_path_buf()), None);
        let centers = source.load_centers().unwrap();
        assert_eq!(centers.find(150), 1);
        assert_eq!(centers.find(999), 99);
    }

    #[test]
    fn loads_countries_and_resolves_region() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Canada|North America|1-10").unwrap();

        let source = FileReferenceSource::new(None, Some(file.path().to_path_buf()));
        let countries = source.load_countries().unwrap();
        assert_eq!(countries.find_country(5), "Canada");
        assert_eq!(countries.find_region(5), "North America");
    }
}
