//! Signer-exclusion registry per SIGTRACK-SPEC §4.3
//!
//! An exclusion suppresses the "declined" classification for a specific
//! plate/field/user/date combination, but only when the change being
//! evaluated is the field's very first recorded value (old value empty).

use crate::errors::DomainError;
use crate::token::TokenRecord;

pub const FIELD_PLATE: usize = 0;
pub const FIELD_FIELD: usize = 1;
pub const FIELD_USER: usize = 2;
pub const FIELD_DATE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRow {
    pub plate: i64,
    pub field: i64,
    pub user: String,
    /// Normalized to 8 digits, e.g. `20240115`.
    pub date: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExclusionRegistry {
    rows: Vec<ExclusionRow>,
}

impl ExclusionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ExclusionRow) {
        self.rows.push(row);
    }

    /// Parse one exclusion line. Requires plate, field, user, and date to all
    /// be present; strips `/` and `\r` from the date and requires the result
    /// be exactly 8 digits beginning with "20". A malformed date is a skip,
    /// not a hard parse failure, matching the original loader's leniency —
    /// callers should log and continue rather than abort the whole file.
    pub fn parse_line(record: &TokenRecord) -> Result<Option<ExclusionRow>, DomainError> {
        let plate_s = record.get(FIELD_PLATE);
        let field_s = record.get(FIELD_FIELD);
        let user = record.get(FIELD_USER);
        let raw_date = record.get(FIELD_DATE);

        if plate_s.is_empty() || field_s.is_empty() || user.is_empty() || raw_date.is_empty() {
            return Err(DomainError::InvalidExclusion {
                reason: "missing required column".into(),
            });
        }

        let plate: i64 = plate_s.parse().map_err(|_| DomainError::InvalidExclusion {
            reason: format!("invalid plate: {plate_s}"),
        })?;
        let field: i64 = field_s.parse().map_err(|_| DomainError::InvalidExclusion {
            reason: format!("invalid field: {field_s}"),
        })?;

        let date: String = raw_date.chars().filter(|&c| c != '/' && c != '\r').collect();
        if date.len() != 8 || !date.starts_with("20") || !date.chars().all(|c| c.is_ascii_digit()) {
            return Ok(None);
        }

        Ok(Some(ExclusionRow {
            plate,
            field,
            user: user.to_string(),
            date,
        }))
    }

    /// Whether `(plate, field, user, date)` matches a registered exclusion
    /// AND the change's prior value was empty — only a field's first-ever
    /// value can be excluded.
    pub fn is_excluded(&self, plate: i64, field: i64, user: &str, date: &str, old_value: &str) -> bool {
        if !old_value.is_empty() {
            return false;
        }
        self.rows
            .iter()
            .any(|r| r.plate == plate && r.field == field && r.user == user && r.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_slashes_and_requires_2000s_date() {
        let rec = TokenRecord::from_fields(["10", "5", "jdoe", "2024/01/15"]);
        let row = ExclusionRegistry::parse_line(&rec).unwrap().unwrap();
        assert_eq!(row.date, "20240115");
    }

    #[test]
    fn rejects_date_not_starting_with_20() {
        let rec = TokenRecord::from_fields(["10", "5", "jdoe", "19991231"]);
        assert!(ExclusionRegistry::parse_line(&rec).unwrap().is_none());
    }

    #[test]
    fn is_excluded_requires_empty_old_value() {
        let mut reg = ExclusionRegistry::new();
        reg.push(ExclusionRow {
            plate: 10,
            field: 5,
            user: "jdoe".into(),
            date: "20240115".into(),
        });
        assert!(reg.is_excluded(10, 5, "jdoe", "20240115", ""));
        assert!(!reg.is_excluded(10, 5, "jdoe", "20240115", "previous"));
        assert!(!reg.is_excluded(10, 5, "other", "20240115", ""));
    }
}
