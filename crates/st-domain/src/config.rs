//! Signature configuration registry per SIGTRACK-SPEC §4.1 / §6
//!
//! The wire format is a custom pipe-delimited grammar (not the original's
//! yacc/lex grammar, which sits outside this rewrite's scope): one signature
//! per line, `name|plate|visits|sig_plate|sig_fields|ignore_fields`.

use crate::errors::DomainError;
use crate::model::SignatureConfig;
use crate::rangeset::RangeSet;
use crate::token::TokenRecord;

pub const FIELD_NAME: usize = 0;
pub const FIELD_PLATE: usize = 1;
pub const FIELD_VISITS: usize = 2;
pub const FIELD_SIG_PLATE: usize = 3;
pub const FIELD_SIG_FIELDS: usize = 4;
pub const FIELD_IGNORE_FIELDS: usize = 5;

/// Every configured signature, in declaration order, serially numbered.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    configs: Vec<SignatureConfig>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, config: SignatureConfig) {
        self.configs.push(config);
    }

    /// Parse one config line into a `SignatureConfig` with the given serial.
    pub fn parse_line(record: &TokenRecord, serial: u64) -> Result<SignatureConfig, DomainError> {
        let name = record.get(FIELD_NAME);
        if name.is_empty() {
            return Err(DomainError::InvalidConfig {
                reason: "missing signature name".into(),
            });
        }

        let plate: i64 = record
            .get(FIELD_PLATE)
            .parse()
            .map_err(|_| DomainError::InvalidConfig {
                reason: format!("invalid plate for signature {name}"),
            })?;

        let sig_plate: i64 = record
            .get(FIELD_SIG_PLATE)
            .parse()
            .map_err(|_| DomainError::InvalidConfig {
                reason: format!("invalid sig_plate for signature {name}"),
            })?;

        let visits = RangeSet::parse(record.get(FIELD_VISITS)).map_err(|_| {
            DomainError::InvalidConfig {
                reason: format!("invalid visit range for signature {name}"),
            }
        })?;
        let sig_fields = RangeSet::parse(record.get(FIELD_SIG_FIELDS)).map_err(|_| {
            DomainError::InvalidConfig {
                reason: format!("invalid sig_fields range for signature {name}"),
            }
        })?;
        let ignore_fields = RangeSet::parse(record.get(FIELD_IGNORE_FIELDS)).map_err(|_| {
            DomainError::InvalidConfig {
                reason: format!("invalid ignore_fields range for signature {name}"),
            }
        })?;

        Ok(SignatureConfig {
            serial,
            name: name.to_string(),
            plate,
            ignore_fields,
            visits,
            sig_plate,
            sig_fields,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignatureConfig> {
        self.configs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// All configs whose trigger plate matches `plate`.
    pub fn matching_plate(&self, plate: i64) -> impl Iterator<Item = &SignatureConfig> {
        self.configs.iter().filter(move |c| c.plate == plate)
    }

    /// Priority-file rows for one config, per the original `esc_priority_file`:
    /// every ignored field gets a row with weight `1`, and when the
    /// signature's own plate is the trigger plate, every signature field also
    /// gets a row with weight `3`.
    pub fn priority_rows(config: &SignatureConfig) -> Vec<(i64, i64, i64)> {
        let mut rows = Vec::new();
        for &(lo, hi) in config.ignore_fields.ranges() {
            for field in lo..=hi {
                rows.push((config.plate, field, 1));
            }
        }
        if config.sig_plate == config.plate {
            for &(lo, hi) in config.sig_fields.ranges() {
                for field in lo..=hi {
                    rows.push((config.sig_plate, field, 3));
                }
            }
        }
        rows
    }
}
