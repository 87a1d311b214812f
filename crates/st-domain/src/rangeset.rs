//! Ordered integer range sets per SIGTRACK-SPEC §4.1
//!
//! Order-preserving: ranges are kept in the shape the parser produced them,
//! never canonicalized or merged, since downstream emission relies on the
//! exact in-memory order.

use crate::errors::DomainError;

/// Upper bound of the "*" wildcard range, mirroring the original's `0x7FFFFFFF`.
pub const UNIVERSAL_MAX: i64 = 0x7FFF_FFFF;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    ranges: Vec<(i64, i64)>,
}

#[derive(PartialEq, Clone, Copy)]
enum Token {
    Number,
    Comma,
    Dash,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the comma-separated `lo` / `lo-hi` grammar, or `"*"` for the
    /// universal range, or an empty string for the empty set.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        if s.is_empty() {
            return Ok(Self::new());
        }
        if s == "*" {
            return Ok(Self {
                ranges: vec![(0, UNIVERSAL_MAX)],
            });
        }

        let mut ranges: Vec<(i64, i64)> = Vec::new();
        let mut open = false;
        let mut last = Token::Number;

        let mut chars = s.chars().peekable();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
                continue;
            }
            if c.is_ascii_digit() {
                let mut v: i64 = 0;
                while let Some(&d) = chars.peek() {
                    if let Some(digit) = d.to_digit(10) {
                        v = v * 10 + i64::from(digit);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if last == Token::Dash {
                    if open {
                        let idx = ranges.len() - 1;
                        ranges[idx].1 = v;
                        if ranges[idx].0 > ranges[idx].1 {
                            ranges[idx] = (ranges[idx].1, ranges[idx].0);
                        }
                        open = false;
                    } else {
                        return Err(DomainError::RangeParse { input: s.to_string() });
                    }
                } else {
                    ranges.push((v, v));
                    open = true;
                }
                last = Token::Number;
            } else if c == ',' {
                chars.next();
                open = false;
                last = Token::Comma;
            } else if c == '-' {
                chars.next();
                last = Token::Dash;
            } else {
                return Err(DomainError::RangeParse { input: s.to_string() });
            }
        }

        if last != Token::Number {
            return Err(DomainError::RangeParse { input: s.to_string() });
        }

        Ok(Self { ranges })
    }

    /// Add a range to the front of the list, normalizing a reversed min/max.
    pub fn add_to_front(&mut self, min: i64, max: i64) {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        self.ranges.insert(0, (min, max));
    }

    pub fn ranges(&self) -> &[(i64, i64)] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, v: i64) -> bool {
        self.ranges.iter().any(|&(lo, hi)| v >= lo && v <= hi)
    }

    /// Minimum value across all ranges, or 0 for an empty set.
    pub fn min(&self) -> i64 {
        self.ranges.iter().map(|&(lo, _)| lo).min().unwrap_or(0)
    }

    /// Maximum value across all ranges, or 0 for an empty set.
    pub fn max(&self) -> i64 {
        self.ranges.iter().map(|&(_, hi)| hi).max().unwrap_or(0)
    }

    /// Total count of values covered.
    pub fn width(&self) -> i64 {
        self.ranges.iter().map(|&(lo, hi)| hi - lo + 1).sum()
    }

    pub fn to_string_repr(&self) -> String {
        self.ranges
            .iter()
            .map(|&(lo, hi)| {
                if lo == hi {
                    lo.to_string()
                } else {
                    format!("{lo}-{hi}")
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::fmt::Display for RangeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_repr())
    }
}
