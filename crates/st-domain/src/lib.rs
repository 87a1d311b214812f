//! Pure signature-tracking domain logic.
//!
//! This crate holds the signature state model and the engines that mutate
//! it (ingestion, evaluation, state rendering, worklist selection) plus the
//! small self-contained grammars the rest of the system feeds it (range
//! sets, positional tokens). It MUST NOT import file I/O, SQLite, or
//! spreadsheet crates — those live one layer out, behind the traits in
//! `st-ports`.

pub mod config;
pub mod errors;
pub mod evaluate;
pub mod exclusions;
pub mod ingest;
pub mod model;
pub mod rangeset;
pub mod reference;
pub mod state;
pub mod token;
pub mod worklist;

pub use errors::DomainError;
pub use model::{
    ChangeStatus, CoveredPlate, FieldChange, NodeKey, RecStatus, SigField, SignatureConfig,
    SignatureNode, SignatureStatus,
};
pub use rangeset::RangeSet;
