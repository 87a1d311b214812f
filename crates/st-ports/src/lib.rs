//! Port traits for the signature tracking tool.
//!
//! Every trait here is a seam between the pure domain core in `st-domain`
//! and the concrete file/SQLite/workbook adapters in `st-adapters`. Nothing
//! in this crate performs I/O itself; it only names the shapes adapters must
//! provide and the errors they can fail with.

use thiserror::Error;

use st_domain::config::ConfigRegistry;
use st_domain::exclusions::ExclusionRegistry;
use st_domain::ingest::MirrorEvent;
use st_domain::reference::{Centers, Countries};
use st_domain::token::TokenRecord;
use st_domain::worklist::WorklistEntry;

#[derive(Debug, Error)]
pub enum ConfigSourceError {
    #[error("failed to read signature configuration: {0}")]
    Io(String),
    #[error(transparent)]
    Domain(#[from] st_domain::DomainError),
}

/// Loads the set of configured signatures for a study.
pub trait ConfigSource {
    fn load(&self) -> Result<ConfigRegistry, ConfigSourceError>;
}

#[derive(Debug, Error)]
pub enum ExclusionSourceError {
    #[error("failed to read exclusions: {0}")]
    Io(String),
}

/// Loads the signer-exclusion list. Malformed rows are skipped, not fatal;
/// implementations should log a warning per skipped row.
pub trait ExclusionSource {
    fn load(&self) -> Result<ExclusionRegistry, ExclusionSourceError>;
}

#[derive(Debug, Error)]
pub enum AuditSourceError {
    #[error("failed to read audit trail: {0}")]
    Io(String),
}

/// Streams positional audit records, one at a time, from the underlying
/// EDC export. Implementations own buffering; callers just keep calling
/// `next_record` until it returns `None`.
pub trait AuditSource {
    fn next_record(&mut self, out: &mut TokenRecord) -> Result<bool, AuditSourceError>;
}

#[derive(Debug, Error)]
pub enum ReferenceSourceError {
    #[error("failed to read reference data: {0}")]
    Io(String),
}

/// Loads the optional centers/countries reference tables used only to
/// decorate the workbook report.
pub trait ReferenceSource {
    fn load_centers(&self) -> Result<Centers, ReferenceSourceError>;
    fn load_countries(&self) -> Result<Countries, ReferenceSourceError>;
}

#[derive(Debug, Error)]
pub enum WorklistSinkError {
    #[error("failed to write worklist: {0}")]
    Io(String),
}

/// Emits the re-signing worklist, one row per entry.
pub trait WorklistSink {
    fn write(&mut self, entries: &[WorklistEntry]) -> Result<(), WorklistSinkError>;
}

#[derive(Debug, Error)]
pub enum PriorityFileSinkError {
    #[error("failed to write priority file: {0}")]
    Io(String),
}

/// Emits the priority file (plate/field/weight triples) derived from the
/// signature configuration, independent of any ingested audit trail.
pub trait PriorityFileSink {
    fn write(&mut self, rows: &[(i64, i64, i64)]) -> Result<(), PriorityFileSinkError>;
}

/// One row of the decorated workbook report.
#[derive(Debug, Clone)]
pub struct WorkbookRow {
    pub region: String,
    pub country: String,
    pub center: i64,
    pub pid: i64,
    pub visit: i64,
    pub signature_name: String,
    pub state: String,
    pub signer: String,
    pub date: String,
    pub time: String,
    pub comment: String,
}

#[derive(Debug, Error)]
pub enum WorkbookSinkError {
    #[error("failed to write workbook: {0}")]
    Io(String),
}

/// Emits the decorated workbook report.
pub trait WorkbookSink {
    fn write(&mut self, rows: &[WorkbookRow]) -> Result<(), WorkbookSinkError>;
}

#[derive(Debug, Error)]
pub enum AuditMirrorError {
    #[error("failed to write audit mirror record: {0}")]
    Io(String),
}

/// The optional relational audit mirror. Implementations own their own
/// transaction boundaries; `record` is called once per mirror event as
/// ingestion produces them.
pub trait AuditMirror {
    fn record(&mut self, event: &MirrorEvent) -> Result<(), AuditMirrorError>;
    fn close(self: Box<Self>) -> Result<(), AuditMirrorError>;
}
