//! Concrete adapters implementing the `st-ports` traits: pipe-delimited file
//! readers for configuration, exclusions, and reference data; a streaming
//! audit-trail reader; plain-text worklist/priority-file writers; an
//! optional SQLite relational mirror; and an XLSX workbook report.

pub mod audit;
pub mod config;
pub mod exclusions;
pub mod reference;
pub mod sqlite_mirror;
pub mod workbook;
pub mod worklist;

pub use audit::StreamAuditSource;
pub use config::FileConfigSource;
pub use exclusions::FileExclusionSource;
pub use reference::FileReferenceSource;
pub use sqlite_mirror::SqliteAuditMirror;
pub use workbook::XlsxWorkbookSink;
pub use worklist::{FilePriorityFileSink, FileWorklistSink};
