//! Signature tracking tool CLI.
//!
//! Reads the audit-trail stream from stdin, replays it through the
//! ingestion engine and evaluator, and emits a re-signing worklist, a
//! decorated workbook report, and an optional relational audit mirror.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};

use st_adapters::{
    FileConfigSource, FileExclusionSource, FilePriorityFileSink, FileReferenceSource,
    FileWorklistSink, SqliteAuditMirror, StreamAuditSource, XlsxWorkbookSink,
};
use st_domain::config::ConfigRegistry;
use st_domain::evaluate::{evaluate, EvaluatorPolicy};
use st_domain::ingest::{IngestionEngine, IngestionOptions};
use st_domain::state::display_state;
use st_domain::token::TokenRecord;
use st_domain::worklist;
use st_ports::{
    AuditMirror, AuditMirrorError, AuditSource, AuditSourceError, ConfigSource, ConfigSourceError,
    ExclusionSource, ExclusionSourceError, PriorityFileSink, PriorityFileSinkError,
    ReferenceSource, ReferenceSourceError, WorkbookRow, WorkbookSink, WorkbookSinkError,
    WorklistSink, WorklistSinkError,
};

const EXIT_SUCCESS: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;

/// Errors surfaced by the `sigtrack` binary's top-level run loop.
#[derive(Debug, Error)]
enum CliError {
    #[error("failed to load signature configuration: {0}")]
    Config(#[from] ConfigSourceError),
    #[error("failed to load exclusions: {0}")]
    Exclusion(#[from] ExclusionSourceError),
    #[error("failed to load reference data: {0}")]
    Reference(#[from] ReferenceSourceError),
    #[error("failed to read audit trail: {0}")]
    Audit(#[from] AuditSourceError),
    #[error("failed to write audit mirror: {0}")]
    Mirror(#[from] AuditMirrorError),
    #[error("failed to write priority file: {0}")]
    PriorityFile(#[from] PriorityFileSinkError),
    #[error("failed to write worklist: {0}")]
    Worklist(#[from] WorklistSinkError),
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] WorkbookSinkError),
}

/// Reconstructs electronic-signature lifecycles from an audit-trail stream.
#[derive(Debug, Parser)]
#[command(name = "sigtrack", version, about)]
struct Cli {
    /// Signature configuration file (required).
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Write the re-signing worklist to this path.
    #[arg(short = 'd', long)]
    drf: Option<PathBuf>,

    /// Write the decorated workbook report to this path.
    #[arg(short = 'x', long)]
    xls: Option<PathBuf>,

    /// Exempt changes made by the signer themself from requiring a re-sign.
    #[arg(short = 'a', long)]
    allow_signer_changes: bool,

    /// Only evaluate nodes whose covered plates have arrived.
    #[arg(short = 'A', long)]
    arrived_only: bool,

    /// Defer a declined change's effect until its plate is final.
    #[arg(short = 'F', long)]
    resign_when_final: bool,

    /// Report source-data-verification state labels instead of signature ones.
    #[arg(short = 'S', long)]
    sdv: bool,

    /// Study directory; implies `<dir>/lib/DFcenters` and `<dir>/lib/DFcountries`.
    #[arg(short = 's', long)]
    studydir: Option<PathBuf>,

    /// Write a relational audit mirror (SQLite) to this path.
    #[arg(short = 'D', long)]
    db: Option<PathBuf>,

    /// Signer-exclusion list.
    #[arg(short = 'E', long)]
    exclusion: Option<PathBuf>,

    /// Write the priority file and exit, without reading any audit trail.
    #[arg(short = 'P', long)]
    priority_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(error = %e, "sigtrack failed");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<u8, CliError> {
    let configs: ConfigRegistry = match FileConfigSource::new(&cli.config).load() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %CliError::from(e), "failed to load signature configuration");
            return Ok(EXIT_CONFIG_ERROR);
        }
    };
    if configs.is_empty() {
        error!("no signature configurations loaded");
        return Ok(EXIT_CONFIG_ERROR);
    }
    info!(count = configs.len(), "loaded signature configurations");

    // Priority-file mode writes and exits before any audit trail is read.
    if let Some(priority_path) = &cli.priority_file {
        let mut rows = Vec::new();
        for config in configs.iter() {
            rows.extend(ConfigRegistry::priority_rows(config));
        }
        FilePriorityFileSink::new(priority_path).write(&rows)?;
        info!(path = %priority_path.display(), rows = rows.len(), "wrote priority file");
        return Ok(EXIT_SUCCESS);
    }

    let exclusions = match &cli.exclusion {
        Some(path) => FileExclusionSource::new(path).load()?,
        None => Default::default(),
    };

    let (centers_path, countries_path) = match &cli.studydir {
        Some(dir) => (Some(dir.join("lib/DFcenters")), Some(dir.join("lib/DFcountries"))),
        None => (None, None),
    };
    let reference_source = FileReferenceSource::new(centers_path, countries_path);
    let centers = reference_source.load_centers()?;
    let countries = reference_source.load_countries()?;

    let options = IngestionOptions {
        allow_signer_changes: cli.allow_signer_changes,
        resign_when_final: cli.resign_when_final,
    };
    let mut engine = IngestionEngine::new(configs, exclusions, options);

    let mut mirror: Option<Box<dyn AuditMirror>> = match &cli.db {
        Some(path) => Some(Box::new(SqliteAuditMirror::open(path)?)),
        None => None,
    };

    let mut audit_source = StreamAuditSource::from_stdin();
    let mut record = TokenRecord::with_capacity(20);
    let mut records_read: u64 = 0;

    while audit_source.next_record(&mut record)? {
        records_read += 1;
        let events = engine.process_record(&record);
        if let Some(mirror) = mirror.as_mut() {
            for event in &events {
                mirror.record(event)?;
            }
        }
    }
    info!(records = records_read, "finished ingesting audit trail");

    if let Some(mirror) = mirror.take() {
        mirror.close()?;
    }

    let policy = EvaluatorPolicy {
        resign_when_final: cli.resign_when_final,
        allow_signer_changes: cli.allow_signer_changes,
    };
    for node in engine.nodes.values_mut() {
        let sig_plate = engine
            .configs
            .iter()
            .find(|c| c.serial == node.key.config_serial)
            .map(|c| c.sig_plate)
            .unwrap_or(0);
        evaluate(node, sig_plate, &policy);
    }

    if let Some(drf_path) = &cli.drf {
        let entries = worklist::select(engine.nodes.values(), |key| {
            engine
                .configs
                .iter()
                .find(|c| c.serial == key.config_serial)
                .map(|c| c.sig_plate)
                .unwrap_or(0)
        });
        FileWorklistSink::new(drf_path).write(&entries)?;
        info!(path = %drf_path.display(), entries = entries.len(), "wrote re-signing worklist");
    }

    if let Some(xls_path) = &cli.xls {
        let mut rows = Vec::new();
        for node in engine.nodes.values() {
            if cli.arrived_only && !node.sig_rec_seen {
                continue;
            }
            let config = engine
                .configs
                .iter()
                .find(|c| c.serial == node.key.config_serial);
            let Some(config) = config else { continue };
            let center = centers.find(node.key.pid);
            rows.push(WorkbookRow {
                region: countries.find_region(center).to_string(),
                country: countries.find_country(center).to_string(),
                center,
                pid: node.key.pid,
                visit: node.key.visit,
                signature_name: config.name.clone(),
                state: display_state(node, cli.sdv).to_string(),
                signer: node.signer.clone(),
                date: node.date.clone(),
                time: node.time.clone(),
                comment: String::new(),
            });
        }
        XlsxWorkbookSink::new(xls_path).write(&rows)?;
        info!(path = %xls_path.display(), rows = rows.len(), "wrote workbook report");
    }

    Ok(EXIT_SUCCESS)
}
