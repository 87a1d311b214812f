//! Audit-trail ingestion engine per SIGTRACK-SPEC §4.5
//!
//! Consumes one positional audit record at a time and folds it into the
//! in-memory signature-node tree, emitting mirror events for adapters that
//! want a durable trace of every signing and data-value transaction (the
//! relational audit mirror is the only current consumer).

use std::collections::BTreeMap;

use crate::config::ConfigRegistry;
use crate::exclusions::ExclusionRegistry;
use crate::model::{ChangeStatus, FieldChange, NodeKey, RecStatus, SignatureNode, SignatureStatus};
use crate::token::TokenRecord;

pub const AUDITREC_RECTYPE: usize = 0;
pub const AUDITREC_DATE: usize = 1;
pub const AUDITREC_TIME: usize = 2;
pub const AUDITREC_USER: usize = 3;
pub const AUDITREC_PID: usize = 4;
pub const AUDITREC_VISIT: usize = 5;
pub const AUDITREC_PLATE: usize = 6;
pub const AUDITREC_FIELDREF: usize = 7;
pub const AUDITREC_UNIQUEID: usize = 8;
pub const AUDITREC_STATUS: usize = 9;
pub const AUDITREC_LEVEL: usize = 10;
pub const AUDITREC_MAXLEVEL: usize = 11;
pub const AUDITREC_OLDVALUE: usize = 14;
pub const AUDITREC_NEWVALUE: usize = 15;
pub const AUDITREC_FIELDPOS: usize = 16;
pub const AUDITREC_FIELDDESC: usize = 17;
pub const AUDITREC_OLDDECODE: usize = 18;
pub const AUDITREC_NEWDECODE: usize = 19;

/// A durable trace of one signing or data-value transaction, for the
/// relational audit mirror. Emitted only when the record under evaluation
/// participates in the transaction that just (re)signed a node — matching
/// the original's `db_write_signature` / `db_update_signature_value` calls.
#[derive(Debug, Clone)]
pub enum MirrorEvent {
    /// A signature completed. Carries the node's current sig-field values
    /// and every field change still outstanding on its covered plates,
    /// captured before the post-sign cleanup clears them.
    SignatureWritten {
        key: NodeKey,
        txn_id: u64,
        sig_plate: i64,
        sig_name: String,
        signer: String,
        date: String,
        time: String,
        sig_fields: Vec<(i64, String, String)>,
        data_values: Vec<(i64, i64, String, String)>,
    },
    /// One data value accepted into an already-signed transaction.
    DataValueUpdated {
        key: NodeKey,
        txn_id: u64,
        plate: i64,
        field: i64,
        desc: String,
        value: String,
    },
}

/// Tunable behavior flags affecting ingestion semantics. `allow_signer_changes`
/// and `resign_when_final` only take effect during evaluation
/// (`st_domain::evaluate`); they are threaded through here too so a single
/// CLI-parsed options value can drive both stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestionOptions {
    pub allow_signer_changes: bool,
    pub resign_when_final: bool,
}

pub struct IngestionEngine {
    pub configs: ConfigRegistry,
    pub exclusions: ExclusionRegistry,
    pub options: IngestionOptions,
    pub nodes: BTreeMap<NodeKey, SignatureNode>,
    txn_counter: u64,
    last_fingerprint: Option<String>,
}

impl IngestionEngine {
    pub fn new(configs: ConfigRegistry, exclusions: ExclusionRegistry, options: IngestionOptions) -> Self {
        Self {
            configs,
            exclusions,
            options,
            nodes: BTreeMap::new(),
            txn_counter: 0,
            last_fingerprint: None,
        }
    }

    /// Fold one audit record into the tree, returning any mirror events it
    /// produced. Returns an empty vector for records that do not participate
    /// in any configured signature (no matching config, out-of-range field).
    pub fn process_record(&mut self, record: &TokenRecord) -> Vec<MirrorEvent> {
        if !record.get(AUDITREC_FIELDREF).is_empty() {
            return Vec::new();
        }

        let field: i64 = match record.get(AUDITREC_FIELDPOS).parse() {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };
        if field > 2 && field <= 7 {
            return Vec::new();
        }

        let status: i64 = record.get(AUDITREC_STATUS).parse().unwrap_or(0);
        let level: i64 = record.get(AUDITREC_LEVEL).parse().unwrap_or(0);
        let pid: i64 = match record.get(AUDITREC_PID).parse() {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };
        let visit: i64 = match record.get(AUDITREC_VISIT).parse() {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };
        let plate: i64 = match record.get(AUDITREC_PLATE).parse() {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };

        let date = record.get(AUDITREC_DATE);
        let time = record.get(AUDITREC_TIME);
        let user = record.get(AUDITREC_USER);

        let fingerprint = format!("{date}|{time}|{user}|{pid}|{visit}|{plate}");
        if self.last_fingerprint.as_deref() != Some(fingerprint.as_str()) {
            self.txn_counter += 1;
            self.last_fingerprint = Some(fingerprint);
        }
        let txn_id = self.txn_counter;

        let mut events = Vec::new();

        let matching: Vec<u64> = self
            .configs
            .matching_plate(plate)
            .filter(|c| c.covers_visit(visit) && !c.ignores_field(field))
            .map(|c| c.serial)
            .collect();

        for serial in matching {
            let config = self
                .configs
                .iter()
                .find(|c| c.serial == serial)
                .expect("serial came from this registry")
                .clone();

            let key = NodeKey {
                pid,
                visit,
                config_serial: config.serial,
            };
            let node = self
                .nodes
                .entry(key.clone())
                .or_insert_with(|| SignatureNode::new(key.clone()));
            node.alloc_sig_fields(&config);

            if plate == config.sig_plate && status != 0 {
                node.sig_rec_seen = true;
            }

            if plate == config.sig_plate && config.is_sig_field(field) {
                let new_value = record.get(AUDITREC_NEWVALUE);
                if !new_value.is_empty() {
                    let desc = record.get(AUDITREC_FIELDDESC);
                    if let Some(mirror) = sign_field(
                        node,
                        config.sig_plate,
                        &config.name,
                        field,
                        desc,
                        new_value,
                        user,
                        date,
                        time,
                        txn_id,
                    ) {
                        events.push(mirror);
                    }
                } else {
                    unsign_field(node, field);
                }
            } else {
                let desc = record.get(AUDITREC_FIELDDESC);
                let old_value = record.get(AUDITREC_OLDVALUE);
                let new_value = record.get(AUDITREC_NEWVALUE);
                let new_decode = record.get(AUDITREC_NEWDECODE);
                let decoded = crate::model::decode_value(new_value, new_decode);

                apply_data_change(
                    node,
                    &self.exclusions,
                    txn_id,
                    plate,
                    field,
                    status,
                    level,
                    user,
                    date,
                    time,
                    desc,
                    old_value,
                    &decoded,
                );

                if node.txn_id == txn_id {
                    events.push(MirrorEvent::DataValueUpdated {
                        key,
                        txn_id,
                        plate,
                        field,
                        desc: desc.to_string(),
                        value: decoded,
                    });
                }
            }
        }

        events
    }
}

/// Mark `field` completed on the node's matching sig field. Once every sig
/// field is completed, commits the signature and returns a `SignatureWritten`
/// mirror event capturing the pre-cleanup state; the cleanup itself (wiping
/// outstanding field changes across every covered plate) happens here too,
/// matching the original's `db_write_signature` → `esn_free_signed_values`
/// ordering (capture, then clear).
#[allow(clippy::too_many_arguments)]
fn sign_field(
    node: &mut SignatureNode,
    sig_plate: i64,
    sig_name: &str,
    field: i64,
    desc: &str,
    value: &str,
    signer: &str,
    date: &str,
    time: &str,
    txn_id: u64,
) -> Option<MirrorEvent> {
    let mut completed = 0usize;
    for sf in node.sig_fields.iter_mut() {
        if sf.field == field {
            sf.completed = true;
            sf.desc = desc.to_string();
            sf.value = value.to_string();
        }
        if sf.completed {
            completed += 1;
        }
    }

    if completed != node.sig_fields.len() || node.sig_fields.is_empty() {
        return None;
    }

    node.signature_status = SignatureStatus::Complete;
    node.ever_signed = true;
    node.txn_id = txn_id;
    node.signer = signer.to_string();
    node.date = date.to_string();
    node.time = time.to_string();

    let sig_fields = node
        .sig_fields
        .iter()
        .map(|sf| (sf.field, sf.desc.clone(), sf.value.clone()))
        .collect();

    let mut data_values = Vec::new();
    for plate in node.plates.values() {
        for fc in plate.changes.values() {
            data_values.push((plate.plate, fc.field, fc.desc.clone(), fc.new_value.clone()));
        }
    }

    let event = MirrorEvent::SignatureWritten {
        key: node.key.clone(),
        txn_id,
        sig_plate,
        sig_name: sig_name.to_string(),
        signer: signer.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        sig_fields,
        data_values,
    };

    clear_signed_values(node, txn_id);

    Some(event)
}

/// Clear every covered plate's field-change history once the signing
/// transaction that produced it has been durably captured. A no-op if
/// `txn_id` does not match the node's current transaction (the node was
/// re-entered from a different, unrelated transaction since).
fn clear_signed_values(node: &mut SignatureNode, txn_id: u64) {
    if node.txn_id != txn_id {
        return;
    }
    for plate in node.plates.values_mut() {
        plate.changes.clear();
        plate.rec_status = RecStatus::Normal;
        plate.change_status = ChangeStatus::None;
    }
    node.change_status = ChangeStatus::None;
}

/// Clear the matching sig field. If the signature had been complete, it is
/// now invalidated. The transaction id is always cleared, whether or not the
/// node had been signed, matching the original's unconditional `txn_id = 0`.
fn unsign_field(node: &mut SignatureNode, field: i64) {
    let was_complete = node.signature_status == SignatureStatus::Complete;
    for sf in node.sig_fields.iter_mut() {
        if sf.field == field {
            sf.completed = false;
            sf.desc.clear();
            sf.value.clear();
        }
    }
    if was_complete {
        node.signature_status = SignatureStatus::Invalidated;
    }
    node.txn_id = 0;
}

/// Apply a change against a non-signature data field covered by the node.
///
/// The administrative plate-status transitions (error/deleted/lost) always
/// apply, regardless of transaction. Only the field-level change tracking
/// below them is skipped when this record's transaction is the one that just
/// signed the node (its value is already part of that signing's snapshot) or
/// when the field position falls below the first real data column.
#[allow(clippy::too_many_arguments)]
fn apply_data_change(
    node: &mut SignatureNode,
    exclusions: &ExclusionRegistry,
    txn_id: u64,
    plate: i64,
    field: i64,
    status: i64,
    level: i64,
    who: &str,
    date: &str,
    time: &str,
    desc: &str,
    old_value: &str,
    new_value: &str,
) {
    let ever_signed = node.ever_signed;
    {
        let cp = node.plate_mut(plate);
        cp.is_final = status == 0 || status == 1;

        if status == 3 && level == 7 {
            cp.rec_status = RecStatus::Error;
            if ever_signed {
                cp.change_status = ChangeStatus::Declined;
            }
        } else if status == 7 {
            cp.rec_status = RecStatus::Deleted;
            cp.changes.clear();
            if ever_signed {
                cp.change_status = ChangeStatus::Declined;
            }
        } else if status == 0 {
            cp.rec_status = RecStatus::Lost;
            cp.changes.clear();
            if ever_signed {
                cp.change_status = ChangeStatus::Declined;
            }
        }
    }

    if txn_id == node.txn_id {
        return;
    }
    if field < 7 {
        return;
    }

    let cp = node.plate_mut(plate);
    let is_new = !cp.changes.contains_key(&field);
    let fc = cp.changes.entry(field).or_insert_with(|| FieldChange {
        field,
        status: ChangeStatus::None,
        desc: String::new(),
        old_value: String::new(),
        new_value: String::new(),
        who: String::new(),
        date: String::new(),
        time: String::new(),
        comment: String::new(),
    });

    if is_new {
        fc.old_value = old_value.to_string();
    }
    fc.who = who.to_string();
    fc.date = date.to_string();
    fc.time = time.to_string();
    fc.desc = desc.to_string();
    fc.new_value = new_value.to_string();

    // Existing FieldChanges keep their prior comment and changeStatus; only
    // a newly-created one is classified against the exclusion list.
    if is_new {
        if exclusions.is_excluded(plate, field, who, date, &fc.old_value) {
            fc.status = ChangeStatus::Accepted;
            fc.comment = "Administratively exempted".to_string();
        } else {
            fc.status = ChangeStatus::Declined;
            fc.comment.clear();
        }
    }
}
