//! Signature state model per SIGTRACK-SPEC §3 / §4.4
//!
//! Mirrors the original `eSigConfig` / `eSigNode` / `CoveredPlate` /
//! `FieldChange` hierarchy with owned `BTreeMap`-backed sorted containers in
//! place of intrusive red-black trees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rangeset::RangeSet;

/// Status of the signature itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum SignatureStatus {
    #[default]
    None,
    Complete,
    Invalidated,
}

/// Status of a single covered plate's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum RecStatus {
    #[default]
    Normal,
    Error,
    Lost,
    Deleted,
}

/// Status of an individual field change within a covered plate.
///
/// Declared in ascending priority order matching the bubble-up comparisons
/// in the original evaluator (`fc->status.changeStatus > cp->status.changeStatus`),
/// so `Ord` here reflects priority, not the original enum's raw integer
/// values (which numbered `Declined` below `DeclinedAtFinal`). See DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ChangeStatus {
    #[default]
    None,
    Accepted,
    DeclinedAtFinal,
    Declined,
}

/// A patient/visit/signature-plate key identifying one signature node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub pid: i64,
    pub visit: i64,
    pub config_serial: u64,
}

/// One configured signature: which plate triggers it, which visits it
/// applies to, which fields it covers, and which fields it ignores.
#[derive(Debug, Clone)]
pub struct SignatureConfig {
    pub serial: u64,
    pub name: String,
    pub plate: i64,
    pub ignore_fields: RangeSet,
    pub visits: RangeSet,
    pub sig_plate: i64,
    pub sig_fields: RangeSet,
}

impl SignatureConfig {
    pub fn covers_visit(&self, visit: i64) -> bool {
        self.visits.contains(visit)
    }

    pub fn ignores_field(&self, field: i64) -> bool {
        self.ignore_fields.contains(field)
    }

    pub fn is_sig_field(&self, field: i64) -> bool {
        self.sig_fields.contains(field)
    }
}

/// One of the fields that must be completed to consider the signature signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigField {
    pub field: i64,
    pub completed: bool,
    pub desc: String,
    pub value: String,
}

/// A single accepted/declined change to a data field within a covered plate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: i64,
    pub status: ChangeStatus,
    pub desc: String,
    pub old_value: String,
    pub new_value: String,
    pub who: String,
    pub date: String,
    pub time: String,
    pub comment: String,
}

/// One data plate covered by a signature node, tracking every field change
/// that has occurred against it since the signature was last (re)signed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoveredPlate {
    pub plate: i64,
    pub rec_status: RecStatus,
    /// The plate's own changeStatus, set directly by administrative
    /// record-status transitions (error/lost/deleted). Persists across
    /// evaluations — unlike a field change, nothing ever resets it back to
    /// `None` once set. Bubbled up to the node alongside the max over
    /// `changes` during evaluation.
    pub change_status: ChangeStatus,
    pub is_final: bool,
    pub changes: BTreeMap<i64, FieldChange>,
}

impl CoveredPlate {
    pub fn new(plate: i64) -> Self {
        Self {
            plate,
            ..Default::default()
        }
    }

    pub fn field_change_count(&self) -> usize {
        self.changes.len()
    }
}

/// The lifecycle state of one signature instance: a patient/visit/config
/// triple, tracking every covered plate and the sign/unsign history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureNode {
    pub key: NodeKey,
    pub signature_status: SignatureStatus,
    pub rec_status: RecStatus,
    pub change_status: ChangeStatus,
    pub signer: String,
    pub date: String,
    pub time: String,
    pub sig_rec_seen: bool,
    /// Whether this signature has ever reached `Complete`, used to decide
    /// whether an administrative plate status (error/deleted/lost) should
    /// also mark the node as declined.
    pub ever_signed: bool,
    pub txn_id: u64,
    pub sig_fields: Vec<SigField>,
    pub plates: BTreeMap<i64, CoveredPlate>,
}

impl SignatureNode {
    pub fn new(key: NodeKey) -> Self {
        Self {
            key,
            signature_status: SignatureStatus::None,
            rec_status: RecStatus::Normal,
            change_status: ChangeStatus::None,
            signer: String::new(),
            date: String::new(),
            time: String::new(),
            sig_rec_seen: false,
            ever_signed: false,
            txn_id: 0,
            sig_fields: Vec::new(),
            plates: BTreeMap::new(),
        }
    }

    /// Populate `sig_fields` from the config's sig-field range, in ascending
    /// field order. A no-op once already allocated.
    pub fn alloc_sig_fields(&mut self, config: &SignatureConfig) {
        if !self.sig_fields.is_empty() {
            return;
        }
        let mut fields: Vec<i64> = config
            .sig_fields
            .ranges()
            .iter()
            .flat_map(|&(lo, hi)| lo..=hi)
            .collect();
        fields.sort_unstable();
        fields.dedup();
        self.sig_fields = fields
            .into_iter()
            .map(|field| SigField {
                field,
                completed: false,
                desc: String::new(),
                value: String::new(),
            })
            .collect();
    }

    pub fn plate_mut(&mut self, plate: i64) -> &mut CoveredPlate {
        self.plates.entry(plate).or_insert_with(|| CoveredPlate::new(plate))
    }
}

/// Render a value alongside its decoded description, as `"value=decode"`, or
/// the bare value when no decode text is available.
pub fn decode_value(value: &str, decode: &str) -> String {
    if decode.is_empty() {
        value.to_string()
    } else {
        format!("{value}={decode}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_value_falls_back_to_bare_value() {
        assert_eq!(decode_value("1", ""), "1");
        assert_eq!(decode_value("1", "Yes"), "1=Yes");
    }

    #[test]
    fn alloc_sig_fields_is_idempotent() {
        let config = SignatureConfig {
            serial: 1,
            name: "sig".into(),
            plate: 10,
            ignore_fields: RangeSet::parse("").unwrap(),
            visits: RangeSet::parse("*").unwrap(),
            sig_plate: 10,
            sig_fields: RangeSet::parse("3,5-6").unwrap(),
        };
        let mut node = SignatureNode::new(NodeKey {
            pid: 1,
            visit: 1,
            config_serial: 1,
        });
        node.alloc_sig_fields(&config);
        assert_eq!(node.sig_fields.len(), 3);
        node.sig_fields[0].completed = true;
        node.alloc_sig_fields(&config);
        assert!(node.sig_fields[0].completed, "second call must not reset state");
    }

    #[test]
    fn change_status_priority_order() {
        assert!(ChangeStatus::Accepted > ChangeStatus::None);
        assert!(ChangeStatus::DeclinedAtFinal > ChangeStatus::Accepted);
        assert!(ChangeStatus::Declined > ChangeStatus::DeclinedAtFinal);
    }
}
