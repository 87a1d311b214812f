//! Signature-tree evaluator per SIGTRACK-SPEC §4.6
//!
//! Walks every covered plate and field change beneath a signature node,
//! pushing status down from the node to its plates and fields, then bubbling
//! the most severe outcome back up. Pure: takes no I/O, only the in-memory
//! tree and the behavior flags that change how bubble-up is computed.

use crate::model::{ChangeStatus, RecStatus, SignatureNode};

/// Behavior flags affecting evaluation, independent of ingestion.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluatorPolicy {
    /// Treat a declined change against a non-final plate as merely deferred
    /// ("declined at final") rather than immediately requiring a re-sign.
    pub resign_when_final: bool,
    /// Exempt changes made by the signer themself from requiring a re-sign.
    pub allow_signer_changes: bool,
}

/// Re-evaluate one signature node's bubble-up status in place.
///
/// Mirrors the original `evaluate_tree`: reset the node's change status,
/// then for every covered plate push the node's signature status down, walk
/// its field changes applying the final/signer-exemption overrides and
/// bubbling the worst field status up to the plate, copy the signature
/// plate's record status up to the node, and finally bubble the worst
/// plate status up to the node.
pub fn evaluate(node: &mut SignatureNode, config_sig_plate: i64, policy: &EvaluatorPolicy) {
    node.change_status = ChangeStatus::None;

    let signer = node.signer.clone();

    for plate in node.plates.values_mut() {
        for fc in plate.changes.values_mut() {
            let mut status = fc.status;

            if status == ChangeStatus::Declined && !plate.is_final && policy.resign_when_final {
                status = ChangeStatus::DeclinedAtFinal;
            }

            if policy.allow_signer_changes && fc.who == signer {
                status = ChangeStatus::Accepted;
                fc.comment = "Changed by Signer".to_string();
            }

            fc.status = status;
        }

        if plate.plate == config_sig_plate {
            node.rec_status = plate.rec_status;
        }

        let plate_change_status = plate.change_status();
        if plate_change_status > node.change_status {
            node.change_status = plate_change_status;
        }
    }
}

impl crate::model::CoveredPlate {
    /// The highest change status bubbled up to the owning signature node:
    /// the plate's own persistent `change_status` (set by administrative
    /// record-status transitions) together with the highest status among
    /// its field changes.
    pub fn change_status(&self) -> ChangeStatus {
        self.changes
            .values()
            .map(|fc| fc.status)
            .max()
            .unwrap_or(ChangeStatus::None)
            .max(self.change_status)
    }
}

/// Whether a node's rec_status reflects an administrative condition
/// (error/lost/deleted) that should suppress further resign reasoning.
pub fn is_administrative(status: RecStatus) -> bool {
    matches!(status, RecStatus::Error | RecStatus::Lost | RecStatus::Deleted)
}
