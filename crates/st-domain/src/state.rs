//! Human-readable state strings per SIGTRACK-SPEC §4.7
//!
//! A string-for-string port of the original `esn_get_state`'s two tables:
//! one for the signature workflow, one for source-data-verification mode.
//! Both switch on `signatureStatus` first, then `recStatus`, with the
//! changeStatus sub-switch only reached for a complete signature on an
//! otherwise normal record.

use crate::model::{ChangeStatus, RecStatus, SignatureNode, SignatureStatus};

/// Render a node's current lifecycle state as the label shown in the
/// worklist and workbook report.
pub fn display_state(node: &SignatureNode, sdv_mode: bool) -> &'static str {
    if sdv_mode {
        display_state_sdv(node)
    } else {
        display_state_normal(node)
    }
}

fn display_state_normal(node: &SignatureNode) -> &'static str {
    match node.signature_status {
        SignatureStatus::None => match node.rec_status {
            RecStatus::Normal => "NEVER SIGNED",
            RecStatus::Error => "UNSIGNED ERROR RECORD",
            RecStatus::Lost => "UNSIGNED LOST RECORD",
            RecStatus::Deleted => "UNSIGNED DELETED RECORD",
        },
        SignatureStatus::Invalidated => match node.rec_status {
            RecStatus::Normal => "SIGNATURE REMOVED",
            RecStatus::Error => "SIG. REMOVED, ERROR RECORD",
            RecStatus::Lost => "SIG. REMOVED, LOST RECORD",
            RecStatus::Deleted => "SIG. REMOVED, DELETED RECORD",
        },
        SignatureStatus::Complete => match node.rec_status {
            RecStatus::Normal => match node.change_status {
                ChangeStatus::None => "SIGNATURE OK",
                ChangeStatus::Accepted => "ADMIN EXEMPTED RE-SIGN",
                ChangeStatus::DeclinedAtFinal => "RE-SIGN REQD WHEN FINAL",
                ChangeStatus::Declined => "RE-SIGN REQD",
            },
            RecStatus::Error => "SIGNED IN ERROR",
            RecStatus::Lost => "SIGNED, MARKED LOST",
            RecStatus::Deleted => "DELETED SIGNED RECORDS",
        },
    }
}

fn display_state_sdv(node: &SignatureNode) -> &'static str {
    match node.signature_status {
        SignatureStatus::None => match node.rec_status {
            RecStatus::Normal => "NEVER VERIFIED",
            RecStatus::Error => "NEVER VERIFIED (ERROR REC)",
            RecStatus::Lost => "NEVER VERIFIED (LOST REC)",
            RecStatus::Deleted => "NEVER VERIFIED (DELETED REC)",
        },
        SignatureStatus::Invalidated => match node.rec_status {
            RecStatus::Normal => "RE-VERIFICATION REQD",
            RecStatus::Error => "RE-VERIFICATION REQD (ERROR REC)",
            RecStatus::Lost => "RE-VERIFICATION REQD (LOST REC)",
            RecStatus::Deleted => "RE-VERIFICATION REQD (DELETED REC)",
        },
        SignatureStatus::Complete => match node.rec_status {
            RecStatus::Normal => match node.change_status {
                ChangeStatus::None => "SDV OK",
                ChangeStatus::Accepted => "ADMIN EXEMPTED RE-VERIFICATION",
                ChangeStatus::DeclinedAtFinal => "RE-VERIFICATION REQD WHEN FINAL",
                ChangeStatus::Declined => "RE-VERIFICATION REQD",
            },
            RecStatus::Error => "SDV OK (ERROR REC)",
            RecStatus::Lost => "SDV OK (LOST REC)",
            RecStatus::Deleted => "SDV OK (DELETED REC)",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKey;

    fn base_node() -> SignatureNode {
        SignatureNode::new(NodeKey {
            pid: 1,
            visit: 1,
            config_serial: 1,
        })
    }

    #[test]
    fn never_signed_is_reported_before_any_signature() {
        let node = base_node();
        assert_eq!(display_state(&node, false), "NEVER SIGNED");
        assert_eq!(display_state(&node, true), "NEVER VERIFIED");
    }

    #[test]
    fn unsigned_error_record_is_distinct_from_signed_in_error() {
        let mut node = base_node();
        node.rec_status = RecStatus::Error;
        assert_eq!(display_state(&node, false), "UNSIGNED ERROR RECORD");
    }

    #[test]
    fn declined_change_requires_resign() {
        let mut node = base_node();
        node.signature_status = SignatureStatus::Complete;
        node.change_status = ChangeStatus::Declined;
        assert_eq!(display_state(&node, false), "RE-SIGN REQD");
        assert_eq!(display_state(&node, true), "RE-VERIFICATION REQD");
    }

    #[test]
    fn admin_exempted_change_is_distinguished_from_clean_signature() {
        let mut node = base_node();
        node.signature_status = SignatureStatus::Complete;
        node.change_status = ChangeStatus::Accepted;
        assert_eq!(display_state(&node, false), "ADMIN EXEMPTED RE-SIGN");
        assert_eq!(display_state(&node, true), "ADMIN EXEMPTED RE-VERIFICATION");
    }

    #[test]
    fn declined_at_final_is_distinguished_from_immediate_resign() {
        let mut node = base_node();
        node.signature_status = SignatureStatus::Complete;
        node.change_status = ChangeStatus::DeclinedAtFinal;
        assert_eq!(display_state(&node, false), "RE-SIGN REQD WHEN FINAL");
    }

    #[test]
    fn rec_status_is_subordinate_to_signature_status() {
        let mut node = base_node();
        node.signature_status = SignatureStatus::Complete;
        node.rec_status = RecStatus::Deleted;
        assert_eq!(display_state(&node, false), "DELETED SIGNED RECORDS");

        let mut invalidated = base_node();
        invalidated.signature_status = SignatureStatus::Invalidated;
        invalidated.rec_status = RecStatus::Lost;
        assert_eq!(display_state(&invalidated, false), "SIG. REMOVED, LOST RECORD");
    }
}
