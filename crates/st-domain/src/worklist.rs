//! Re-signing worklist selection per SIGTRACK-SPEC §4.8
//!
//! Selects the nodes that belong on the re-signing worklist: anything
//! invalidated outright, or anything complete-but-declined on an otherwise
//! normal record.

use serde::{Deserialize, Serialize};

use crate::model::{ChangeStatus, NodeKey, RecStatus, SignatureNode, SignatureStatus};

/// One worklist row: the patient/visit/signature-plate triple needing
/// attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorklistEntry {
    pub pid: i64,
    pub visit: i64,
    pub sig_plate: i64,
}

/// Select every node matching the worklist filter, in the order given by
/// `nodes`. `sig_plate` resolves a node's config serial to its signature
/// plate number.
pub fn select<'a>(
    nodes: impl Iterator<Item = &'a SignatureNode>,
    sig_plate: impl Fn(&NodeKey) -> i64,
) -> Vec<WorklistEntry> {
    nodes
        .filter(|n| needs_resign(n))
        .map(|n| WorklistEntry {
            pid: n.key.pid,
            visit: n.key.visit,
            sig_plate: sig_plate(&n.key),
        })
        .collect()
}

fn needs_resign(node: &SignatureNode) -> bool {
    node.signature_status == SignatureStatus::Invalidated
        || (node.signature_status == SignatureStatus::Complete
            && node.rec_status == RecStatus::Normal
            && node.change_status == ChangeStatus::Declined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(status: SignatureStatus, rec: RecStatus, change: ChangeStatus) -> SignatureNode {
        let mut n = SignatureNode::new(NodeKey {
            pid: 1,
            visit: 1,
            config_serial: 1,
        });
        n.signature_status = status;
        n.rec_status = rec;
        n.change_status = change;
        n
    }

    #[test]
    fn invalidated_signature_always_needs_resign() {
        let n = node(SignatureStatus::Invalidated, RecStatus::Normal, ChangeStatus::None);
        assert!(needs_resign(&n));
    }

    #[test]
    fn declined_change_on_normal_record_needs_resign() {
        let n = node(SignatureStatus::Complete, RecStatus::Normal, ChangeStatus::Declined);
        assert!(needs_resign(&n));
    }

    #[test]
    fn declined_change_on_error_record_is_excluded() {
        let n = node(SignatureStatus::Complete, RecStatus::Error, ChangeStatus::Declined);
        assert!(!needs_resign(&n));
    }

    #[test]
    fn accepted_change_does_not_need_resign() {
        let n = node(SignatureStatus::Complete, RecStatus::Normal, ChangeStatus::Accepted);
        assert!(!needs_resign(&n));
    }

    #[test]
    fn select_preserves_order_and_resolves_sig_plate() {
        let n1 = node(SignatureStatus::Invalidated, RecStatus::Normal, ChangeStatus::None);
        let n2 = node(SignatureStatus::Complete, RecStatus::Normal, ChangeStatus::Accepted);
        let n3 = node(SignatureStatus::Complete, RecStatus::Normal, ChangeStatus::Declined);
        let nodes = vec![n1, n2, n3];
        let entries = select(nodes.iter(), |_| 10);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sig_plate, 10);
    }
}
