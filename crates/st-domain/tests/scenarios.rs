//! Scenario tests S1-S6: drive the ingestion engine and evaluator directly
//! with in-memory audit records, no adapters involved.

use st_domain::config::ConfigRegistry;
use st_domain::evaluate::{evaluate, EvaluatorPolicy};
use st_domain::exclusions::{ExclusionRegistry, ExclusionRow};
use st_domain::ingest::{
    IngestionEngine, IngestionOptions, AUDITREC_DATE, AUDITREC_FIELDDESC, AUDITREC_FIELDPOS,
    AUDITREC_FIELDREF, AUDITREC_LEVEL, AUDITREC_NEWVALUE, AUDITREC_OLDVALUE, AUDITREC_PID,
    AUDITREC_PLATE, AUDITREC_STATUS, AUDITREC_TIME, AUDITREC_USER, AUDITREC_VISIT,
};
use st_domain::model::{ChangeStatus, NodeKey, RecStatus, SignatureConfig, SignatureStatus};
use st_domain::rangeset::RangeSet;
use st_domain::token::TokenRecord;
use st_domain::worklist;

fn demographics_config() -> ConfigRegistry {
    let mut registry = ConfigRegistry::new();
    registry.push(SignatureConfig {
        serial: 1,
        name: "Demographics".into(),
        plate: 10,
        ignore_fields: RangeSet::parse("").unwrap(),
        visits: RangeSet::parse("1").unwrap(),
        sig_plate: 10,
        sig_fields: RangeSet::parse("20").unwrap(),
    });
    registry
}

/// Build an audit record with every position defaulted to empty, overriding
/// only the named ones relevant to a given test.
#[allow(clippy::too_many_arguments)]
fn audit_record(
    date: &str,
    time: &str,
    user: &str,
    pid: i64,
    visit: i64,
    plate: i64,
    status: i64,
    level: i64,
    old_value: &str,
    new_value: &str,
    field_pos: i64,
    field_desc: &str,
) -> TokenRecord {
    let mut fields = vec![String::new(); 20];
    fields[AUDITREC_FIELDREF] = "0".to_string();
    fields[AUDITREC_DATE] = date.to_string();
    fields[AUDITREC_TIME] = time.to_string();
    fields[AUDITREC_USER] = user.to_string();
    fields[AUDITREC_PID] = pid.to_string();
    fields[AUDITREC_VISIT] = visit.to_string();
    fields[AUDITREC_PLATE] = plate.to_string();
    fields[AUDITREC_STATUS] = status.to_string();
    fields[AUDITREC_LEVEL] = level.to_string();
    fields[AUDITREC_OLDVALUE] = old_value.to_string();
    fields[AUDITREC_NEWVALUE] = new_value.to_string();
    fields[AUDITREC_FIELDPOS] = field_pos.to_string();
    fields[AUDITREC_FIELDDESC] = field_desc.to_string();
    TokenRecord::from_fields(fields)
}

fn node_key() -> NodeKey {
    NodeKey {
        pid: 42,
        visit: 1,
        config_serial: 1,
    }
}

#[test]
fn s1_clean_sign() {
    let mut engine = IngestionEngine::new(demographics_config(), ExclusionRegistry::new(), IngestionOptions::default());

    let sign = audit_record("20240101", "100000", "drX", 42, 1, 10, 3, 0, "", "yes", 20, "Sign");
    let events = engine.process_record(&sign);
    assert_eq!(events.len(), 1);

    let node = &engine.nodes[&node_key()];
    assert_eq!(node.signature_status, SignatureStatus::Complete);
    assert_eq!(node.signer, "drX");
    assert_eq!(node.txn_id, 1);

    let entries = worklist::select(engine.nodes.values(), |_| 10);
    assert!(entries.is_empty());
}

#[test]
fn s2_sign_then_out_of_txn_change_requires_resign() {
    let mut engine = IngestionEngine::new(demographics_config(), ExclusionRegistry::new(), IngestionOptions::default());

    let sign = audit_record("20240101", "100000", "drX", 42, 1, 10, 3, 0, "", "yes", 20, "Sign");
    engine.process_record(&sign);

    let change = audit_record("20240102", "090000", "drY", 42, 1, 10, 1, 0, "42", "44", 21, "Age");
    engine.process_record(&change);

    let node = &engine.nodes[&node_key()];
    let plate = &node.plates[&10];
    assert_eq!(plate.changes.len(), 1);
    assert_eq!(plate.changes[&21].new_value, "44");

    let policy = EvaluatorPolicy::default();
    let mut node = engine.nodes.remove(&node_key()).unwrap();
    evaluate(&mut node, 10, &policy);
    assert_eq!(node.change_status, ChangeStatus::Declined);
    engine.nodes.insert(node_key(), node);

    let entries = worklist::select(engine.nodes.values(), |_| 10);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].pid, 42);
    assert_eq!(entries[0].visit, 1);
    assert_eq!(entries[0].sig_plate, 10);
}

#[test]
fn s3_signer_exemption_clears_worklist() {
    let mut engine = IngestionEngine::new(demographics_config(), ExclusionRegistry::new(), IngestionOptions::default());

    let sign = audit_record("20240101", "100000", "drX", 42, 1, 10, 3, 0, "", "yes", 20, "Sign");
    engine.process_record(&sign);
    let change = audit_record("20240102", "090000", "drX", 42, 1, 10, 1, 0, "42", "44", 21, "Age");
    engine.process_record(&change);

    let policy = EvaluatorPolicy {
        allow_signer_changes: true,
        ..Default::default()
    };
    let mut node = engine.nodes.remove(&node_key()).unwrap();
    evaluate(&mut node, 10, &policy);
    assert_eq!(node.change_status, ChangeStatus::Accepted);
    engine.nodes.insert(node_key(), node);

    let entries = worklist::select(engine.nodes.values(), |_| 10);
    assert!(entries.is_empty());
}

#[test]
fn s4_deferred_until_final() {
    let mut engine = IngestionEngine::new(demographics_config(), ExclusionRegistry::new(), IngestionOptions::default());

    let sign = audit_record("20240101", "100000", "drX", 42, 1, 10, 3, 0, "", "yes", 20, "Sign");
    engine.process_record(&sign);
    // status=3, level != 7: pending, not final.
    let change = audit_record("20240102", "090000", "drY", 42, 1, 10, 3, 0, "42", "44", 21, "Age");
    engine.process_record(&change);

    let policy = EvaluatorPolicy {
        resign_when_final: true,
        ..Default::default()
    };
    let mut node = engine.nodes.remove(&node_key()).unwrap();
    evaluate(&mut node, 10, &policy);
    assert_eq!(node.change_status, ChangeStatus::DeclinedAtFinal);
    engine.nodes.insert(node_key(), node);

    let entries = worklist::select(engine.nodes.values(), |_| 10);
    assert!(entries.is_empty());
}

#[test]
fn s5_unsign_invalidates_and_lists_for_resign() {
    let mut engine = IngestionEngine::new(demographics_config(), ExclusionRegistry::new(), IngestionOptions::default());

    let sign = audit_record("20240101", "100000", "drX", 42, 1, 10, 3, 0, "", "yes", 20, "Sign");
    engine.process_record(&sign);

    let unsign = audit_record("20240103", "110000", "drX", 42, 1, 10, 3, 0, "yes", "", 20, "Sign");
    engine.process_record(&unsign);

    let node = &engine.nodes[&node_key()];
    assert_eq!(node.signature_status, SignatureStatus::Invalidated);
    assert_eq!(node.txn_id, 0);

    let entries = worklist::select(engine.nodes.values(), |_| 10);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].pid, 42);
}

#[test]
fn s6_exclusion_keeps_worklist_empty() {
    let mut exclusions = ExclusionRegistry::new();
    exclusions.push(ExclusionRow {
        plate: 10,
        field: 21,
        user: "admin".into(),
        date: "20240102".into(),
    });
    let mut engine = IngestionEngine::new(demographics_config(), exclusions, IngestionOptions::default());

    let sign = audit_record("20240101", "100000", "drX", 42, 1, 10, 3, 0, "", "yes", 20, "Sign");
    engine.process_record(&sign);

    let change = audit_record("20240102", "110000", "admin", 42, 1, 10, 1, 0, "", "new", 21, "Age");
    engine.process_record(&change);

    let node = &engine.nodes[&node_key()];
    let plate = &node.plates[&10];
    assert_eq!(plate.changes[&21].status, ChangeStatus::Accepted);
    assert_eq!(plate.changes[&21].comment, "Administratively exempted");

    let policy = EvaluatorPolicy::default();
    let mut node = engine.nodes.remove(&node_key()).unwrap();
    evaluate(&mut node, 10, &policy);
    assert_eq!(node.change_status, ChangeStatus::Accepted);
    assert_eq!(node.rec_status, RecStatus::Normal);
    engine.nodes.insert(node_key(), node);

    let entries = worklist::select(engine.nodes.values(), |_| 10);
    assert!(entries.is_empty());
}
