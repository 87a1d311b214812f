//! SQLite-backed relational audit mirror, grounded in the original `db.c`
//! schema: one row per signing transaction, one row per signed field value,
//! and one row per data-field value accepted into a signing transaction.

use std::path::Path;

use rusqlite::Connection;
use st_domain::ingest::MirrorEvent;
use st_ports::{AuditMirror, AuditMirrorError};

const SETUP_SQL: &str = "
CREATE TABLE IF NOT EXISTS signings (
    txnid  INTEGER NOT NULL,
    sigid  INTEGER NOT NULL,
    pid    INTEGER NOT NULL,
    visit  INTEGER NOT NULL,
    plate  INTEGER NOT NULL,
    sdesc  TEXT NOT NULL,
    signer TEXT NOT NULL,
    sdate  TEXT NOT NULL,
    stime  TEXT NOT NULL,
    PRIMARY KEY (txnid, sigid)
);
CREATE TABLE IF NOT EXISTS signature_values (
    txnid  INTEGER NOT NULL,
    sigid  INTEGER NOT NULL,
    plate  INTEGER NOT NULL,
    field  INTEGER NOT NULL,
    fdesc  TEXT NOT NULL,
    fvalue TEXT NOT NULL,
    PRIMARY KEY (txnid, sigid, plate, field)
);
CREATE TABLE IF NOT EXISTS data_values (
    txnid  INTEGER NOT NULL,
    sigid  INTEGER NOT NULL,
    plate  INTEGER NOT NULL,
    field  INTEGER NOT NULL,
    fdesc  TEXT NOT NULL,
    fvalue TEXT NOT NULL,
    PRIMARY KEY (txnid, sigid, plate, field)
);
CREATE INDEX IF NOT EXISTS signings_pid_visit_plate ON signings (pid, visit, plate);
";

pub struct SqliteAuditMirror {
    conn: Connection,
}

impl SqliteAuditMirror {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditMirrorError> {
        let conn = Connection::open(path).map_err(|e| AuditMirrorError::Io(e.to_string()))?;
        conn.execute_batch(SETUP_SQL)
            .map_err(|e| AuditMirrorError::Io(e.to_string()))?;
        conn.execute_batch("BEGIN")
            .map_err(|e| AuditMirrorError::Io(e.to_string()))?;
        Ok(Self { conn })
    }
}

impl AuditMirror for SqliteAuditMirror {
    fn record(&mut self, event: &MirrorEvent) -> Result<(), AuditMirrorError> {
        match event {
            MirrorEvent::SignatureWritten {
                key,
                txn_id,
                sig_plate,
                sig_name,
                signer,
                date,
                time,
                sig_fields,
                data_values,
            } => {
                self.conn
                    .execute(
                        "INSERT INTO signings (txnid, sigid, pid, visit, plate, sdesc, signer, sdate, stime)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                        rusqlite::params![
                            *txn_id as i64,
                            key.config_serial as i64,
                            key.pid,
                            key.visit,
                            sig_plate,
                            sig_name,
                            signer,
                            date,
                            time,
                        ],
                    )
                    .map_err(|e| AuditMirrorError::Io(e.to_string()))?;

                for (field, desc, value) in sig_fields {
                    self.conn
                        .execute(
                            "INSERT INTO signature_values (txnid, sigid, plate, field, fdesc, fvalue)
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                            rusqlite::params![
                                *txn_id as i64,
                                key.config_serial as i64,
                                sig_plate,
                                field,
                                desc,
                                value,
                            ],
                        )
                        .map_err(|e| AuditMirrorError::Io(e.to_string()))?;
                }

                for (plate, field, desc, value) in data_values {
                    self.conn
                        .execute(
                            "INSERT INTO data_values (txnid, sigid, plate, field, fdesc, fvalue)
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                            rusqlite::params![
                                *txn_id as i64,
                                key.config_serial as i64,
                                plate,
                                field,
                                desc,
                                value,
                            ],
                        )
                        .map_err(|e| AuditMirrorError::Io(e.to_string()))?;
                }
            }
            MirrorEvent::DataValueUpdated {
                key,
                txn_id,
                plate,
                field,
                desc,
                value,
            } => {
                self.conn
                    .execute(
                        "INSERT INTO data_values (txnid, sigid, plate, field, fdesc, fvalue)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT (txnid, sigid, plate, field) DO UPDATE SET fdesc = excluded.fdesc, fvalue = excluded.fvalue",
                        rusqlite::params![
                            *txn_id as i64,
                            key.config_serial as i64,
                            plate,
                            field,
                            desc,
                            value,
                        ],
                    )
                    .map_err(|e| AuditMirrorError::Io(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), AuditMirrorError> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| AuditMirrorError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_domain::NodeKey;

    #[test]
    fn records_a_signature_and_its_data_values() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut mirror = SqliteAuditMirror::open(file.path()).unwrap();

        let key = NodeKey {
            pid: 1,
            visit: 1,
            config_serial: 1,
        };
        mirror
            .record(&MirrorEvent::SignatureWritten {
                key: key.clone(),
                txn_id: 1,
                sig_plate: 10,
                sig_name: "Demographics".into(),
                signer: "jdoe".into(),
                date: "20240101".into(),
                time: "120000".into(),
                sig_fields: vec![(20, "Signature".into(), "Yes".into())],
                data_values: vec![(10, 15, "Some field".into(), "new".into())],
            })
            .unwrap();

        let count: i64 = mirror
            .conn
            .query_row("SELECT COUNT(*) FROM signings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let boxed: Box<dyn AuditMirror> = Box::new(mirror);
        boxed.close().unwrap();
    }
}
