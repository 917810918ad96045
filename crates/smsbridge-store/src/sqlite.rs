// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SQLite snapshot store: a copy of Android's `mmssms.db`, read without ever
// opening the file for writing.
//
// Only the TelephonyProvider `sms` columns this crate reads are required:
//   sms(
//     _id       INTEGER PRIMARY KEY,
//     thread_id INTEGER,
//     address   TEXT,
//     date      INTEGER,              -- epoch milliseconds
//     read      INTEGER,
//     type      INTEGER,              -- Telephony.TextBasedSmsColumns.TYPE
//     body      TEXT
//   )
//
// Partitions are `type` codes, the same selection `content://sms/<partition>`
// applies on the device.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, params};
use smsbridge_core::error::{Result, SmsBridgeError};
use tracing::{debug, instrument};

use crate::traits::{Cursor, ExecutionContext, StoreQuery};

/// DDL for the `sms` table subset above. Used to build fixtures in tests.
pub const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS sms (
        _id INTEGER PRIMARY KEY,
        thread_id INTEGER,
        address TEXT,
        date INTEGER,
        read INTEGER DEFAULT 0,
        type INTEGER,
        body TEXT
    )
"#;

fn unavailable(e: rusqlite::Error) -> SmsBridgeError {
    SmsBridgeError::StoreUnavailable(e.to_string())
}

/// `Telephony.TextBasedSmsColumns.MESSAGE_TYPE_*` code selected by a partition.
fn partition_type(partition: &str) -> Option<i64> {
    match partition {
        "inbox" => Some(1),
        "sent" => Some(2),
        "draft" => Some(3),
        "outbox" => Some(4),
        "failed" => Some(5),
        "queued" => Some(6),
        _ => None,
    }
}

/// `Double.toString` formatting: a trailing `.0` on whole numbers, and
/// `E` notation outside `[1e-3, 1e7)`.
fn java_double(f: f64) -> String {
    if f.is_nan() {
        return "NaN".into();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    let magnitude = f.abs();
    if f == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let text = f.to_string();
        return if text.contains('.') { text } else { format!("{text}.0") };
    }
    let text = format!("{f:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => text,
    }
}

/// Render a column value the way Android's `Cursor.getString` does. A BLOB
/// has no string form there either.
fn text_value(value: ValueRef<'_>) -> std::result::Result<Option<String>, String> {
    match value {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(i.to_string())),
        ValueRef::Real(f) => Ok(Some(java_double(f))),
        ValueRef::Text(bytes) => Ok(Some(String::from_utf8_lossy(bytes).into_owned())),
        ValueRef::Blob(_) => Err("unable to convert BLOB to string".into()),
    }
}

fn select_sql(query: &StoreQuery) -> String {
    let direction = if query.sort_order.descending { "DESC" } else { "ASC" };
    format!(
        "SELECT {} FROM sms WHERE type = ?1 ORDER BY {} {direction}, rowid ASC",
        query.projection.join(", "),
        query.sort_order.column
    )
}

/// Execution context over a SQLite snapshot file.
///
/// Each query opens its own read-only connection; nothing is shared between
/// calls.
#[derive(Debug, Clone)]
pub struct SqliteContext {
    path: PathBuf,
}

impl SqliteContext {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExecutionContext for SqliteContext {
    #[instrument(skip_all, fields(path = %self.path.display(), partition = query.partition))]
    fn query(&self, query: &StoreQuery) -> Result<Option<Box<dyn Cursor + '_>>> {
        let kind = partition_type(query.partition).ok_or_else(|| {
            SmsBridgeError::StoreUnavailable(format!("unknown partition {:?}", query.partition))
        })?;

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(unavailable)?;

        let mut stmt = conn.prepare(&select_sql(query)).map_err(unavailable)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params![kind]).map_err(unavailable)?;

        // Step the statement to completion so the connection can be closed
        // before the cursor is handed out. A failure is kept and replayed at
        // the row it happened on.
        let mut snapshot = Vec::new();
        let mut fault = None;
        'rows: loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut values = Vec::with_capacity(columns.len());
                    for index in 0..columns.len() {
                        let value = row
                            .get_ref(index)
                            .map_err(|e| e.to_string())
                            .and_then(text_value);
                        match value {
                            Ok(value) => values.push(value),
                            Err(e) => {
                                fault = Some(e);
                                break 'rows;
                            }
                        }
                    }
                    snapshot.push(values);
                }
                Ok(None) => break,
                Err(e) => {
                    fault = Some(e.to_string());
                    break;
                }
            }
        }

        debug!(rows = snapshot.len(), faulted = fault.is_some(), "sqlite snapshot read");
        Ok(Some(Box::new(SqliteCursor {
            columns,
            rows: snapshot,
            fault,
            position: None,
        })))
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

/// Cursor over rows already read from SQLite.
struct SqliteCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    fault: Option<String>,
    position: Option<usize>,
}

impl Cursor for SqliteCursor {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn move_to_next(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        if next >= self.rows.len() {
            if let Some(fault) = self.fault.take() {
                return Err(SmsBridgeError::Cursor(fault));
            }
            self.position = Some(self.rows.len());
            return Ok(false);
        }
        self.position = Some(next);
        Ok(true)
    }

    fn get_string(&mut self, column: usize) -> Result<Option<String>> {
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| SmsBridgeError::Cursor("cursor is not positioned on a row".into()))?;
        row.get(column)
            .cloned()
            .ok_or_else(|| SmsBridgeError::Cursor(format!("column index {column} out of range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::list_messages;
    use smsbridge_core::types::MessageRecord;

    const INBOX: i64 = 1;
    const SENT: i64 = 2;
    const DRAFT: i64 = 3;

    type FixtureRow<'a> = (Option<&'a str>, Option<&'a str>, Option<i64>, Option<i64>);

    /// Helper: write a snapshot database with the given (address, body,
    /// date, type) rows in insertion order.
    fn fixture(dir: &tempfile::TempDir, rows: &[FixtureRow<'_>]) -> PathBuf {
        let path = dir.path().join("mmssms.db");
        let conn = Connection::open(&path).expect("create fixture db");
        conn.execute_batch(SCHEMA_SQL).expect("create schema");
        for (address, body, date, kind) in rows {
            conn.execute(
                "INSERT INTO sms (address, body, date, type) VALUES (?1, ?2, ?3, ?4)",
                params![address, body, date, kind],
            )
            .expect("insert row");
        }
        path
    }

    fn inbox_record(address: Option<&str>, body: &str, date: &str) -> MessageRecord {
        MessageRecord::new(
            address.map(String::from),
            Some(body.into()),
            Some(date.into()),
            Some("1".into()),
        )
    }

    fn cursor(rows: Vec<Vec<Option<String>>>, fault: Option<&str>) -> SqliteCursor {
        SqliteCursor {
            columns: vec!["address".into(), "body".into(), "date".into(), "type".into()],
            rows,
            fault: fault.map(String::from),
            position: None,
        }
    }

    #[test]
    fn newest_first_with_nulls_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(
            &dir,
            &[
                (None, Some("bye"), Some(100), Some(INBOX)),
                (Some("A"), Some("hi"), Some(200), Some(INBOX)),
            ],
        );

        let records = list_messages(&SqliteContext::new(&path)).unwrap();
        assert_eq!(
            records,
            vec![inbox_record(Some("A"), "hi", "200"), inbox_record(None, "bye", "100")]
        );
    }

    #[test]
    fn only_inbox_type_rows_are_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(
            &dir,
            &[
                (Some("A"), Some("in"), Some(300), Some(INBOX)),
                (Some("B"), Some("out"), Some(400), Some(SENT)),
                (Some("C"), Some("wip"), Some(500), Some(DRAFT)),
                (Some("D"), Some("untyped"), Some(600), None),
            ],
        );

        let records = list_messages(&SqliteContext::new(&path)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].body.as_deref(), Some("in"));
    }

    #[test]
    fn reads_full_telephony_provider_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mmssms.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE sms (
                _id INTEGER PRIMARY KEY, thread_id INTEGER, address TEXT, person INTEGER,
                date INTEGER, date_sent INTEGER DEFAULT 0, protocol INTEGER,
                read INTEGER DEFAULT 0, status INTEGER DEFAULT -1, type INTEGER,
                reply_path_present INTEGER, subject TEXT, body TEXT, service_center TEXT,
                locked INTEGER DEFAULT 0, sub_id INTEGER DEFAULT -1, error_code INTEGER DEFAULT -1,
                creator TEXT, seen INTEGER DEFAULT 0
            );
            INSERT INTO sms (thread_id, address, date, read, type, body)
                VALUES (1, 'A', 200, 1, 1, 'hi');
            INSERT INTO sms (thread_id, address, date, read, type, body)
                VALUES (1, 'B', 100, 1, 2, 'sent');",
        )
        .unwrap();
        drop(conn);

        let records = list_messages(&SqliteContext::new(&path)).unwrap();
        assert_eq!(records, vec![inbox_record(Some("A"), "hi", "200")]);
    }

    #[test]
    fn dates_sort_numerically() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(
            &dir,
            &[
                (Some("A"), Some("old"), Some(200), Some(INBOX)),
                (Some("A"), Some("new"), Some(1_700_000_000_000), Some(INBOX)),
            ],
        );

        let records = list_messages(&SqliteContext::new(&path)).unwrap();
        assert_eq!(records[0].date.as_deref(), Some("1700000000000"));
        assert_eq!(records[1].date.as_deref(), Some("200"));
    }

    #[test]
    fn equal_dates_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(
            &dir,
            &[
                (Some("A"), Some("first"), Some(100), Some(INBOX)),
                (Some("B"), Some("second"), Some(100), Some(INBOX)),
                (Some("C"), Some("third"), Some(100), Some(INBOX)),
            ],
        );

        let bodies: Vec<_> = list_messages(&SqliteContext::new(&path))
            .unwrap()
            .into_iter()
            .filter_map(|r| r.body)
            .collect();
        assert_eq!(bodies, ["first", "second", "third"]);
    }

    #[test]
    fn null_columns_stay_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, &[(None, None, None, Some(INBOX))]);

        let records = list_messages(&SqliteContext::new(&path)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, None);
        assert_eq!(records[0].body, None);
        assert_eq!(records[0].date, None);
        assert_eq!(records[0].kind.as_deref(), Some("1"));
    }

    #[test]
    fn empty_inbox_is_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, &[(Some("B"), Some("out"), Some(1), Some(SENT))]);
        assert!(list_messages(&SqliteContext::new(&path)).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_unavailable_and_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let context = SqliteContext::new(&path);

        assert!(matches!(
            context.query(&StoreQuery::inbox()),
            Err(SmsBridgeError::StoreUnavailable(_))
        ));
        assert!(list_messages(&context).unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn missing_table_is_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE contacts (name TEXT)")
            .unwrap();

        assert!(list_messages(&SqliteContext::new(&path)).unwrap().is_empty());
    }

    #[test]
    fn missing_projected_column_is_unavailable_not_a_literal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mmssms.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TABLE sms (_id INTEGER PRIMARY KEY, address TEXT, body TEXT, type INTEGER);
                 INSERT INTO sms (address, body, type) VALUES ('A', 'hi', 1);",
            )
            .unwrap();

        let context = SqliteContext::new(&path);
        assert!(matches!(
            context.query(&StoreQuery::inbox()),
            Err(SmsBridgeError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn blob_column_faults_at_its_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, &[(Some("A"), Some("first"), Some(200), Some(INBOX))]);
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            "INSERT INTO sms (address, body, date, type) VALUES ('B', x'00ff', 100, 1)",
            [],
        )
        .unwrap();
        drop(conn);

        match list_messages(&SqliteContext::new(&path)) {
            Err(SmsBridgeError::Cursor(message)) => {
                assert_eq!(message, "unable to convert BLOB to string")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn fault_is_replayed_after_the_rows_read_before_it() {
        let row = vec![Some("A".into()), Some("hi".into()), Some("200".into()), Some("1".into())];
        let mut faulted = cursor(vec![row], Some("disk I/O error"));

        assert!(faulted.move_to_next().unwrap());
        assert_eq!(faulted.get_string(1).unwrap().as_deref(), Some("hi"));
        match faulted.move_to_next() {
            Err(SmsBridgeError::Cursor(message)) => assert_eq!(message, "disk I/O error"),
            other => panic!("unexpected step result: {other:?}"),
        }
    }

    #[test]
    fn exhausted_cursor_without_fault_stops_cleanly() {
        let mut clean = cursor(vec![vec![None, None, None, Some("1".into())]], None);

        assert!(clean.move_to_next().unwrap());
        assert!(!clean.move_to_next().unwrap());
        assert!(!clean.move_to_next().unwrap());
        assert!(matches!(clean.get_string(0), Err(SmsBridgeError::Cursor(_))));
    }

    #[test]
    fn unknown_partition_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, &[]);
        let query = StoreQuery {
            partition: "archive",
            ..StoreQuery::inbox()
        };
        assert!(matches!(
            SqliteContext::new(&path).query(&query),
            Err(SmsBridgeError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn text_rendering_matches_android_get_string() {
        assert_eq!(text_value(ValueRef::Null).unwrap(), None);
        assert_eq!(text_value(ValueRef::Integer(42)).unwrap().as_deref(), Some("42"));
        assert_eq!(text_value(ValueRef::Text(b"hi")).unwrap().as_deref(), Some("hi"));
        assert_eq!(text_value(ValueRef::Text(b"")).unwrap().as_deref(), Some(""));
        assert!(text_value(ValueRef::Blob(b"\x00")).is_err());
    }

    #[test]
    fn reals_render_like_java_doubles() {
        assert_eq!(java_double(1.0), "1.0");
        assert_eq!(java_double(-2.5), "-2.5");
        assert_eq!(java_double(0.0), "0.0");
        assert_eq!(java_double(0.001), "0.001");
        assert_eq!(java_double(1e7), "1.0E7");
        assert_eq!(java_double(1.5e-4), "1.5E-4");
        assert_eq!(java_double(f64::NAN), "NaN");
        assert_eq!(java_double(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn select_statement_uses_bare_identifiers() {
        assert_eq!(
            select_sql(&StoreQuery::inbox()),
            "SELECT address, body, date, type FROM sms WHERE type = ?1 ORDER BY date DESC, rowid ASC"
        );
    }
}
