// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Record store adapter: one inbox query, one `MessageRecord` per row.

use smsbridge_core::error::Result;
use smsbridge_core::types::MessageRecord;
use tracing::{debug, instrument, warn};

use crate::traits::{Cursor, ExecutionContext, StoreQuery};

/// Column positions resolved by name against an open cursor.
#[derive(Debug, Clone, Copy)]
struct Columns {
    address: Option<usize>,
    body: Option<usize>,
    date: Option<usize>,
    kind: Option<usize>,
}

impl Columns {
    fn resolve(cursor: &dyn Cursor) -> Self {
        let lookup = |name: &str| {
            let index = cursor.column_index(name);
            if index.is_none() {
                debug!(column = name, "cursor has no such column; field will be absent");
            }
            index
        };
        Self {
            address: lookup("address"),
            body: lookup("body"),
            date: lookup("date"),
            kind: lookup("type"),
        }
    }

    fn read_row(&self, cursor: &mut dyn Cursor) -> Result<MessageRecord> {
        Ok(MessageRecord::new(
            read(cursor, self.address)?,
            read(cursor, self.body)?,
            read(cursor, self.date)?,
            read(cursor, self.kind)?,
        ))
    }
}

fn read(cursor: &mut dyn Cursor, column: Option<usize>) -> Result<Option<String>> {
    match column {
        Some(index) => cursor.get_string(index),
        None => Ok(None),
    }
}

/// Read every inbox message, newest first.
///
/// An unreachable store is reported as an empty inbox, not as an error.
/// Only a fault while iterating an open cursor is returned as `Err`, and the
/// cursor is released before the error propagates.
#[instrument(skip_all, fields(context = %context.describe()))]
pub fn list_messages<C: ExecutionContext + ?Sized>(context: &C) -> Result<Vec<MessageRecord>> {
    let query = StoreQuery::inbox();

    let mut cursor = match context.query(&query) {
        Ok(Some(cursor)) => cursor,
        Ok(None) => {
            warn!("store returned no cursor; reporting an empty inbox");
            return Ok(Vec::new());
        }
        Err(e) => {
            warn!(error = %e, "store unavailable; reporting an empty inbox");
            return Ok(Vec::new());
        }
    };

    let columns = Columns::resolve(&*cursor);
    let mut records = Vec::new();
    while cursor.move_to_next()? {
        records.push(columns.read_row(&mut *cursor)?);
    }

    debug!(count = records.len(), "inbox query complete");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use smsbridge_core::error::SmsBridgeError;

    use super::*;

    type Row = Vec<Option<&'static str>>;

    /// In-memory store whose cursor records when it is released.
    struct FakeContext {
        columns: Vec<&'static str>,
        rows: Vec<Row>,
        mode: Mode,
        closed: Rc<Cell<usize>>,
    }

    #[derive(Clone, Copy)]
    enum Mode {
        Normal,
        NoCursor,
        Unreachable,
        FailAtRow(usize),
    }

    impl FakeContext {
        fn new(columns: Vec<&'static str>, rows: Vec<Row>) -> Self {
            Self {
                columns,
                rows,
                mode: Mode::Normal,
                closed: Rc::new(Cell::new(0)),
            }
        }

        fn with_mode(mut self, mode: Mode) -> Self {
            self.mode = mode;
            self
        }
    }

    struct FakeCursor<'a> {
        context: &'a FakeContext,
        position: Option<usize>,
    }

    impl ExecutionContext for FakeContext {
        fn query(&self, query: &StoreQuery) -> Result<Option<Box<dyn Cursor + '_>>> {
            assert_eq!(query, &StoreQuery::inbox());
            match self.mode {
                Mode::NoCursor => Ok(None),
                Mode::Unreachable => Err(SmsBridgeError::StoreUnavailable("offline".into())),
                _ => Ok(Some(Box::new(FakeCursor {
                    context: self,
                    position: None,
                }))),
            }
        }

        fn describe(&self) -> String {
            "fake".into()
        }
    }

    impl Cursor for FakeCursor<'_> {
        fn column_index(&self, name: &str) -> Option<usize> {
            self.context.columns.iter().position(|c| *c == name)
        }

        fn move_to_next(&mut self) -> Result<bool> {
            let next = self.position.map_or(0, |p| p + 1);
            if let Mode::FailAtRow(n) = self.context.mode {
                if next == n {
                    return Err(SmsBridgeError::Cursor("row unreadable".into()));
                }
            }
            self.position = Some(next);
            Ok(next < self.context.rows.len())
        }

        fn get_string(&mut self, column: usize) -> Result<Option<String>> {
            let row = self.position.expect("cursor positioned on a row");
            Ok(self.context.rows[row][column].map(str::to_owned))
        }
    }

    impl Drop for FakeCursor<'_> {
        fn drop(&mut self) {
            self.context.closed.set(self.context.closed.get() + 1);
        }
    }

    fn standard_columns() -> Vec<&'static str> {
        vec!["address", "body", "date", "type"]
    }

    #[test]
    fn two_row_inbox_keeps_store_order_and_nulls() {
        let context = FakeContext::new(
            standard_columns(),
            vec![
                vec![Some("A"), Some("hi"), Some("200"), Some("1")],
                vec![None, Some("bye"), Some("100"), Some("2")],
            ],
        );

        let records = list_messages(&context).unwrap();
        assert_eq!(
            records,
            vec![
                MessageRecord::new(Some("A".into()), Some("hi".into()), Some("200".into()), Some("1".into())),
                MessageRecord::new(None, Some("bye".into()), Some("100".into()), Some("2".into())),
            ]
        );
        assert_eq!(context.closed.get(), 1);
    }

    #[test]
    fn columns_are_resolved_by_name_not_position() {
        let context = FakeContext::new(
            vec!["type", "date", "body", "address"],
            vec![vec![Some("1"), Some("200"), Some("hi"), Some("A")]],
        );

        let records = list_messages(&context).unwrap();
        assert_eq!(records[0].address.as_deref(), Some("A"));
        assert_eq!(records[0].body.as_deref(), Some("hi"));
        assert_eq!(records[0].date.as_deref(), Some("200"));
        assert_eq!(records[0].kind.as_deref(), Some("1"));
    }

    #[test]
    fn missing_column_yields_absent_field() {
        let context = FakeContext::new(
            vec!["address", "body", "date"],
            vec![vec![Some("A"), Some("hi"), Some("200")]],
        );

        let records = list_messages(&context).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, None);
    }

    #[test]
    fn duplicates_are_kept() {
        let row = vec![Some("A"), Some("same"), Some("100"), Some("1")];
        let context = FakeContext::new(standard_columns(), vec![row.clone(), row]);

        let records = list_messages(&context).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn empty_store_is_empty_sequence() {
        let context = FakeContext::new(standard_columns(), Vec::new());
        assert!(list_messages(&context).unwrap().is_empty());
        assert_eq!(context.closed.get(), 1);
    }

    #[test]
    fn missing_cursor_is_empty_sequence() {
        let context = FakeContext::new(standard_columns(), Vec::new()).with_mode(Mode::NoCursor);
        assert!(list_messages(&context).unwrap().is_empty());
    }

    #[test]
    fn unreachable_store_is_empty_sequence() {
        let context = FakeContext::new(
            standard_columns(),
            vec![vec![Some("A"), Some("hi"), Some("200"), Some("1")]],
        )
        .with_mode(Mode::Unreachable);
        assert!(list_messages(&context).unwrap().is_empty());
        assert_eq!(context.closed.get(), 0);
    }

    #[test]
    fn iteration_fault_releases_cursor_and_propagates() {
        let context = FakeContext::new(
            standard_columns(),
            vec![
                vec![Some("A"), Some("hi"), Some("200"), Some("1")],
                vec![Some("B"), Some("yo"), Some("100"), Some("1")],
            ],
        )
        .with_mode(Mode::FailAtRow(1));

        let err = list_messages(&context).unwrap_err();
        assert!(matches!(err, SmsBridgeError::Cursor(_)));
        assert_eq!(context.closed.get(), 1);
    }

    #[test]
    fn each_call_opens_and_closes_its_own_cursor() {
        let context = FakeContext::new(
            standard_columns(),
            vec![vec![Some("A"), Some("hi"), Some("200"), Some("1")]],
        );
        list_messages(&context).unwrap();
        list_messages(&context).unwrap();
        assert_eq!(context.closed.get(), 2);
    }
}
