//! Statement execution and response shaping.
//!
//! Both executors contain every failure at this boundary: an engine error (bad
//! syntax, missing table, constraint violation) or anything else unexpected
//! becomes an [`Outcome::Error`] carrying the failure's message. Nothing
//! propagates past here, so one bad statement can never crash the process.

use rusqlite::Connection;
use serde::Serialize;

use crate::statement::{self, StatementKind};
use crate::value::{Record, Value};

/// The tagged result of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Rows returned by a read statement. An empty sequence is a valid result,
    /// distinct from an error.
    Rows(Vec<Record>),
    /// A mutating statement completed and committed.
    Status,
    /// The statement failed; the message is surfaced inside the payload.
    Error(String),
}

/// Run a read statement, materializing every row in engine order.
pub fn run_query(conn: &Connection, sql: &str) -> Outcome {
    match query_rows(conn, sql) {
        Ok(rows) => Outcome::Rows(rows),
        Err(e) => Outcome::Error(e.to_string()),
    }
}

fn query_rows(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<Record>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Record::with_capacity(columns.len());
        for (index, name) in columns.iter().enumerate() {
            record.push(name.clone(), Value::from(row.get_ref(index)?));
        }
        records.push(record);
    }
    Ok(records)
}

/// Run a mutating statement and commit it.
pub fn run_mutation(conn: &Connection, sql: &str) -> Outcome {
    match conn.execute_batch(sql) {
        Ok(()) => Outcome::Status,
        Err(e) => Outcome::Error(e.to_string()),
    }
}

/// Classify a statement and dispatch it to the matching executor.
pub fn execute_statement(conn: &Connection, sql: &str) -> Outcome {
    match statement::classify(sql) {
        StatementKind::Read => run_query(conn, sql),
        StatementKind::Mutation => run_mutation(conn, sql),
    }
}

/// The uniform response wrapper: `{"data": [...]}`.
///
/// Statement execution always answers HTTP 200; success, status, and error all
/// live inside `data`. Callers inspect the payload, not the transport status.
#[derive(Debug, Serialize, PartialEq)]
pub struct Envelope {
    data: Vec<Record>,
}

impl From<Outcome> for Envelope {
    fn from(outcome: Outcome) -> Self {
        let data = match outcome {
            Outcome::Rows(records) => records,
            Outcome::Status => {
                vec![[("status".to_string(), Value::Text("ok".to_string()))]
                    .into_iter()
                    .collect()]
            }
            Outcome::Error(message) => {
                vec![[("error".to_string(), Value::Text(message))]
                    .into_iter()
                    .collect()]
            }
        };
        Envelope { data }
    }
}
