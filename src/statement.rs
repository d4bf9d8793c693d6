//! Read/mutation classification of submitted statements.
//!
//! This is a coarse keyword heuristic, not a parser: a statement is a read iff
//! it contains `SELECT` anywhere, case-insensitively, string literals included.

/// How a statement will be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Row-producing statement, answered with the rows it returns.
    Read,
    /// Data-changing statement, answered with a status.
    Mutation,
}

/// Classify a statement without parsing or rewriting it.
pub fn classify(sql: &str) -> StatementKind {
    if sql.to_uppercase().contains("SELECT") {
        StatementKind::Read
    } else {
        StatementKind::Mutation
    }
}
