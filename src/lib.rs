//! HTTP gateway for a single SQLite database file.
//!
//! # Intention
//!
//! - Accept SQL statements over an authenticated HTTP API and answer with rows
//!   or a status as JSON.
//! - Contain every statement failure inside the response payload; bad SQL never
//!   crashes the process or leaks a connection.
//!
//! # Architectural Boundaries
//!
//! - The database engine is opaque: statements pass through verbatim, no
//!   parsing or rewriting happens here.
//! - One connection per request, owned by the request scope, released on every
//!   exit path.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod statement;
pub mod value;
