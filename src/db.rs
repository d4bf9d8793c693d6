//! Connection provider.
//!
//! Every request opens its own connection and drops it when the request scope
//! ends; connections are never shared or cached across requests.

use std::path::Path;

use anyhow::Context;
use rusqlite::{Connection, OpenFlags};

/// Open the database file in read-write mode.
///
/// The create flag is deliberately absent: a missing file is an error, never
/// implicitly created.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

/// Startup probe: verify the database file can be opened before serving.
pub fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    open(path)
        .map(drop)
        .with_context(|| format!("{} does not exist or is not a usable database", path.display()))
}
