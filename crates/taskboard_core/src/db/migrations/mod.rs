//! Ordered schema steps for the board database.
//!
//! Each step is an embedded SQL script tagged with the `user_version` it
//! produces. Pending steps run together in one transaction, so a database is
//! always at some step boundary, never between two.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "board_hierarchy",
        sql: include_str!("0001_board_hierarchy.sql"),
    },
    SchemaStep {
        version: 2,
        name: "sessions",
        sql: include_str!("0002_sessions.sql"),
    },
];

/// Highest `user_version` this build knows how to produce.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads the `user_version` stamped on `conn`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

fn pending(from: u32) -> impl Iterator<Item = &'static SchemaStep> {
    STEPS.iter().filter(move |step| step.version > from)
}

/// Brings `conn` up to `latest_version()`.
///
/// A database stamped with a newer version is rejected untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = current_user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let mut steps = pending(from).peekable();
    if steps.peek().is_none() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in steps {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=applied version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;
    Ok(())
}
