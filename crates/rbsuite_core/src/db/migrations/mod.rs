//! Project store schema history.
//!
//! - v1 `projects`: project rows with their team, ordered tasks and ordered
//!   QA checklist. Status and task enums are pinned by CHECK constraints.
//! - v2 `status_history`: append-only log of committed status changes,
//!   written in the same transaction as the status compare-and-swap.
//!
//! A database whose `user_version` is ahead of this build is refused, so an
//! older binary never writes statuses it cannot interpret.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "projects",
        sql: include_str!("0001_projects.sql"),
    },
    Migration {
        version: 2,
        name: "status_history",
        sql: include_str!("0002_status_history.sql"),
    },
];

/// Schema version a freshly opened store ends up at.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the store from its `user_version` up to `latest_version()`.
///
/// Pending steps share one transaction: a failing step leaves the store at
/// its previous version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored = stored_version(conn)?;
    let latest = latest_version();

    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > stored)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    for migration in pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(())
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
