//! Schema migration registry and executor.
//!
//! # Responsibility
//! - Register schema migration steps in strictly increasing version order.
//! - Apply pending steps atomically, one transaction per step.
//!
//! # Invariants
//! - `version` values must remain monotonic; steps only add tables, columns,
//!   indexes, or seed rows — they never delete or narrow data.
//! - The recorded version in `db_meta` is written inside the same transaction
//!   as the step it belongs to.
//! - Steps are idempotent under partial application: "duplicate column name"
//!   from a legacy out-of-band patch counts as success.

use crate::db::{DbError, DbResult};
use crate::model::group::DEFAULT_GROUP_COLOR;
use log::info;
use rusqlite::{Connection, Transaction};
use uuid::Uuid;

const CREATE_META_SQL: &str = "CREATE TABLE IF NOT EXISTS db_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

const VERSION_KEY: &str = "version";

/// Groups seeded into an empty store at first install.
const DEFAULT_GROUPS: &[(&str, &str)] = &[
    ("Work", DEFAULT_GROUP_COLOR),
    ("Personal", "#10b981"),
    ("Study", "#f59e0b"),
];

type MigrationStep = fn(&Transaction<'_>) -> DbResult<()>;

struct Migration {
    version: u32,
    name: &'static str,
    apply: MigrationStep,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        apply: apply_initial_schema,
    },
    Migration {
        version: 2,
        name: "soft_delete",
        apply: apply_soft_delete,
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the store to the latest schema version. Idempotent; safe to call on
/// every process start.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    // The meta table itself is the only statement that runs unconditionally.
    conn.execute_batch(CREATE_META_SQL)?;

    let current_version = read_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        info!("event=schema_check module=db status=ok version={current_version}");
        return Ok(());
    }

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        let tx = conn.transaction()?;
        (migration.apply)(&tx)?;
        tx.execute(
            "INSERT OR REPLACE INTO db_meta (key, value) VALUES (?1, ?2);",
            (VERSION_KEY, migration.version.to_string()),
        )?;
        tx.commit()?;

        info!(
            "event=schema_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }

    Ok(())
}

fn read_version(conn: &Connection) -> DbResult<u32> {
    let mut stmt = conn.prepare("SELECT value FROM db_meta WHERE key = ?1;")?;
    let mut rows = stmt.query([VERSION_KEY])?;

    if let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        return value
            .trim()
            .parse::<u32>()
            .map_err(|_| DbError::CorruptSchemaVersion(value));
    }

    Ok(0)
}

fn apply_initial_schema(tx: &Transaction<'_>) -> DbResult<()> {
    tx.execute_batch(include_str!("0001_init.sql"))?;
    seed_default_groups(tx)
}

/// Seeds the default groups only into a store that has none, so an upgrade of
/// a populated legacy database never re-applies them.
fn seed_default_groups(tx: &Transaction<'_>) -> DbResult<()> {
    let group_count: i64 = tx.query_row("SELECT COUNT(*) FROM groups;", [], |row| row.get(0))?;
    if group_count > 0 {
        return Ok(());
    }

    let mut stmt = tx.prepare(
        "INSERT INTO groups (id, name, color, sort_order) VALUES (?1, ?2, ?3, ?4);",
    )?;
    for (sort_order, (name, color)) in DEFAULT_GROUPS.iter().enumerate() {
        stmt.execute((
            Uuid::new_v4().to_string(),
            name,
            color,
            sort_order as i64,
        ))?;
    }

    info!(
        "event=schema_seed module=db status=ok groups={}",
        DEFAULT_GROUPS.len()
    );
    Ok(())
}

fn apply_soft_delete(tx: &Transaction<'_>) -> DbResult<()> {
    add_column_if_missing(tx, "ALTER TABLE todos ADD COLUMN deleted_at TEXT;")?;
    add_column_if_missing(tx, "ALTER TABLE groups ADD COLUMN deleted_at TEXT;")?;
    Ok(())
}

fn add_column_if_missing(tx: &Transaction<'_>, alter_sql: &str) -> DbResult<()> {
    match tx.execute_batch(alter_sql) {
        Ok(()) => Ok(()),
        Err(err) if is_duplicate_column_error(&err) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn is_duplicate_column_error(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(message))
            if message.contains("duplicate column name")
    )
}
