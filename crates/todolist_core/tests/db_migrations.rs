use rusqlite::Connection;
use todolist_core::db::migrations::{ensure_schema, latest_version};
use todolist_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "db_meta");
    assert_table_exists(&conn, "groups");
    assert_table_exists(&conn, "todos");
    assert_column_exists(&conn, "todos", "deleted_at");
    assert_column_exists(&conn, "groups", "deleted_at");
    assert_column_exists(&conn, "todos", "due_date");
}

#[test]
fn fresh_store_is_seeded_with_default_groups() {
    let conn = open_db_in_memory().unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM groups;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);

    let orders: Vec<i64> = {
        let mut stmt = conn
            .prepare("SELECT sort_order FROM groups ORDER BY sort_order ASC;")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .map(Result::unwrap)
            .collect()
    };
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todolist.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());

    // The seeding step must not re-apply to an already-populated store.
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM groups;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn ensure_schema_twice_in_a_row_never_errors() {
    let mut conn = open_db_in_memory().unwrap();
    ensure_schema(&mut conn).unwrap();
    ensure_schema(&mut conn).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
}

#[test]
fn legacy_store_with_out_of_band_column_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    // A version-1 store that already received the todos.deleted_at patch out
    // of band. The soft-delete step must treat that as success and still add
    // the missing groups column.
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE db_meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);
             INSERT INTO db_meta (key, value) VALUES ('version', '1');
             CREATE TABLE groups (
                 id TEXT PRIMARY KEY,
                 name TEXT NOT NULL,
                 color TEXT NOT NULL DEFAULT '#6366f1',
                 sort_order INTEGER NOT NULL DEFAULT 0,
                 created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
                 updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
             );
             CREATE TABLE todos (
                 id TEXT PRIMARY KEY,
                 title TEXT NOT NULL,
                 description TEXT DEFAULT '',
                 group_id TEXT,
                 due_date TEXT,
                 completed INTEGER NOT NULL DEFAULT 0,
                 created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
                 completed_at TEXT,
                 updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
             );
             ALTER TABLE todos ADD COLUMN deleted_at TEXT;",
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_column_exists(&conn, "todos", "deleted_at");
    assert_column_exists(&conn, "groups", "deleted_at");
}

#[test]
fn populated_legacy_store_is_not_reseeded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("populated.db");

    // Version 0 with a pre-existing groups table holding user data: the
    // initial-schema step must leave it alone.
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE groups (
                 id TEXT PRIMARY KEY,
                 name TEXT NOT NULL,
                 color TEXT NOT NULL DEFAULT '#6366f1',
                 sort_order INTEGER NOT NULL DEFAULT 0,
                 created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
                 updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
             );
             INSERT INTO groups (id, name, color, sort_order)
             VALUES ('11111111-2222-4333-8444-555555555555', 'Inbox', '#336699', 0);",
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM groups;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    let name: String = conn
        .query_row("SELECT name FROM groups;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "Inbox");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE db_meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);
             INSERT INTO db_meta (key, value) VALUES ('version', '999');",
        )
        .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn corrupt_version_value_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.db");

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE db_meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);
             INSERT INTO db_meta (key, value) VALUES ('version', 'not-a-number');",
        )
        .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::CorruptSchemaVersion(_)));
}

fn schema_version(conn: &Connection) -> u32 {
    let value: String = conn
        .query_row(
            "SELECT value FROM db_meta WHERE key = 'version';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    value.parse().unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn assert_column_exists(conn: &Connection, table_name: &str, column_name: &str) {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table_name});"))
        .unwrap();
    let mut rows = stmt.query([]).unwrap();
    while let Some(row) = rows.next().unwrap() {
        let name: String = row.get(1).unwrap();
        if name == column_name {
            return;
        }
    }
    panic!("column {table_name}.{column_name} does not exist");
}
