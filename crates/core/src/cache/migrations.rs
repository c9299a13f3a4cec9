//! Database schema migrations.
//!
//! Uses a simple version table approach to track applied migrations.
//! The table name is configurable, so each migration is a SQL template whose
//! `{table}` placeholder is filled in before execution, and versions are
//! tracked per table.

use super::Error;
use tokio_rusqlite::{Connection, params, rusqlite};

/// Migration list: (version, SQL template).
///
/// Migrations must be applied in order. All migrations are idempotent
/// using CREATE IF NOT EXISTS.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_cache_entries.sql"))];

/// Apply pending migrations for `table` on a blocking connection.
///
/// # Errors
///
/// Returns an error if a migration SQL fails to execute.
pub fn apply(conn: &rusqlite::Connection, table: &str) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _sqlcache_migrations (
            table_name TEXT NOT NULL,
            version INTEGER NOT NULL,
            applied_at TEXT NOT NULL,
            PRIMARY KEY (table_name, version)
        )",
        [],
    )
    .map_err(Error::from)?;

    let current: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM _sqlcache_migrations WHERE table_name = ?1",
            params![table],
            |row| row.get(0),
        )
        .map_err(Error::from)?;

    for (version, template) in MIGRATIONS {
        if *version > current {
            let sql = template.replace("{table}", table);
            conn.execute_batch(&sql)
                .map_err(|e| Error::MigrationFailed(format!("{table} v{version}: {e}")))?;
            conn.execute(
                "INSERT INTO _sqlcache_migrations (table_name, version, applied_at) VALUES (?1, ?2, ?3)",
                params![table, version, chrono::Utc::now().to_rfc3339()],
            )
            .map_err(Error::from)?;
            tracing::debug!(table, version, "Applied cache migration");
        }
    }

    Ok(())
}

/// Run any pending migrations for `table` on an async connection.
pub async fn run(conn: &Connection, table: &str) -> Result<(), Error> {
    let table = table.to_string();
    conn.call(move |conn| -> Result<(), Error> { apply(conn, &table) })
        .await
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_exists(conn: &Connection, name: &'static str) -> bool {
        conn.call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                params![name],
                |row| row.get(0),
            )
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn, "cache_entries").await.unwrap();
        run(&conn, "cache_entries").await.unwrap();

        assert!(table_exists(&conn, "cache_entries").await);
    }

    #[tokio::test]
    async fn test_migrations_version_tracking_per_table() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn, "cache_entries").await.unwrap();
        run(&conn, "sessions").await.unwrap();

        let count: i64 = conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM _sqlcache_migrations", [], |row| row.get(0)))
            .await
            .unwrap();

        assert_eq!(count, 2 * MIGRATIONS.len() as i64);
        assert!(table_exists(&conn, "sessions").await);
    }

    #[tokio::test]
    async fn test_expires_at_index_created() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn, "cache_entries").await.unwrap();

        let has_index: bool = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='index' AND name='idx_cache_entries_expires_at')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert!(has_index);
    }

    #[test]
    fn test_keyword_table_name_migrates() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        apply(&conn, "order").unwrap();
        apply(&conn, "order").unwrap();

        let indexed: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='index' AND name='idx_order_expires_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(indexed);
    }

    #[test]
    fn test_apply_blocking() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        apply(&conn, "cache_entries").unwrap();
        apply(&conn, "cache_entries").unwrap();

        let current: i64 = conn
            .query_row("SELECT MAX(version) FROM _sqlcache_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(current, MIGRATIONS.len() as i64);
    }
}
