//! SQLite-backed storage gateway
//!
//! Wraps a shared sqlx pool. Each statement acquires a connection from the
//! pool and hands it back when the statement finishes, on success or error.

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::time::Duration;

use super::{is_insert, Database, ExecResult, Row, SqlValue, StorageError};
use crate::config::DatabaseConfig;

/// Storage gateway over an sqlx SQLite pool
#[derive(Debug, Clone)]
pub struct SqlGateway {
    pool: SqlitePool,
}

impl SqlGateway {
    /// Open the pool described by the database configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout))
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    /// Close every pooled connection; waits for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Database for SqlGateway {
    async fn query(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        let rows = bind_args(sql, args).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn exec(&self, sql: &str, args: &[SqlValue]) -> Result<ExecResult, StorageError> {
        let result = bind_args(sql, args).execute(&self.pool).await?;
        let rows_affected = result.rows_affected();
        let last_insert_id =
            (rows_affected > 0 && is_insert(sql)).then(|| result.last_insert_rowid());
        Ok(ExecResult {
            rows_affected,
            last_insert_id,
        })
    }
}

/// Attach positional arguments to a statement, in order
fn bind_args<'q>(sql: &'q str, args: &[SqlValue]) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    args.iter().fold(sqlx::query(sql), |query, arg| match arg {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Integer(v) => query.bind(*v),
        SqlValue::Real(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
    })
}

fn decode_row(row: &SqliteRow) -> Result<Row, StorageError> {
    let mut columns = Vec::with_capacity(row.len());

    for (index, column) in row.columns().iter().enumerate() {
        let (is_null, type_name) = {
            let raw = row.try_get_raw(index)?;
            (raw.is_null(), raw.type_info().name().to_string())
        };

        let value = if is_null {
            SqlValue::Null
        } else {
            match type_name.as_str() {
                "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get_unchecked(index)?),
                "REAL" => SqlValue::Real(row.try_get_unchecked(index)?),
                "TEXT" | "DATE" | "TIME" | "DATETIME" => {
                    SqlValue::Text(row.try_get_unchecked(index)?)
                }
                _ => {
                    return Err(StorageError::UnsupportedType {
                        column: column.name().to_string(),
                        type_name,
                    })
                }
            }
        };

        columns.push((column.name().to_string(), value));
    }

    Ok(Row::new(columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_gateway() -> SqlGateway {
        // A single connection keeps every statement on the same in-memory database
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout: 5,
            create_table: true,
        };
        let gateway = SqlGateway::connect(&config).await.unwrap();
        gateway
            .exec(
                "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, username TEXT NOT NULL, email TEXT NOT NULL)",
                &[],
            )
            .await
            .unwrap();
        gateway
    }

    #[tokio::test]
    async fn test_insert_reports_assigned_ids() {
        let gateway = memory_gateway().await;
        let sql = "INSERT INTO users (username, email) VALUES (?, ?)";

        let first = gateway
            .exec(sql, &["alice".into(), "alice@example.com".into()])
            .await
            .unwrap();
        let second = gateway
            .exec(sql, &["bob".into(), "bob@example.com".into()])
            .await
            .unwrap();

        assert_eq!(first.rows_affected, 1);
        assert_eq!(first.last_insert_id, Some(1));
        assert_eq!(second.last_insert_id, Some(2));
    }

    #[tokio::test]
    async fn test_update_has_no_insert_id() {
        let gateway = memory_gateway().await;
        gateway
            .exec(
                "INSERT INTO users (username, email) VALUES (?, ?)",
                &["alice".into(), "a@example.com".into()],
            )
            .await
            .unwrap();

        let result = gateway
            .exec(
                "UPDATE users SET email = ? WHERE username = ?",
                &["b@example.com".into(), "alice".into()],
            )
            .await
            .unwrap();

        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.last_insert_id, None);
    }

    #[tokio::test]
    async fn test_query_decodes_rows() {
        let gateway = memory_gateway().await;
        gateway
            .exec(
                "INSERT INTO users (username, email) VALUES (?, ?)",
                &["alice".into(), "alice@example.com".into()],
            )
            .await
            .unwrap();

        let rows = gateway
            .query(
                "SELECT id, username, email FROM users WHERE username = ?",
                &["alice".into()],
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("id"), Some(&SqlValue::Integer(1)));
        assert_eq!(rows[0].get("username"), Some(&SqlValue::from("alice")));
        assert_eq!(
            rows[0].get("email"),
            Some(&SqlValue::from("alice@example.com"))
        );
    }

    #[tokio::test]
    async fn test_bound_values_are_not_sql() {
        let gateway = memory_gateway().await;
        let hostile = "x'); DROP TABLE users; --";
        gateway
            .exec(
                "INSERT INTO users (username, email) VALUES (?, ?)",
                &[hostile.into(), "e@example.com".into()],
            )
            .await
            .unwrap();

        let rows = gateway
            .query("SELECT username FROM users", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("username"), Some(&SqlValue::from(hostile)));
    }

    #[tokio::test]
    async fn test_constraint_violation_surfaces() {
        let gateway = memory_gateway().await;
        let result = gateway
            .exec(
                "INSERT INTO users (username, email) VALUES (?, ?)",
                &[SqlValue::Null, "e@example.com".into()],
            )
            .await;

        assert!(matches!(result, Err(StorageError::Database(_))));
        let rows = gateway.query("SELECT id FROM users", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_closed_pool_errors() {
        let gateway = memory_gateway().await;
        gateway.close().await;

        let result = gateway.query("SELECT 1", &[]).await;
        assert!(matches!(
            result,
            Err(StorageError::Database(sqlx::Error::PoolClosed))
        ));
    }
}
