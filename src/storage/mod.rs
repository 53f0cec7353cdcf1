//! Storage gateway module
//!
//! Narrow read/write capability over a relational store. Handlers and models
//! depend only on the [`Database`] trait; the process wires in [`SqlGateway`].
//!
//! Callers pass user-supplied values as positional arguments only. The SQL
//! text handed to [`Database::query`] and [`Database::exec`] is always a
//! constant at the call site.

mod sqlite;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

pub use sqlite::SqlGateway;

/// A positional argument or a single result cell
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One row of a result set, columns kept in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new(columns: Vec<(String, SqlValue)>) -> Self {
        Self { columns }
    }

    /// Look up a cell by column name
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }
}

/// Outcome of a write statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Storage-assigned key, present only for inserts that wrote a row
    pub last_insert_id: Option<i64>,
}

/// Errors surfaced by the storage gateway
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Connectivity failure, constraint violation, closed pool
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("unsupported type `{type_name}` in column `{column}`")]
    UnsupportedType { column: String, type_name: String },
}

/// Relational read/write capability
#[async_trait]
pub trait Database: Send + Sync {
    /// Run a read statement and return the full result set
    async fn query(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>, StorageError>;

    /// Run a write statement
    async fn exec(&self, sql: &str, args: &[SqlValue]) -> Result<ExecResult, StorageError>;
}

/// Whether a statement adds rows, judged by its leading keyword (`INSERT` or
/// `REPLACE`, any case).
///
/// Only the first keyword is read, so a `WITH ... INSERT` statement is not
/// detected and reports no insert id. The SQLite rowid cannot stand in here:
/// it keeps the connection's previous value across later statements.
pub(crate) fn is_insert(sql: &str) -> bool {
    sql.split_whitespace().next().is_some_and(|keyword| {
        keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_insert() {
        assert!(is_insert("INSERT INTO users (username) VALUES (?)"));
        assert!(is_insert("  insert into users default values"));
        assert!(is_insert("REPLACE INTO users (id, username) VALUES (?, ?)"));
        assert!(!is_insert("WITH t AS (SELECT 1) INSERT INTO users SELECT * FROM t"));
        assert!(!is_insert("INSERTED"));
        assert!(!is_insert("UPDATE users SET email = ?"));
        assert!(!is_insert("SELECT 1"));
        assert!(!is_insert("ins"));
    }

    #[test]
    fn test_sql_value_conversions() {
        assert_eq!(SqlValue::from("alice"), SqlValue::Text("alice".to_string()));
        assert_eq!(SqlValue::from(7_i64), SqlValue::Integer(7));
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(
            SqlValue::from(Some("bob".to_string())),
            SqlValue::Text("bob".to_string())
        );
    }

    #[test]
    fn test_row_get_by_name() {
        let row = Row::new(vec![
            ("id".to_string(), SqlValue::Integer(1)),
            ("username".to_string(), SqlValue::from("alice")),
        ]);
        assert_eq!(row.get("id"), Some(&SqlValue::Integer(1)));
        assert_eq!(row.get("username"), Some(&SqlValue::from("alice")));
        assert!(row.get("email").is_none());
    }
}
