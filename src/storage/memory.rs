//! In-memory storage double for tests
//!
//! Records every statement with its bound arguments. Inserts append the
//! arguments as a row and get the next auto-increment id; reads return a
//! fixed result set.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{is_insert, Database, ExecResult, Row, SqlValue, StorageError};

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    statements: Mutex<Vec<Statement>>,
    rows: Mutex<Vec<(i64, Vec<SqlValue>)>>,
    query_rows: Vec<Row>,
    failing: AtomicBool,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// A database whose every statement fails as if the pool were closed
    pub fn failing() -> Self {
        let db = Self::default();
        db.failing.store(true, Ordering::SeqCst);
        db
    }

    /// A database whose every read returns `rows`
    pub fn with_query_rows(rows: Vec<Row>) -> Self {
        Self {
            query_rows: rows,
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    /// Committed rows as `(id, args)` pairs
    pub fn rows(&self) -> Vec<(i64, Vec<SqlValue>)> {
        self.rows.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, args: &[SqlValue]) -> Result<(), StorageError> {
        self.statements.lock().unwrap().push(Statement {
            sql: sql.to_string(),
            args: args.to_vec(),
        });
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn query(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        self.record(sql, args)?;
        Ok(self.query_rows.clone())
    }

    async fn exec(&self, sql: &str, args: &[SqlValue]) -> Result<ExecResult, StorageError> {
        self.record(sql, args)?;
        if !is_insert(sql) {
            return Ok(ExecResult {
                rows_affected: 0,
                last_insert_id: None,
            });
        }

        let mut rows = self.rows.lock().unwrap();
        let id = rows.last().map_or(1, |(id, _)| id + 1);
        rows.push((id, args.to_vec()));
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(id),
        })
    }
}
