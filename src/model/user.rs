use async_trait::async_trait;
use serde::Serialize;

use super::Model;
use crate::storage::{Database, Row, SqlValue, StorageError};

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (\
    id INTEGER PRIMARY KEY AUTOINCREMENT, \
    username TEXT NOT NULL, \
    email TEXT NOT NULL)";

const INSERT_USER: &str = "INSERT INTO users (username, email) VALUES (?, ?)";

const SELECT_LATEST_USER: &str =
    "SELECT id, username, email FROM users ORDER BY id DESC LIMIT 1";

/// A user submitted through the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct User {
    /// Assigned by storage on the first successful save
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Create the `users` table if it does not exist yet
    pub async fn create_table(db: &dyn Database) -> Result<(), StorageError> {
        db.exec(CREATE_USERS_TABLE, &[]).await?;
        Ok(())
    }

    /// The most recently saved user, if any row exists
    pub async fn latest(db: &dyn Database) -> Result<Option<Self>, StorageError> {
        let rows = db.query(SELECT_LATEST_USER, &[]).await?;
        Ok(rows.first().and_then(Self::from_row))
    }

    fn from_row(row: &Row) -> Option<Self> {
        let text = |name: &str| match row.get(name) {
            Some(SqlValue::Text(value)) => Some(value.clone()),
            _ => None,
        };
        let id = match row.get("id") {
            Some(SqlValue::Integer(id)) => Some(*id),
            _ => None,
        };

        Some(Self {
            id,
            username: text("username")?,
            email: text("email")?,
        })
    }
}

#[async_trait]
impl Model for User {
    /// Insert one row. Not deduplicated: saving twice writes two rows.
    async fn save(&mut self, db: &dyn Database) -> Result<(), StorageError> {
        let result = db
            .exec(
                INSERT_USER,
                &[self.username.as_str().into(), self.email.as_str().into()],
            )
            .await?;
        self.id = result.last_insert_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryDatabase;

    #[tokio::test]
    async fn test_save_assigns_id() {
        let db = MemoryDatabase::new();
        let mut user = User::new("alice", "alice@example.com");
        assert_eq!(user.id, None);

        user.save(&db).await.unwrap();

        assert_eq!(user.id, Some(1));
        assert_eq!(
            db.rows(),
            vec![(
                1,
                vec![SqlValue::from("alice"), SqlValue::from("alice@example.com")]
            )]
        );
    }

    #[tokio::test]
    async fn test_save_failure_leaves_id_unset() {
        let db = MemoryDatabase::failing();
        let mut user = User::new("alice", "alice@example.com");

        assert!(user.save(&db).await.is_err());
        assert_eq!(user.id, None);
        assert!(db.rows().is_empty());
    }

    #[tokio::test]
    async fn test_save_twice_inserts_two_rows() {
        let db = MemoryDatabase::new();
        let mut user = User::new("alice", "alice@example.com");

        user.save(&db).await.unwrap();
        user.save(&db).await.unwrap();

        assert_eq!(user.id, Some(2));
        assert_eq!(db.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_values_travel_as_arguments() {
        let db = MemoryDatabase::new();
        let inputs = [
            ("alice", "alice@example.com"),
            ("bob'); DROP TABLE users; --", "bob@example.com"),
            ("", ""),
        ];

        for (username, email) in inputs {
            User::new(username, email).save(&db).await.unwrap();
        }

        let statements = db.statements();
        assert_eq!(statements.len(), inputs.len());
        for (statement, (username, email)) in statements.iter().zip(inputs) {
            assert_eq!(statement.sql, INSERT_USER);
            assert_eq!(
                statement.args,
                vec![SqlValue::from(username), SqlValue::from(email)]
            );
        }
    }

    #[tokio::test]
    async fn test_create_table_is_constant_ddl() {
        let db = MemoryDatabase::new();
        User::create_table(&db).await.unwrap();

        let statements = db.statements();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].sql.starts_with("CREATE TABLE IF NOT EXISTS users"));
        assert!(statements[0].args.is_empty());
    }

    #[tokio::test]
    async fn test_latest_reads_without_writing() {
        let db = MemoryDatabase::with_query_rows(vec![Row::new(vec![
            ("id".to_string(), SqlValue::Integer(4)),
            ("username".to_string(), SqlValue::from("alice")),
            ("email".to_string(), SqlValue::from("alice@example.com")),
        ])]);

        let user = User::latest(&db).await.unwrap();

        assert_eq!(
            user,
            Some(User {
                id: Some(4),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            })
        );
        assert_eq!(db.statements()[0].sql, SELECT_LATEST_USER);
        assert!(db.rows().is_empty());
    }

    #[tokio::test]
    async fn test_latest_on_empty_table() {
        let db = MemoryDatabase::new();
        assert_eq!(User::latest(&db).await.unwrap(), None);
    }
}
