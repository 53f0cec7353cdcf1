//! Model module
//!
//! Records that know how to persist themselves through a [`Database`].

mod user;

use async_trait::async_trait;

use crate::storage::{Database, StorageError};

pub use user::User;

/// A record that can write itself to storage
#[async_trait]
pub trait Model {
    async fn save(&mut self, db: &dyn Database) -> Result<(), StorageError>;
}
