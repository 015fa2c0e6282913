use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ActiveValue, ConnectionTrait, DatabaseConnection, EntityTrait, TransactionTrait};
use tokio::sync::Mutex;
use tracing::warn;

use crate::connection::connect_and_migrate;
use crate::entities::{local_kv, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyChange {
    Set { key: String, value: String },
    Remove { key: String },
}

impl KeyChange {
    pub fn set(key: &str, value: impl Into<String>) -> Self {
        Self::Set {
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn remove(key: &str) -> Self {
        Self::Remove {
            key: key.to_string(),
        }
    }
}

/// Durable string storage keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;

    /// Applies every change or none of them.
    async fn apply(&self, changes: Vec<KeyChange>) -> Result<()>;
}

pub struct SqliteKeyValueStore {
    db: DatabaseConnection,
}

impl SqliteKeyValueStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let model = LocalKv::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(model.map(|m| m.payload))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        upsert(&self.db, key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        LocalKv::delete_by_id(key.to_string()).exec(&self.db).await?;
        Ok(())
    }

    async fn apply(&self, changes: Vec<KeyChange>) -> Result<()> {
        // Dropping the transaction on an early return rolls it back.
        let txn = self.db.begin().await?;
        for change in changes {
            match change {
                KeyChange::Set { key, value } => upsert(&txn, &key, &value).await?,
                KeyChange::Remove { key } => {
                    LocalKv::delete_by_id(key).exec(&txn).await?;
                }
            }
        }
        txn.commit().await?;
        Ok(())
    }
}

async fn upsert<C: ConnectionTrait>(db: &C, key: &str, value: &str) -> Result<()> {
    let now = chrono::Utc::now().into();
    let existing = LocalKv::find_by_id(key.to_string()).one(db).await?;

    let model = local_kv::ActiveModel {
        storage_key: match existing {
            Some(_) => ActiveValue::Unchanged(key.to_string()),
            None => ActiveValue::Set(key.to_string()),
        },
        payload: ActiveValue::Set(value.to_string()),
        updated_at: ActiveValue::Set(now),
    };

    if existing.is_some() {
        LocalKv::update(model).exec(db).await?;
    } else {
        LocalKv::insert(model).exec(db).await?;
    }
    Ok(())
}

/// Process-local store, for tests and for running without a database file.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn apply(&self, changes: Vec<KeyChange>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        for change in changes {
            match change {
                KeyChange::Set { key, value } => {
                    entries.insert(key, value);
                }
                KeyChange::Remove { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// The stats database when it opens, otherwise an in-memory store that lasts
/// for this run only.
pub enum LocalStore {
    Sqlite(SqliteKeyValueStore),
    Memory(MemoryKeyValueStore),
}

impl LocalStore {
    pub async fn open(database_url: &str) -> Self {
        match connect_and_migrate(database_url).await {
            Ok(db) => Self::Sqlite(SqliteKeyValueStore::new(db)),
            Err(e) => {
                warn!(
                    "Local stats database {} unavailable, keeping stats in memory: {}",
                    database_url, e
                );
                Self::Memory(MemoryKeyValueStore::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Sqlite(_))
    }

    fn inner(&self) -> &dyn KeyValueStore {
        match self {
            Self::Sqlite(store) => store,
            Self::Memory(store) => store,
        }
    }
}

#[async_trait]
impl KeyValueStore for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner().get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner().set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner().remove(key).await
    }

    async fn apply(&self, changes: Vec<KeyChange>) -> Result<()> {
        self.inner().apply(changes).await
    }
}
