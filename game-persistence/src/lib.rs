pub mod connection;
pub mod entities;
pub mod repositories;

pub use connection::{connect_and_migrate, connect_to_database, connect_to_memory_database};
pub use repositories::{
    KeyChange, KeyValueStore, LocalStatsRepository, LocalStore, MemoryKeyValueStore,
    SqliteKeyValueStore,
};
