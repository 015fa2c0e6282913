pub mod key_value_store;
pub mod local_stats_repository;

pub use key_value_store::{
    KeyChange, KeyValueStore, LocalStore, MemoryKeyValueStore, SqliteKeyValueStore,
};
pub use local_stats_repository::{
    BEST_STREAK_KEY, LocalStatsRepository, RECENT_RESULTS_KEY, STREAK_KEY,
};
