pub mod credential_repository;
pub mod key_value_store;
pub mod results_cache_repository;

pub use credential_repository::CredentialRepository;
pub use key_value_store::{InMemoryKeyValueStore, JsonFileKeyValueStore, KeyValueStore};
pub use results_cache_repository::{CacheEvent, PruneOutcome, PruneReport, ResultsCacheRepository};
