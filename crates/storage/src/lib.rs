#![forbid(unsafe_code)]

pub mod keys;
pub mod progress_store;
pub mod repository;
pub mod sqlite;

pub use keys::StorageKey;
pub use progress_store::ProgressStore;
