//! Local persisted state
//!
//! A small JSON key-value store holding the session token, camera address,
//! stream credentials, feature toggles and the activity history.

pub mod history;
pub mod store;

pub use history::{HistoryEntry, MAX_HISTORY_ENTRIES};
pub use store::{LocalStore, StreamCredentials, DEFAULT_SERVER_URL};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
