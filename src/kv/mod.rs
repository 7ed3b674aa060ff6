//! Key-value substrate for the capsule store
//!
//! The store only ever needs string keys and string values, so the
//! substrate is kept to `get`/`set`/`remove` plus an availability probe.
//! Two backends are provided:
//! - [`MemoryStore`] for tests and ephemeral sessions
//! - [`FileStore`] for durable storage under a data directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Quota exceeded writing {key}: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { key: String, needed: u64, limit: u64 },
}

pub type Result<T> = std::result::Result<T, KvError>;

/// A synchronous, string-keyed, string-valued store
pub trait KeyValueStore {
    /// Whether the substrate can be used at all
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Check that replacing `previous` bytes with `incoming` bytes keeps `used` under `limit`
fn check_quota(key: &str, used: u64, previous: u64, incoming: u64, limit: Option<u64>) -> Result<()> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let needed = used.saturating_sub(previous) + incoming;
    if needed > limit {
        return Err(KvError::QuotaExceeded {
            key: key.to_string(),
            needed,
            limit,
        });
    }
    Ok(())
}
