//! Local persistence of completed sessions
//!
//! - `KeyValueStore`: the async get/set boundary the rest of the crate uses
//! - `MemoryStore` / `FileStore`: its two implementations
//! - `RecordStore`: versioned load/save of the record collection

mod file;
mod kv;
mod records;

pub use file::FileStore;
pub use kv::{KeyValueStore, MemoryStore};
pub use records::{decode, Decoded, RecordStore, StoredCollection, STORAGE_VERSION};
