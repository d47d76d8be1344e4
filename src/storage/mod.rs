//! Storage layer for qadesk - pluggable key-value persistence.
//!
//! The domain store serializes each collection to a single JSON document and
//! hands it to a `KeyValueStore`:
//! - `FileStore`: one `<key>.json` file per key in a data directory
//! - `MemoryStore`: process-local map, shared between clones (tests)
//! - `NullStore`: discards everything

mod file;
mod memory;
mod traits;

pub use file::FileStore;
pub use memory::{MemoryStore, NullStore};
pub use traits::KeyValueStore;
