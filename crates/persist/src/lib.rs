//! Persistence: small named JSON blobs.
//!
//! # Invariants
//! - Loading never fails on content that is not JSON; such values come back
//!   as a JSON string holding the raw text.
//! - A missing key is `Ok(None)`, not an error.

mod store;

pub use store::{FileStore, KvStore, MemoryStore, StoreError, load_json, save_json};
