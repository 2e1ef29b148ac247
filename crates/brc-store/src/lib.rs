//! Record storage for the BRC store daemon.
//!
//! A store is a flat mapping from [`Uid`](brc_types::Uid) to an opaque blob.
//! It never interprets the blob and attaches no metadata to it.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`RedbBlobStore`] -- durable, ordered store backed by `redb`
//! - [`InMemoryBlobStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. A missing key is `Ok(None)`, never an error.
//! 2. `put` replaces the whole value; readers see the old value or the new
//!    one, never a mix.
//! 3. Last writer wins. There is no per-key sequencing beyond what the
//!    backend's own write lock gives.
//! 4. Engine tuning is fixed when the store is opened.

pub mod config;
pub mod error;
pub mod memory;
pub mod redb_store;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{Durability, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBlobStore;
pub use redb_store::RedbBlobStore;
pub use traits::BlobStore;
