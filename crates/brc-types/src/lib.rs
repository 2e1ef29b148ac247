//! Foundation types for the BRC store daemon.
//!
//! Every other `brc-*` crate depends on `brc-types`.
//!
//! # Key Types
//!
//! - [`Uid`] — Client-supplied record identifier, whitespace-normalized
//! - [`TypeError`] — Validation failures for the types in this crate

pub mod error;
pub mod uid;

pub use error::TypeError;
pub use uid::Uid;
