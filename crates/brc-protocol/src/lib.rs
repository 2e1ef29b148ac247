//! Wire protocol for the BRC store daemon.
//!
//! One request per TCP connection:
//!
//! ```text
//! read request:   'r' UID '\n'
//! read response:  i32 len, BYTE[len]        (len = -1: no record)
//! write request:  'w' UID '\n' i32 len, BYTE[len]
//! write response: none, the server closes the connection
//! ```
//!
//! Length fields are 4-byte big-endian signed integers.

pub mod client;
pub mod codec;
pub mod error;
pub mod message;

pub use client::BrcClient;
pub use codec::{BrcCodec, Limits};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    Command, Request, ABSENT_LENGTH, DEFAULT_MAX_BLOB_SIZE, DEFAULT_MAX_UID_LEN, LENGTH_SIZE,
};
