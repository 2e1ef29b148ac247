//! TCP server for the BRC store daemon.
//!
//! Accepts one request per connection, runs store calls on a blocking pool
//! and keeps every failure local to the connection that caused it.

pub mod config;
pub mod error;
pub mod handler;
pub mod server;

pub use config::{AdmissionPolicy, ServerConfig, DEFAULT_READ_BUFFER_SIZE};
pub use error::{ServerError, ServerResult};
pub use handler::{serve_connection, ConnectionState, HandlerConfig, Outcome, RequestContext};
pub use server::{BrcServer, SharedStore};
