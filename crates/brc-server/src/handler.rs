//! Per-connection request handling.
//!
//! A connection carries exactly one request and walks
//! `AwaitCommand -> ReadPath | WritePath -> Closed`. Every failure ends the
//! connection without a reply and is logged here; nothing escapes to the
//! listener.

use std::fmt;
use std::sync::Arc;

use brc_protocol::{BrcCodec, Command, Limits};
use brc_store::{BlobStore, StoreResult};
use brc_types::Uid;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::config::DEFAULT_READ_BUFFER_SIZE;
use crate::error::{ServerError, ServerResult};
use crate::server::SharedStore;

/// Per-connection settings derived from [`ServerConfig`](crate::ServerConfig).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandlerConfig {
    pub limits: Limits,
    pub read_buffer_size: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Connection state machine.
#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitCommand,
    ReadPath(Uid),
    WritePath(Uid),
    /// Terminal.
    Closed(Outcome),
}

/// What a successfully handled request did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// `size` is `None` when there was no record.
    Read { uid: Uid, size: Option<usize> },
    Written { uid: Uid, size: usize },
}

/// How far a request got, for error logs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub command: Option<Command>,
    pub uid: Option<Uid>,
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.command {
            Some(command) => write!(f, "{command}")?,
            None => write!(f, "(no command)")?,
        }
        if let Some(uid) = &self.uid {
            write!(f, " uid={uid}")?;
        }
        Ok(())
    }
}

/// Serve one connection to completion.
///
/// Always reaches `Closed`: the stream is shut down and dropped on every
/// path, and errors are logged rather than returned.
pub async fn serve_connection<S>(
    stream: S,
    store: SharedStore,
    config: HandlerConfig,
) -> Option<Outcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::with_capacity(config.read_buffer_size, stream);
    let mut ctx = RequestContext::default();

    let outcome = match handle_request(&mut stream, &store, &config, &mut ctx).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!(request = %ctx, error = %e, "handle_request failed");
            None
        }
    };

    if let Err(e) = stream.get_mut().shutdown().await {
        debug!(request = %ctx, error = %e, "shutdown after request");
    }
    outcome
}

/// Drive the state machine for a single request.
pub async fn handle_request<S>(
    stream: &mut BufReader<S>,
    store: &SharedStore,
    config: &HandlerConfig,
    ctx: &mut RequestContext,
) -> ServerResult<Outcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut state = ConnectionState::AwaitCommand;
    loop {
        state = match state {
            ConnectionState::AwaitCommand => {
                let command = BrcCodec::read_command(stream).await?;
                ctx.command = Some(command);
                let uid = BrcCodec::read_uid(stream, config.limits.max_uid_len).await?;
                ctx.uid = Some(uid.clone());
                match command {
                    Command::Read => ConnectionState::ReadPath(uid),
                    Command::Write => ConnectionState::WritePath(uid),
                }
            }
            ConnectionState::ReadPath(uid) => {
                let key = uid.clone();
                let blob = run_store(store, move |s| s.get(&key)).await?;
                let response = BrcCodec::encode_read_response(blob.as_deref())?;
                stream.write_all(&response).await?;
                stream.flush().await?;

                let size = blob.as_ref().map(Vec::len);
                match size {
                    Some(size) => info!(%uid, size, "read"),
                    None => info!(%uid, "read: not found"),
                }
                ConnectionState::Closed(Outcome::Read { uid, size })
            }
            ConnectionState::WritePath(uid) => {
                let blob = BrcCodec::read_blob(stream, config.limits.max_blob_size).await?;
                let size = blob.len();
                let key = uid.clone();
                run_store(store, move |s| s.put(&key, &blob)).await?;
                info!(%uid, size, "write");
                ConnectionState::Closed(Outcome::Written { uid, size })
            }
            ConnectionState::Closed(outcome) => return Ok(outcome),
        };
    }
}

/// Run a store call on the blocking pool so disk I/O never stalls the
/// scheduler thread.
async fn run_store<T, F>(store: &SharedStore, op: F) -> ServerResult<T>
where
    F: FnOnce(&dyn BlobStore) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    let result = tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| ServerError::StoreTask(e.to_string()))?;
    Ok(result?)
}
