use std::net::SocketAddr;

use brc_types::Uid;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::codec::BrcCodec;
use crate::error::{ProtocolError, ProtocolResult};

/// Async client for a BRC store daemon.
///
/// Opens a fresh TCP connection for every request; the protocol carries
/// exactly one request per connection.
#[derive(Clone, Debug)]
pub struct BrcClient {
    addr: SocketAddr,
}

impl BrcClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Fetch the blob stored under `uid`, or `None` if there is no record.
    pub async fn get(&self, uid: &Uid) -> ProtocolResult<Option<Vec<u8>>> {
        let mut stream = TcpStream::connect(self.addr).await?;
        stream.write_all(&BrcCodec::encode_read(uid)).await?;
        let mut reader = BufReader::new(stream);
        let blob = BrcCodec::read_response(&mut reader).await?;
        tracing::debug!(%uid, size = blob.as_ref().map(Vec::len), "get");
        Ok(blob)
    }

    /// Store `blob` under `uid`.
    ///
    /// The server sends nothing back for a write. This returns once the
    /// server has closed the connection, which it does only after the store
    /// call finished. A write the server rejected looks the same: the
    /// protocol has no error reply.
    pub async fn put(&self, uid: &Uid, blob: &[u8]) -> ProtocolResult<()> {
        let mut stream = TcpStream::connect(self.addr).await?;
        stream.write_all(&BrcCodec::encode_write(uid, blob)?).await?;
        stream.shutdown().await?;

        let mut trailing = Vec::new();
        stream.read_to_end(&mut trailing).await?;
        if !trailing.is_empty() {
            return Err(ProtocolError::TrailingData);
        }
        tracing::debug!(%uid, size = blob.len(), "put");
        Ok(())
    }
}
