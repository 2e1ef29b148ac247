use brc_types::Uid;
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt};

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{
    Command, Request, ABSENT_LENGTH, DEFAULT_MAX_BLOB_SIZE, DEFAULT_MAX_UID_LEN, LENGTH_SIZE,
};

/// Upper bound on the buffer reserved before blob bytes arrive.
///
/// Larger blobs grow the buffer as data is actually received, so a bogus
/// length cannot force a large allocation up front.
const PREALLOC_LIMIT: usize = 1024 * 1024;

/// Size limits enforced while decoding a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Longest UID line, terminator included.
    pub max_uid_len: usize,
    /// Largest declared blob length.
    pub max_blob_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_uid_len: DEFAULT_MAX_UID_LEN,
            max_blob_size: DEFAULT_MAX_BLOB_SIZE,
        }
    }
}

/// Codec for the BRC wire format.
///
/// Decoding is incremental so the server can track how far a request got
/// when something fails.
pub struct BrcCodec;

impl BrcCodec {
    /// Read the single command byte.
    ///
    /// A peer that closes before sending anything yields
    /// [`ProtocolError::NoCommand`].
    pub async fn read_command<R>(reader: &mut R) -> ProtocolResult<Command>
    where
        R: AsyncRead + Unpin,
    {
        let mut byte = [0u8; 1];
        if reader.read(&mut byte).await? == 0 {
            return Err(ProtocolError::NoCommand);
        }
        Command::from_byte(byte[0])
    }

    /// Read the UID line.
    ///
    /// The line ends at the first `\n` or at EOF, whichever comes first.
    pub async fn read_uid<R>(reader: &mut R, max_uid_len: usize) -> ProtocolResult<Uid>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = Vec::new();
        let n = (&mut *reader)
            .take(max_uid_len as u64)
            .read_until(b'\n', &mut line)
            .await?;
        // A full line without its terminator is only too long if more follows.
        if n == max_uid_len
            && line.last() != Some(&b'\n')
            && !reader.fill_buf().await?.is_empty()
        {
            return Err(ProtocolError::UidTooLong { max: max_uid_len });
        }
        Ok(Uid::from_line(&line))
    }

    /// Read a length field followed by exactly that many blob bytes.
    ///
    /// Never returns a partial blob: a short stream is
    /// [`ProtocolError::IncompleteBlob`].
    pub async fn read_blob<R>(reader: &mut R, max_blob_size: usize) -> ProtocolResult<Vec<u8>>
    where
        R: AsyncRead + Unpin,
    {
        let len = Self::read_length(reader).await?;
        if len < 0 {
            return Err(ProtocolError::InvalidLength(len));
        }
        let expected = len as usize;
        if expected > max_blob_size {
            return Err(ProtocolError::BlobTooLarge {
                size: expected,
                max: max_blob_size,
            });
        }
        Self::read_exact_blob(reader, expected).await
    }

    /// Decode a whole request.
    pub async fn read_request<R>(reader: &mut R, limits: Limits) -> ProtocolResult<Request>
    where
        R: AsyncBufRead + Unpin,
    {
        let command = Self::read_command(reader).await?;
        let uid = Self::read_uid(reader, limits.max_uid_len).await?;
        match command {
            Command::Read => Ok(Request::Read { uid }),
            Command::Write => {
                let blob = Self::read_blob(reader, limits.max_blob_size).await?;
                Ok(Request::Write { uid, blob })
            }
        }
    }

    /// Encode the reply to a read: `-1` for no record, else length + blob.
    pub fn encode_read_response(blob: Option<&[u8]>) -> ProtocolResult<Bytes> {
        match blob {
            None => {
                let mut buf = BytesMut::with_capacity(LENGTH_SIZE);
                buf.put_i32(ABSENT_LENGTH);
                Ok(buf.freeze())
            }
            Some(blob) => {
                let len = wire_length(blob.len())?;
                let mut buf = BytesMut::with_capacity(LENGTH_SIZE + blob.len());
                buf.put_i32(len);
                buf.put_slice(blob);
                Ok(buf.freeze())
            }
        }
    }

    /// Encode a request as a client sends it.
    pub fn encode_request(request: &Request) -> ProtocolResult<Bytes> {
        match request {
            Request::Read { uid } => Ok(Self::encode_read(uid)),
            Request::Write { uid, blob } => Self::encode_write(uid, blob),
        }
    }

    pub fn encode_read(uid: &Uid) -> Bytes {
        let mut buf = BytesMut::with_capacity(uid.len() + 2);
        buf.put_u8(Command::READ_BYTE);
        buf.put_slice(uid.as_bytes());
        buf.put_u8(b'\n');
        buf.freeze()
    }

    pub fn encode_write(uid: &Uid, blob: &[u8]) -> ProtocolResult<Bytes> {
        let len = wire_length(blob.len())?;
        let mut buf = BytesMut::with_capacity(uid.len() + 2 + LENGTH_SIZE + blob.len());
        buf.put_u8(Command::WRITE_BYTE);
        buf.put_slice(uid.as_bytes());
        buf.put_u8(b'\n');
        buf.put_i32(len);
        buf.put_slice(blob);
        Ok(buf.freeze())
    }

    /// Decode a read response. `Ok(None)` means the server has no record.
    pub async fn read_response<R>(reader: &mut R) -> ProtocolResult<Option<Vec<u8>>>
    where
        R: AsyncRead + Unpin,
    {
        let len = Self::read_length(reader).await?;
        if len == ABSENT_LENGTH {
            return Ok(None);
        }
        if len < 0 {
            return Err(ProtocolError::InvalidLength(len));
        }
        Self::read_exact_blob(reader, len as usize).await.map(Some)
    }

    async fn read_length<R>(reader: &mut R) -> ProtocolResult<i32>
    where
        R: AsyncRead + Unpin,
    {
        let mut raw = [0u8; LENGTH_SIZE];
        match reader.read_exact(&mut raw).await {
            Ok(_) => Ok(i32::from_be_bytes(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(ProtocolError::TruncatedLength)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_exact_blob<R>(reader: &mut R, expected: usize) -> ProtocolResult<Vec<u8>>
    where
        R: AsyncRead + Unpin,
    {
        let mut blob = Vec::with_capacity(expected.min(PREALLOC_LIMIT));
        reader.take(expected as u64).read_to_end(&mut blob).await?;
        if blob.len() < expected {
            return Err(ProtocolError::IncompleteBlob {
                expected,
                received: blob.len(),
            });
        }
        Ok(blob)
    }
}

fn wire_length(len: usize) -> ProtocolResult<i32> {
    i32::try_from(len).map_err(|_| ProtocolError::BlobTooLarge {
        size: len,
        max: i32::MAX as usize,
    })
}
