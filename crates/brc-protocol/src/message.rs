use std::fmt;

use brc_types::Uid;

use crate::error::{ProtocolError, ProtocolResult};

/// Width of every length field on the wire.
pub const LENGTH_SIZE: usize = 4;
/// Read-response length meaning "no record for this UID".
pub const ABSENT_LENGTH: i32 = -1;
/// Longest UID line accepted, terminator included.
pub const DEFAULT_MAX_UID_LEN: usize = 4096;
/// Largest blob a write may declare.
pub const DEFAULT_MAX_BLOB_SIZE: usize = 64 * 1024 * 1024;

/// Request command byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Read,
    Write,
}

impl Command {
    pub const READ_BYTE: u8 = b'r';
    pub const WRITE_BYTE: u8 = b'w';

    pub fn from_byte(byte: u8) -> ProtocolResult<Self> {
        match byte {
            Self::READ_BYTE => Ok(Self::Read),
            Self::WRITE_BYTE => Ok(Self::Write),
            other => Err(ProtocolError::UnknownCommand(other)),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Read => Self::READ_BYTE,
            Self::Write => Self::WRITE_BYTE,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// A fully decoded request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Read { uid: Uid },
    Write { uid: Uid, blob: Vec<u8> },
}

impl Request {
    pub fn command(&self) -> Command {
        match self {
            Self::Read { .. } => Command::Read,
            Self::Write { .. } => Command::Write,
        }
    }

    pub fn uid(&self) -> &Uid {
        match self {
            Self::Read { uid } | Self::Write { uid, .. } => uid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes() {
        assert_eq!(Command::from_byte(b'r').unwrap(), Command::Read);
        assert_eq!(Command::from_byte(b'w').unwrap(), Command::Write);
        assert_eq!(Command::Read.as_byte(), b'r');
        assert_eq!(Command::Write.as_byte(), b'w');
    }

    #[test]
    fn unknown_command_byte() {
        let err = Command::from_byte(b'X').unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownCommand(0x58)));
        assert_eq!(err.to_string(), "unknown request: 0x58");
    }

    #[test]
    fn command_is_case_sensitive() {
        assert!(Command::from_byte(b'R').is_err());
        assert!(Command::from_byte(b'W').is_err());
    }

    #[test]
    fn request_accessors() {
        let uid = Uid::new("alice").unwrap();
        let req = Request::Write { uid: uid.clone(), blob: b"x".to_vec() };
        assert_eq!(req.command(), Command::Write);
        assert_eq!(req.uid(), &uid);
        assert_eq!(Request::Read { uid }.command().to_string(), "read");
    }
}
