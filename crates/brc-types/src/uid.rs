use std::fmt;

use crate::error::TypeError;

/// Identifier naming a stored record.
///
/// A `Uid` is an opaque byte string used verbatim as the store key. Leading
/// and trailing ASCII whitespace is stripped on construction, so `" alice "`
/// and `"alice"` address the same record. The empty UID is valid.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(Vec<u8>);

impl Uid {
    /// Build a `Uid` from a raw line read off the wire.
    ///
    /// The line terminator and surrounding whitespace are stripped. The line
    /// is expected to have been split at the first `\n`, so no newline can
    /// remain inside it.
    pub fn from_line(line: &[u8]) -> Self {
        Self(trim(line).to_vec())
    }

    /// Build a `Uid` from caller-supplied bytes, rejecting embedded newlines.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, TypeError> {
        let trimmed = trim(bytes.as_ref());
        if let Some(pos) = trimmed.iter().position(|&b| b == b'\n') {
            return Err(TypeError::EmbeddedNewline(pos));
        }
        Ok(Self(trimmed.to_vec()))
    }

    /// The key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Same set as the C locale `isspace`, which includes vertical tab.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|&b| !is_space(b))
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid(\"{}\")", self.0.escape_ascii())
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}

impl AsRef<[u8]> for Uid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&str> for Uid {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&[u8]> for Uid {
    type Error = TypeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl From<Uid> for Vec<u8> {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn surrounding_whitespace_is_stripped() {
        let padded = Uid::new(" alice ").unwrap();
        let plain = Uid::new("alice").unwrap();
        assert_eq!(padded, plain);
        assert_eq!(padded.as_bytes(), b"alice");
    }

    #[test]
    fn from_line_strips_terminator() {
        assert_eq!(Uid::from_line(b"alice\n").as_bytes(), b"alice");
        assert_eq!(Uid::from_line(b"\talice\r\n").as_bytes(), b"alice");
        assert_eq!(Uid::from_line(b"al ice\x0b\n").as_bytes(), b"al ice");
    }

    #[test]
    fn blank_line_is_empty_uid() {
        let uid = Uid::from_line(b"  \r\n");
        assert!(uid.is_empty());
        assert_eq!(uid.len(), 0);
    }

    #[test]
    fn embedded_newline_rejected() {
        let err = Uid::new("ali\nce").unwrap_err();
        assert_eq!(err, TypeError::EmbeddedNewline(3));
    }

    #[test]
    fn trailing_newline_is_not_embedded() {
        assert!(Uid::new("alice\n").is_ok());
    }

    #[test]
    fn display_escapes_binary() {
        let uid = Uid::new(b"a\x00b".as_slice()).unwrap();
        assert_eq!(uid.to_string(), "a\\x00b");
        assert_eq!(format!("{uid:?}"), "Uid(\"a\\x00b\")");
    }

    #[test]
    fn inner_whitespace_is_kept() {
        let uid = Uid::new("bob smith").unwrap();
        assert_eq!(uid.as_bytes(), b"bob smith");
    }

    proptest! {
        #[test]
        fn padding_never_changes_identity(
            core in "[a-z0-9_.]{0,24}",
            left in "[ \t]{0,4}",
            right in "[ \t\r]{0,4}",
        ) {
            let padded = Uid::from_line(format!("{left}{core}{right}\n").as_bytes());
            let plain = Uid::new(core.as_str()).unwrap();
            prop_assert_eq!(padded, plain);
        }

        #[test]
        fn normalization_is_idempotent(raw in proptest::collection::vec(any::<u8>(), 0..64)) {
            let line: Vec<u8> = raw.into_iter().filter(|&b| b != b'\n').collect();
            let once = Uid::from_line(&line);
            let twice = Uid::from_line(once.as_bytes());
            prop_assert_eq!(once, twice);
        }
    }
}
