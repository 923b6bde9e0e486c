use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

const ID_BYTES: usize = 12;
const ID_HEX_LEN: usize = ID_BYTES * 2;
const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Random value fixed for the lifetime of the process
static PROCESS_UNIQUE: LazyLock<[u8; 5]> = LazyLock::new(|| {
    let random = Uuid::new_v4();
    let mut bytes = [0u8; 5];
    bytes.copy_from_slice(&random.as_bytes()[..5]);
    bytes
});

static COUNTER: LazyLock<AtomicU32> = LazyLock::new(|| {
    let random = Uuid::new_v4();
    let seed = u32::from_be_bytes([0, random.as_bytes()[0], random.as_bytes()[1], random.as_bytes()[2]]);
    AtomicU32::new(seed)
});

/// Raised when an externally supplied id is not a 24-character hex token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformatted id: '{0}'")]
pub struct InvalidId(pub String);

/// Native identifier of a note
///
/// Twelve bytes laid out as a big-endian seconds timestamp (4), a per-process
/// random value (5) and a wrapping counter (3). The textual form is always
/// 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId([u8; ID_BYTES]);

impl NoteId {
    /// Mint a fresh id. Ids from one process never repeat unless more than
    /// 2^24 ids are minted within the same second.
    pub fn generate() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; ID_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        NoteId(bytes)
    }

    /// Validate a raw token and convert it to a native id.
    ///
    /// Well-formed tokens always parse, whether or not a note carries them.
    pub fn parse(raw: &str) -> Result<Self, InvalidId> {
        if raw.len() != ID_HEX_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidId(raw.to_string()));
        }

        let mut bytes = [0u8; ID_BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&raw[i * 2..i * 2 + 2], 16)
                .map_err(|_| InvalidId(raw.to_string()))?;
        }
        Ok(NoteId(bytes))
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for NoteId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteId::parse(s)
    }
}

impl Serialize for NoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NoteId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_id_is_24_lowercase_hex() {
        let id = NoteId::generate().to_string();
        assert_eq!(id.len(), 24);
        assert!(id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: HashSet<NoteId> = (0..10_000).map(|_| NoteId::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_parse_accepts_generated_id() {
        let id = NoteId::generate();
        assert_eq!(NoteId::parse(&id.to_string()), Ok(id));
    }

    #[test]
    fn test_from_str_matches_parse() {
        let id: NoteId = "5a3d5da59070081a82a3445c".parse().unwrap();
        assert_eq!(Ok(id), NoteId::parse("5a3d5da59070081a82a3445c"));
        assert!("2534".parse::<NoteId>().is_err());
    }

    #[test]
    fn test_parse_normalizes_case() {
        let id = NoteId::parse("5A3D5DA59070081A82A3445C").unwrap();
        assert_eq!(id.to_string(), "5a3d5da59070081a82a3445c");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert_eq!(NoteId::parse("2534"), Err(InvalidId("2534".to_string())));
        assert!(NoteId::parse("5a3d5da59070081a82a3445").is_err());
        assert!(NoteId::parse("5a3d5da59070081a82a3445cc").is_err());
        assert!(NoteId::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(NoteId::parse("5a3d5da59070081a82a3445z").is_err());
        assert!(NoteId::parse("not-a-valid-note-id-at-a").is_err());
        // 24 bytes, but not 24 ASCII characters
        assert!(NoteId::parse("ééééééééééää").is_err());
    }

    #[test]
    fn test_json_form_is_hex_string() {
        let id = NoteId::parse("5a3d5da59070081a82a3445c").unwrap();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!("5a3d5da59070081a82a3445c"));

        let back: NoteId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_value::<NoteId>(serde_json::json!("2534")).is_err());
    }
}
