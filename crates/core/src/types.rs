use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Length of a document identifier in hex characters.
pub const DOC_ID_LEN: usize = 24;

static DOC_ID_COUNTER: LazyLock<AtomicU32> = LazyLock::new(|| AtomicU32::new(rand::random()));

/// Primary key of every stored document.
///
/// 12 bytes rendered as 24 lowercase hex characters: a 4-byte big-endian
/// Unix timestamp in seconds, 5 random bytes and a 3-byte counter. The layout
/// matches the object identifiers document databases hand out, so ids
/// produced elsewhere round-trip through [`DocId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let random: [u8; 5] = rand::random();
        let counter = DOC_ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&random);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Parse an identifier, normalising to lowercase. Returns `None` unless
    /// the input is exactly 24 hex characters.
    pub fn parse(value: &str) -> Option<Self> {
        is_object_id(value).then(|| Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DocId> for serde_json::Value {
    fn from(id: DocId) -> Self {
        serde_json::Value::String(id.0)
    }
}

/// Whether `value` has the shape of a document identifier.
pub fn is_object_id(value: &str) -> bool {
    value.len() == DOC_ID_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}
