//! Document identifiers.
//!
//! Catalog documents come from several import paths, so their `_id` may be a
//! store-native [`ObjectId`], a plain string, or an integer. [`DocumentId`]
//! keeps the representation explicit instead of guessing.
//!
//! Inside stored documents an `ObjectId` is written in extended-JSON form:
//!
//! ```json
//! { "_id": { "$oid": "65f1c0ffee0000000000abcd" } }
//! ```

use core::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

/// Key under which extended JSON stores an object id.
pub const OID_KEY: &str = "$oid";

/// Errors that can occur when parsing an [`ObjectId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    /// The input is not exactly 24 characters long.
    #[error("object id must be 24 hex characters (got {0})")]
    InvalidLength(usize),
    /// The input contains non-hex characters.
    #[error("object id must only contain hex characters")]
    InvalidHex,
}

/// A 12-byte store-native object identifier.
///
/// Layout: 4-byte big-endian creation timestamp (seconds), 5 random bytes fixed
/// per process, and a 3-byte big-endian counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

static PROCESS_UNIQUE: LazyLock<[u8; 5]> = LazyLock::new(rand::random);
static COUNTER: LazyLock<AtomicU32> =
    LazyLock::new(|| AtomicU32::new(rand::random::<u32>() & 0x00FF_FFFF));

impl ObjectId {
    /// Generate a new object id stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timestamp(Utc::now())
    }

    /// Generate a new object id stamped with the given time.
    #[must_use]
    pub fn with_timestamp(at: DateTime<Utc>) -> Self {
        let seconds = u32::try_from(at.timestamp()).unwrap_or(0);
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Build an object id from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Parse an object id from its 24 character hex form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not 24 characters of hex.
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != 24 {
            return Err(ObjectIdError::InvalidLength(s.len()));
        }

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ObjectIdError::InvalidHex)?;
        Ok(Self(bytes))
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Returns the lowercase hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the creation time embedded in the id.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(i64::from(seconds), 0)
            .single()
            .unwrap_or_default()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

/// The primary key of a stored document, in whichever representation it was
/// written with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentId {
    /// Store-native object id.
    ObjectId(ObjectId),
    /// Plain string key.
    String(String),
    /// Integer key.
    Integer(i64),
}

impl DocumentId {
    /// Read an id from a stored `_id` value.
    ///
    /// Returns `None` for shapes that are not a known id representation.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => n.as_i64().map(Self::Integer),
            Value::Object(map) if map.len() == 1 => map
                .get(OID_KEY)
                .and_then(Value::as_str)
                .and_then(|hex| ObjectId::parse_str(hex).ok())
                .map(Self::ObjectId),
            _ => None,
        }
    }

    /// Returns the stored (extended JSON) representation.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::ObjectId(oid) => json!({ OID_KEY: oid.to_hex() }),
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectId(oid) => write!(f, "{oid}"),
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
        }
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        Self::ObjectId(oid)
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported document id: {value}")))
    }
}
