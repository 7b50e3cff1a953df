//! etcd v3 JSON-gateway wire types.
//!
//! The gateway uses the proto3 JSON mapping: `bytes` fields are base64
//! strings and `int64` fields are decimal strings. Zero values are omitted,
//! so every response field has a default.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};

use kvtree_core::KeyValueRecord;

use crate::error::Error;

pub const RANGE_PATH: &str = "v3/kv/range";
pub const PUT_PATH: &str = "v3/kv/put";
pub const DELETE_RANGE_PATH: &str = "v3/kv/deleterange";

/// Body of `POST /v3/kv/range`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RangeRequest {
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub range_end: String,
    #[serde(default)]
    pub serializable: bool,
}

impl RangeRequest {
    /// A serializable read of every key starting with `prefix`.
    pub fn prefix(prefix: &str) -> Self {
        // An empty prefix is spelled as the range ["\0", "\0"): every key.
        let (key, range_end) = if prefix.is_empty() {
            (vec![0u8], vec![0u8])
        } else {
            (prefix.as_bytes().to_vec(), prefix_range_end(prefix.as_bytes()))
        };
        Self {
            key: encode(&key),
            range_end: encode(&range_end),
            serializable: true,
        }
    }
}

/// Response of `POST /v3/kv/range`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeResponse {
    #[serde(default)]
    pub kvs: Vec<WireKeyValue>,
    #[serde(default)]
    pub more: bool,
    #[serde(default, deserialize_with = "int64")]
    pub count: i64,
}

/// A key-value pair as the gateway encodes it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireKeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default, deserialize_with = "int64")]
    pub create_revision: i64,
    #[serde(default, deserialize_with = "int64")]
    pub mod_revision: i64,
    #[serde(default, deserialize_with = "int64")]
    pub version: i64,
    #[serde(default)]
    pub value: String,
    #[serde(default, deserialize_with = "int64")]
    pub lease: i64,
}

impl WireKeyValue {
    /// Decode into a record. Non-UTF-8 bytes are replaced, not rejected.
    pub fn into_record(self) -> Result<KeyValueRecord, Error> {
        let key = String::from_utf8_lossy(&decode(&self.key)?).into_owned();
        let value = String::from_utf8_lossy(&decode(&self.value)?).into_owned();
        Ok(KeyValueRecord {
            key,
            value,
            create_revision: self.create_revision,
            mod_revision: self.mod_revision,
            version: self.version,
            lease: self.lease,
        })
    }
}

/// Body of `POST /v3/kv/put`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PutRequest {
    pub key: String,
    pub value: String,
}

impl PutRequest {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: encode(key.as_bytes()),
            value: encode(value.as_bytes()),
        }
    }
}

/// Body of `POST /v3/kv/deleterange`, for a single key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteRangeRequest {
    pub key: String,
}

impl DeleteRangeRequest {
    pub fn new(key: &str) -> Self {
        Self {
            key: encode(key.as_bytes()),
        }
    }
}

/// Response of `POST /v3/kv/deleterange`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteRangeResponse {
    #[serde(default, deserialize_with = "int64")]
    pub deleted: i64,
}

/// Any response we only need to acknowledge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {}

/// The end of the range covering every key with `prefix`.
///
/// Increments the last byte that is not `0xff` and drops what follows it.
/// A prefix made only of `0xff` bytes has no upper bound, spelled `"\0"`.
pub fn prefix_range_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xff {
            end.push(last + 1);
            return end;
        }
    }
    vec![0]
}

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode(text: &str) -> Result<Vec<u8>, Error> {
    Ok(STANDARD.decode(text)?)
}

/// Accept an int64 as either a JSON string or a JSON number.
fn int64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Text(String),
        Number(i64),
    }

    match Int64::deserialize(deserializer)? {
        Int64::Number(n) => Ok(n),
        Int64::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
