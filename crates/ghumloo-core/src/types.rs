use std::fmt;

use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// HotelId
// =============================================================================

/// Opaque hotel identifier issued by the listing API.
///
/// The listing endpoint emits numeric ids while tool arguments coming back
/// from the reasoning engine may carry them as strings, so both JSON forms
/// deserialize to the same value. Ids in canonical integer form serialize back
/// as numbers; anything else (`"007"`, `"+5"`, `"HTL-7"`) stays a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HotelId(String);

impl HotelId {
    /// Create an id from its textual form. Surrounding whitespace is dropped.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self(raw.trim().to_string())
    }

    /// The textual form of the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id carries no characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HotelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for HotelId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for HotelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for HotelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for HotelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Signed(i64),
            Unsigned(u64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Signed(n) => HotelId(n.to_string()),
            RawId::Unsigned(n) => HotelId(n.to_string()),
            // Whole floats ("42.0") come from engines that type every number as double.
            RawId::Float(f) if f.fract() == 0.0 => HotelId(format!("{}", f as i64)),
            RawId::Float(f) => HotelId(f.to_string()),
            RawId::Text(s) => HotelId::new(s),
        })
    }
}

// =============================================================================
// Hotel listings and records
// =============================================================================

/// One hotel entry as returned by the listing API.
///
/// Only `id` and `hotel_name` are interpreted; every other field is kept in
/// `details` and passed through to the reasoning engine untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HotelListing {
    #[serde(default)]
    pub id: Option<HotelId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hotel_name: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl HotelListing {
    /// Build a listing with no extra details.
    pub fn new(id: impl Into<HotelId>, hotel_name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            hotel_name: hotel_name.into(),
            details: serde_json::Map::new(),
        }
    }

    /// Convert to an index record.
    ///
    /// Returns `None` when the name is blank or the id is absent, in which
    /// case the listing must not be registered under any key.
    pub fn to_record(&self) -> Option<HotelRecord> {
        let name = self.hotel_name.trim();
        match &self.id {
            Some(id) if !id.is_empty() && !name.is_empty() => Some(HotelRecord {
                id: id.clone(),
                display_name: name.to_string(),
            }),
            _ => None,
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A hotel known to the index: identity plus the name shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelRecord {
    pub id: HotelId,
    pub display_name: String,
}

// =============================================================================
// Conversation turns
// =============================================================================

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a conversation history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Epoch seconds.
    pub created_at: i64,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Local::now().timestamp(),
        }
    }
}
