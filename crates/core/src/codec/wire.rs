use std::collections::BTreeMap;

use base64::Engine;
use serde::{Serialize, Serializer};

/// A marshalled item (or key), keyed by attribute name.
pub type Item = BTreeMap<String, WireValue>;

/// The store's tagged attribute value.
///
/// Numbers travel as decimal strings so no precision is lost in transit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WireValue {
    #[serde(rename = "S")]
    Str(String),
    #[serde(rename = "N")]
    Num(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "B")]
    Binary(#[serde(serialize_with = "serialize_base64")] Vec<u8>),
}

// Binary attributes are base64 text in the store's JSON form.
fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

impl WireValue {
    pub fn tag(&self) -> WireTag {
        match self {
            Self::Str(_) => WireTag::S,
            Self::Num(_) => WireTag::N,
            Self::Bool(_) => WireTag::Bool,
            Self::Null => WireTag::Null,
            Self::Binary(_) => WireTag::B,
        }
    }
}

/// Type tag of a [`WireValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireTag {
    S,
    N,
    Bool,
    Null,
    B,
}

impl WireTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::N => "N",
            Self::Bool => "BOOL",
            Self::Null => "NULL",
            Self::B => "B",
        }
    }
}
