use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VerifyError;

/// Parsed output of the mesh daemon's `status --json` command.
///
/// Only the fields needed to build a [`KeySet`] are modelled; everything else
/// the daemon emits is ignored. Both sections are optional and `null` is
/// treated as absent, including for individual peer entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusDocument {
    #[serde(rename = "Self", default)]
    pub self_node: Option<PeerStatus>,
    #[serde(rename = "Peer", default)]
    pub peer: Option<HashMap<String, Option<PeerStatus>>>,
}

impl StatusDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// A single node record, either the local node or one of its peers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PeerStatus {
    #[serde(rename = "PublicKey", default)]
    pub public_key: Option<String>,
}

impl PeerStatus {
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { public_key: Some(key.into()) }
    }
}

/// Set of node public keys currently known to the local daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet(HashSet<String>);

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for KeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Inbound payload of `POST /verify`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    /// Public key the caller claims to hold.
    pub node_public: String,
    /// Opaque description of where the access attempt came from. Logged only.
    pub source: String,
}

impl VerifyRequest {
    /// Parse a raw request body.
    ///
    /// The body must be a JSON object carrying string `NodePublic` and
    /// `Source` fields. Any other fields are ignored.
    pub fn parse(body: &[u8]) -> Result<Self, VerifyError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| VerifyError::MalformedRequest(format!("invalid JSON: {e}")))?;

        let Value::Object(fields) = value else {
            return Err(VerifyError::MalformedRequest("body is not a JSON object".into()));
        };

        let string_field = |name: &str| -> Result<String, VerifyError> {
            match fields.get(name) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(VerifyError::MalformedRequest(format!("{name} is not a string"))),
                None => Err(VerifyError::MalformedRequest(format!("missing {name}"))),
            }
        };

        Ok(Self {
            node_public: string_field("NodePublic")?,
            source: string_field("Source")?,
        })
    }
}

/// Decision returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifyResponse {
    #[serde(rename = "Allow")]
    pub allow: bool,
}
