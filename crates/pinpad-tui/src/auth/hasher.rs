//! PIN hashing

use std::sync::Arc;

use pinpad_core::{IdentityHasher, PinHasher};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hash applied to entries before storage and comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Hex-encoded SHA-256
    #[default]
    Sha256,
    /// Store and compare the digits as typed
    Plain,
}

/// Hex-encoded SHA-256 of the entry
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl PinHasher for Sha256Hasher {
    fn hash(&self, raw: &str) -> String {
        hex::encode(Sha256::digest(raw.as_bytes()))
    }
}

impl HashAlgorithm {
    pub fn hasher(self) -> Arc<dyn PinHasher> {
        match self {
            HashAlgorithm::Sha256 => Arc::new(Sha256Hasher),
            HashAlgorithm::Plain => Arc::new(IdentityHasher),
        }
    }
}
