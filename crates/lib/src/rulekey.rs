//! Rule-key fingerprints for the caching layer.
//!
//! A rule key is a truncated SHA-256 over the JSON serialization of the
//! fields a rule declares as cache-relevant. Two rule instances with equal
//! keys are interchangeable as far as caching is concerned; anything that
//! must invalidate the cache has to be part of the serialized record.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::consts::RULE_KEY_PREFIX_LEN;

pub type RuleKeyError = serde_json::Error;

/// A cache fingerprint for one rule instance.
///
/// # Format
///
/// A lowercase hexadecimal string of [`RULE_KEY_PREFIX_LEN`] characters,
/// e.g. `"a1b2c3d4e5f6789012ab"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleKey(pub String);

impl std::fmt::Display for RuleKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Computed for any serializable record of cache-relevant rule fields.
pub trait RuleKeyed: Serialize {
  fn compute_rule_key(&self) -> Result<RuleKey, RuleKeyError> {
    let serialized = serde_json::to_string(self)?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    let full = format!("{:x}", hasher.finalize());
    Ok(RuleKey(full[..RULE_KEY_PREFIX_LEN].to_string()))
  }
}
