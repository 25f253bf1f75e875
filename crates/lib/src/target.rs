//! Rule target identities.
//!
//! A [`RuleTarget`] uniquely identifies one rule in the build graph. Targets
//! are written `//package/path:name`, where the package path is relative to
//! the project root and the name is the rule's logical name within that
//! package. The target is immutable, participates in the cache fingerprint,
//! and namespaces the rule's generated-output directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing a target string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
  /// The target did not start with `//`.
  #[error("target must start with '//': {0}")]
  MissingPrefix(String),

  /// The target had no `:` separating package and name.
  #[error("target must contain ':' before the rule name: {0}")]
  MissingName(String),

  /// The rule name was empty.
  #[error("target has an empty rule name: {0}")]
  EmptyName(String),

  /// The package path contained an invalid component.
  #[error("invalid package path component {component:?} in target: {target}")]
  InvalidPackage { target: String, component: String },
}

/// The unique identity of a rule in the build graph.
///
/// # Format
///
/// `//<package>:<name>`, e.g. `//docs:readme.txt` or `//:top-level`.
/// The package may be empty (rules declared at the project root).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleTarget {
  package: String,
  name: String,
}

impl RuleTarget {
  /// Create a target from an already-split package path and rule name.
  pub fn new(package: &str, name: &str) -> Result<Self, TargetError> {
    let full = format!("//{}:{}", package, name);
    if name.is_empty() {
      return Err(TargetError::EmptyName(full));
    }
    for component in package.split('/') {
      if package.is_empty() {
        break;
      }
      if component.is_empty() || component == "." || component == ".." {
        return Err(TargetError::InvalidPackage {
          target: full,
          component: component.to_string(),
        });
      }
    }
    Ok(Self {
      package: package.to_string(),
      name: name.to_string(),
    })
  }

  /// Parse a `//package:name` target string.
  pub fn parse(s: &str) -> Result<Self, TargetError> {
    let rest = s
      .strip_prefix("//")
      .ok_or_else(|| TargetError::MissingPrefix(s.to_string()))?;
    let (package, name) = rest
      .split_once(':')
      .ok_or_else(|| TargetError::MissingName(s.to_string()))?;
    Self::new(package, name)
  }

  /// The package path, relative to the project root. May be empty.
  pub fn package(&self) -> &str {
    &self.package
  }

  /// The rule name within its package.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// The package path as a relative filesystem path.
  pub fn base_path(&self) -> PathBuf {
    PathBuf::from(&self.package)
  }
}

impl std::fmt::Display for RuleTarget {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "//{}:{}", self.package, self.name)
  }
}

impl TryFrom<String> for RuleTarget {
  type Error = TargetError;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    Self::parse(&s)
  }
}

impl From<RuleTarget> for String {
  fn from(t: RuleTarget) -> Self {
    t.to_string()
  }
}
