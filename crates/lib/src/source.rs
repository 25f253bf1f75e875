//! Source and output path references.
//!
//! A [`SourcePath`] is an opaque handle to something a rule reads: either a
//! plain file in the workspace or the declared output of another rule. An
//! [`OutputPath`] is what a rule declares as its own output. Both are pure
//! references; turning them into absolute filesystem paths is the job of
//! [`crate::resolve::SourceResolver`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::target::{RuleTarget, TargetError};

/// A reference to a rule input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourcePath {
  /// A file or directory in the workspace, relative to the project root.
  Workspace(PathBuf),
  /// The declared output of another rule.
  Rule(RuleTarget),
}

impl SourcePath {
  /// Parse a source string: `//package:name` for a rule output, anything
  /// else is a workspace-relative path.
  pub fn parse(s: &str) -> Result<Self, TargetError> {
    if s.starts_with("//") {
      Ok(SourcePath::Rule(RuleTarget::parse(s)?))
    } else {
      Ok(SourcePath::Workspace(PathBuf::from(s)))
    }
  }

  /// The target of the rule producing this source, if it is a rule output.
  pub fn producer(&self) -> Option<&RuleTarget> {
    match self {
      SourcePath::Workspace(_) => None,
      SourcePath::Rule(target) => Some(target),
    }
  }

  /// The final path component this source resolves to, used when validating
  /// output names against a pass-through source.
  pub fn file_name(&self) -> Option<String> {
    match self {
      SourcePath::Workspace(path) => {
        path.file_name().map(|n| n.to_string_lossy().into_owned())
      }
      SourcePath::Rule(target) => Some(target.name().to_string()),
    }
  }
}

impl std::fmt::Display for SourcePath {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SourcePath::Workspace(path) => write!(f, "{}", path.display()),
      SourcePath::Rule(target) => write!(f, "{}", target),
    }
  }
}

impl TryFrom<String> for SourcePath {
  type Error = TargetError;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    Self::parse(&s)
  }
}

impl From<SourcePath> for String {
  fn from(src: SourcePath) -> Self {
    src.to_string()
  }
}

/// The output a rule declares, as seen by consumers.
///
/// The two representations mirror the rule's two output modes and consumers
/// must switch on exactly these cases:
/// - `Forwarding`: "my output is whatever `src` resolves to". The rule owns
///   no materialized path; resolution follows `src` transparently.
/// - `Explicit`: a path owned by the declaring rule, relative to the
///   project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPath {
  Forwarding { target: RuleTarget, src: SourcePath },
  Explicit { target: RuleTarget, path: PathBuf },
}

impl OutputPath {
  /// The rule that declared this output.
  pub fn target(&self) -> &RuleTarget {
    match self {
      OutputPath::Forwarding { target, .. } => target,
      OutputPath::Explicit { target, .. } => target,
    }
  }

  /// The materialized path, if this output owns one.
  pub fn explicit_path(&self) -> Option<&Path> {
    match self {
      OutputPath::Forwarding { .. } => None,
      OutputPath::Explicit { path, .. } => Some(path),
    }
  }
}

impl std::fmt::Display for OutputPath {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      OutputPath::Forwarding { src, .. } => write!(f, "-> {}", src),
      OutputPath::Explicit { path, .. } => write!(f, "{}", path.display()),
    }
  }
}
