//! Test helpers shared across unit tests.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::resolve::{ResolveError, SourceResolver};
use crate::rule::ArtifactRecorder;
use crate::source::SourcePath;

/// A resolver with a fixed root and no filesystem access. Workspace
/// sources resolve by joining onto the root; rule-output sources resolve
/// to a synthetic per-target path. Directory-ness comes from an explicit
/// allowlist instead of a metadata probe.
pub struct FixedResolver {
  root: PathBuf,
  directories: BTreeSet<PathBuf>,
}

impl FixedResolver {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      directories: BTreeSet::new(),
    }
  }

  /// Mark a workspace-relative path as a directory.
  pub fn with_directory(mut self, rel: impl Into<PathBuf>) -> Self {
    self.directories.insert(rel.into());
    self
  }
}

impl SourceResolver for FixedResolver {
  fn absolute_path(&self, src: &SourcePath) -> Result<PathBuf, ResolveError> {
    match src {
      SourcePath::Workspace(rel) => Ok(self.root.join(rel)),
      SourcePath::Rule(target) => Ok(
        self
          .root
          .join("rule-out")
          .join(target.base_path())
          .join(target.name()),
      ),
    }
  }

  fn is_directory(&self, src: &SourcePath) -> bool {
    match src {
      SourcePath::Workspace(rel) => self.directories.contains(rel),
      SourcePath::Rule(_) => false,
    }
  }
}

/// Recorder that remembers every artifact path, in call order.
#[derive(Debug, Default)]
pub struct TestRecorder {
  pub paths: Vec<PathBuf>,
}

impl ArtifactRecorder for TestRecorder {
  fn record_artifact(&mut self, path: &Path) {
    self.paths.push(path.to_path_buf());
  }
}
