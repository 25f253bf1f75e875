//! Step execution against a real filesystem.
//!
//! The executor is the only place in the crate that mutates the
//! filesystem. It interprets the three primitive step kinds and is
//! responsible for serializing access to shared output directories; rules
//! already guarantee their destinations never overlap by namespacing them
//! under their own identity.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::rule::ArtifactRecorder;
use crate::step::Step;

/// Errors during step execution.
#[derive(Debug, Error)]
pub enum ExecError {
  /// A filesystem operation failed.
  #[error("step failed for '{path}': {message}")]
  StepFailed { path: String, message: String },

  /// A copy failed; either side may be the culprit, so both are named.
  #[error("copy {src} -> {dst} failed: {message}")]
  CopyFailed {
    src: String,
    dst: String,
    message: String,
  },
}

impl ExecError {
  fn from_io(path: &Path, err: std::io::Error) -> Self {
    ExecError::StepFailed {
      path: path.display().to_string(),
      message: err.to_string(),
    }
  }

  fn copy_failed(src: &Path, dst: &Path, err: std::io::Error) -> Self {
    ExecError::CopyFailed {
      src: src.display().to_string(),
      dst: dst.display().to_string(),
      message: err.to_string(),
    }
  }
}

/// Collects the output paths rules registered during planning, so the
/// caching and cleanup layers know what the build produced.
#[derive(Debug, Default)]
pub struct ArtifactLedger {
  paths: Vec<PathBuf>,
}

impl ArtifactLedger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Recorded paths, in registration order.
  pub fn paths(&self) -> impl Iterator<Item = &Path> {
    self.paths.iter().map(|p| p.as_path())
  }

  pub fn contains(&self, path: &Path) -> bool {
    self.paths.iter().any(|p| p == path)
  }

  pub fn len(&self) -> usize {
    self.paths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.paths.is_empty()
  }
}

impl ArtifactRecorder for ArtifactLedger {
  fn record_artifact(&mut self, path: &Path) {
    self.paths.push(path.to_path_buf());
  }
}

/// Executes steps with destinations rooted at a project directory.
pub struct StepExecutor {
  root: PathBuf,
}

impl StepExecutor {
  /// Create an executor rooted at `root` (absolute project root).
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Execute steps in order, stopping at the first failure.
  pub fn execute(&self, steps: &[Step]) -> Result<(), ExecError> {
    for step in steps {
      debug!("executing: {}", step.description());
      self.execute_step(step)?;
    }
    info!("executed {} step(s)", steps.len());
    Ok(())
  }

  /// Execute a single step.
  pub fn execute_step(&self, step: &Step) -> Result<(), ExecError> {
    match step {
      Step::RecreateDir { path } => {
        let abs = self.root.join(path);
        if abs.exists() {
          fs::remove_dir_all(&abs).map_err(|e| ExecError::from_io(&abs, e))?;
        }
        fs::create_dir_all(&abs).map_err(|e| ExecError::from_io(&abs, e))
      }
      Step::CopyFile { src, dst } => {
        let abs = self.root.join(dst);
        fs::copy(src, &abs)
          .map(|_| ())
          .map_err(|e| ExecError::copy_failed(src, &abs, e))
      }
      Step::CopyDirContents { src, dst } => copy_dir_contents(src, &self.root.join(dst)),
    }
  }
}

/// Recursively copy the contents of `src` into `dst`. The `src` directory
/// node itself is not reproduced under `dst`.
fn copy_dir_contents(src: &Path, dst: &Path) -> Result<(), ExecError> {
  fs::create_dir_all(dst).map_err(|e| ExecError::from_io(dst, e))?;

  for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
    let entry = entry.map_err(|e| ExecError::StepFailed {
      path: src.display().to_string(),
      message: e.to_string(),
    })?;
    let rel = entry
      .path()
      .strip_prefix(src)
      .expect("walkdir yields paths under its root");
    let target = dst.join(rel);

    let file_type = entry.file_type();
    if file_type.is_dir() {
      fs::create_dir_all(&target).map_err(|e| ExecError::from_io(&target, e))?;
    } else if file_type.is_symlink() {
      let link_target = fs::read_link(entry.path()).map_err(|e| ExecError::from_io(entry.path(), e))?;
      create_symlink(&link_target, &target)?;
    } else {
      fs::copy(entry.path(), &target)
        .map(|_| ())
        .map_err(|e| ExecError::copy_failed(entry.path(), &target, e))?;
    }
  }

  Ok(())
}

/// Create a symbolic link.
fn create_symlink(target: &Path, link: &Path) -> Result<(), ExecError> {
  #[cfg(unix)]
  {
    std::os::unix::fs::symlink(target, link).map_err(|e| ExecError::from_io(link, e))
  }

  #[cfg(windows)]
  {
    if target.is_dir() {
      std::os::windows::fs::symlink_dir(target, link).map_err(|e| ExecError::from_io(link, e))
    } else {
      std::os::windows::fs::symlink_file(target, link).map_err(|e| ExecError::from_io(link, e))
    }
  }
}
