//! Primitive build steps.
//!
//! A [`Step`] is one executable build action. Rules only describe steps;
//! they never touch the filesystem themselves. The conventions:
//! - destination paths (`path`, `dst`) are relative to the project root,
//!   so a plan can be shipped to an executor rooted elsewhere;
//! - source paths (`src`) are absolute, already resolved by the planning
//!   context.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One primitive, executable build action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
  /// Remove `path` if it exists, then create it as an empty directory.
  /// Guarantees a clean slate regardless of prior build state.
  RecreateDir { path: PathBuf },

  /// Copy a single file from `src` to `dst`.
  CopyFile { src: PathBuf, dst: PathBuf },

  /// Recursively copy the *contents* of directory `src` into `dst`.
  /// The directory node itself is not copied; `dst` never ends up with a
  /// nested directory named after `src`.
  CopyDirContents { src: PathBuf, dst: PathBuf },
}

impl Step {
  /// Get a human-readable description of the step.
  pub fn description(&self) -> String {
    match self {
      Step::RecreateDir { path } => format!("recreate dir {}", path.display()),
      Step::CopyFile { src, dst } => {
        format!("copy {} -> {}", src.display(), dst.display())
      }
      Step::CopyDirContents { src, dst } => {
        format!("copy contents of {} -> {}", src.display(), dst.display())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn descriptions_name_the_paths() {
    let step = Step::RecreateDir {
      path: PathBuf::from("quarry-out/gen/docs/readme"),
    };
    assert_eq!(step.description(), "recreate dir quarry-out/gen/docs/readme");

    let step = Step::CopyFile {
      src: PathBuf::from("/ws/docs/readme.md"),
      dst: PathBuf::from("quarry-out/gen/docs/readme/readme.txt"),
    };
    assert!(step.description().contains("readme.md"));
    assert!(step.description().contains("readme.txt"));
  }

  #[test]
  fn serializes_with_kind_tag() {
    let step = Step::CopyDirContents {
      src: PathBuf::from("/ws/assets"),
      dst: PathBuf::from("quarry-out/gen/assets/static"),
    };
    let json = serde_json::to_value(&step).unwrap();
    assert_eq!(json["kind"], "copy_dir_contents");
  }
}
