//! Generated-output path layout.
//!
//! Every rule that materializes an output writes it under a private
//! directory derived from its own identity, so two rules can never race on
//! overlapping destinations. Layout, relative to the project root:
//!
//! ```text
//! quarry-out/
//! └── gen/<package>/<rule-name>/   # outputs owned by //package:rule-name
//! ```
//!
//! The layout is a plain value passed into rule construction; there is no
//! ambient global configuration.

use std::path::PathBuf;

use crate::consts::{GEN_DIR, OUT_ROOT};
use crate::target::RuleTarget;

/// Computes generated-output paths, all relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
  out_root: PathBuf,
}

impl OutputLayout {
  /// A layout rooted at a custom output directory.
  pub fn new(out_root: impl Into<PathBuf>) -> Self {
    Self {
      out_root: out_root.into(),
    }
  }

  /// The generated-output directory owned by `target`.
  pub fn gen_path(&self, target: &RuleTarget) -> PathBuf {
    self
      .out_root
      .join(GEN_DIR)
      .join(target.base_path())
      .join(target.name())
  }

  /// The root of all generated state.
  pub fn out_root(&self) -> &PathBuf {
    &self.out_root
  }
}

impl Default for OutputLayout {
  fn default() -> Self {
    Self::new(OUT_ROOT)
  }
}
