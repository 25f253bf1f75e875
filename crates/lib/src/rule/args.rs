//! Declared arguments of an export rule, before defaulting.
//!
//! This is the shape a manifest declares. [`ExportArgs::into_rule`] applies
//! the defaulting rules and produces the immutable [`ExportFile`]:
//! - `src` defaults to the file named `name` in the declaring package
//! - `out` defaults to `name`
//! - `mode` defaults to `copy`

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::OutputLayout;
use crate::rule::{ExportFile, ExportMode, RuleFinder};
use crate::source::SourcePath;
use crate::target::{RuleTarget, TargetError};

/// Errors validating declared arguments.
#[derive(Debug, Error)]
pub enum ArgsError {
  /// Renaming the output only makes sense when a copy is materialized; a
  /// reference has no file of its own to carry the new name.
  #[error("rule '{name}' sets out = '{out}' in reference mode; renaming requires mode = copy")]
  RenameWithoutCopy { name: String, out: String },

  /// The declaring package and rule name do not form a valid target.
  #[error(transparent)]
  Target(#[from] TargetError),
}

/// Arguments of one export declaration, optional fields not yet defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportArgs {
  /// The rule's name within its package.
  pub name: String,

  /// What to export. Defaults to the workspace file named `name` inside
  /// the declaring package.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub src: Option<SourcePath>,

  /// The logical output name. Defaults to `name`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub out: Option<String>,

  /// Reference or copy. Defaults to copy.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mode: Option<ExportMode>,
}

impl ExportArgs {
  /// Apply defaults and build the rule for the package declaring it.
  pub fn into_rule(
    self,
    package: &str,
    layout: OutputLayout,
    finder: &dyn RuleFinder,
  ) -> Result<ExportFile, ArgsError> {
    let target = RuleTarget::new(package, &self.name)?;
    let mode = self.mode.unwrap_or(ExportMode::Copy);

    let src = self
      .src
      .unwrap_or_else(|| SourcePath::Workspace(target.base_path().join(&self.name)));

    let out = match self.out {
      Some(out) => {
        if mode == ExportMode::Reference && src.file_name().as_deref() != Some(out.as_str()) {
          return Err(ArgsError::RenameWithoutCopy {
            name: self.name,
            out,
          });
        }
        out
      }
      None => self.name.clone(),
    };

    Ok(ExportFile::new(target, out, mode, src, layout, finder))
  }
}
