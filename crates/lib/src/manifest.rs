//! The project manifest: declared rules on disk.
//!
//! A manifest is a JSON document listing export declarations. Loading is
//! split from graph construction so the CLI can report parse errors with
//! the file path before any rule-level validation runs.
//!
//! Graph construction is two-phase. Rules derive their static dependencies
//! at construction time by asking a [`RuleFinder`] for the producer of
//! their source, so all declared targets are indexed first and the rules
//! are built against that index.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::graph::{BuildGraph, GraphError, TargetIndex};
use crate::layout::OutputLayout;
use crate::rule::{ArgsError, ExportArgs, RuleFinder};
use crate::target::RuleTarget;

/// Errors loading a manifest or turning it into a graph.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// The manifest file could not be read.
  #[error("cannot read manifest '{path}': {message}")]
  Io { path: String, message: String },

  /// The manifest was not valid JSON.
  #[error("cannot parse manifest: {0}")]
  Parse(#[from] serde_json::Error),

  /// A declaration failed validation.
  #[error(transparent)]
  Args(#[from] ArgsError),

  /// The declared rules do not form a valid graph.
  #[error(transparent)]
  Graph(#[from] GraphError),
}

/// One rule declaration in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDecl {
  /// The declaring package, relative to the project root. Empty means the
  /// root package.
  #[serde(default)]
  pub package: String,

  #[serde(flatten)]
  pub args: ExportArgs,
}

impl RuleDecl {
  fn target(&self) -> Result<RuleTarget, ArgsError> {
    Ok(RuleTarget::new(&self.package, &self.args.name)?)
  }
}

/// All rules of one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
  pub rules: Vec<RuleDecl>,
}

impl ProjectManifest {
  /// Load and parse a manifest file.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    let text = fs::read_to_string(path).map_err(|e| ManifestError::Io {
      path: path.display().to_string(),
      message: e.to_string(),
    })?;
    let manifest: Self = serde_json::from_str(&text)?;
    debug!("loaded {} rule(s) from {}", manifest.rules.len(), path.display());
    Ok(manifest)
  }

  /// Build the graph from the declared rules.
  pub fn into_graph(self, layout: OutputLayout) -> Result<BuildGraph, ManifestError> {
    let mut index = TargetIndex::default();
    for decl in &self.rules {
      let target = decl.target()?;
      if !index.insert(target.clone()) {
        return Err(GraphError::DuplicateTarget(target).into());
      }
    }

    let finder: &dyn RuleFinder = &index;
    let mut graph = BuildGraph::new();
    for decl in self.rules {
      let rule = decl.args.into_rule(&decl.package, layout.clone(), finder)?;
      graph.add_rule(Box::new(rule))?;
    }

    Ok(graph)
  }
}
