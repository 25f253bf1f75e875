mod build;
mod plan;
mod targets;

pub use build::cmd_build;
pub use plan::cmd_plan;
pub use targets::cmd_targets;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quarry_lib::graph::BuildGraph;
use quarry_lib::layout::OutputLayout;
use quarry_lib::manifest::ProjectManifest;

/// Resolve the project root and assemble the graph from its manifest.
pub(crate) fn load_graph(root: &Path, manifest: &Path) -> Result<(PathBuf, BuildGraph)> {
  let root =
    fs::canonicalize(root).with_context(|| format!("Cannot resolve project root: {}", root.display()))?;
  let manifest_path = root.join(manifest);

  let manifest = ProjectManifest::load(&manifest_path)
    .with_context(|| format!("Failed to load manifest: {}", manifest_path.display()))?;
  let graph = manifest
    .into_graph(OutputLayout::default())
    .context("Failed to assemble build graph")?;

  Ok((root, graph))
}
