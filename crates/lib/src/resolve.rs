//! Source path resolution.
//!
//! Maps a [`SourcePath`] to an absolute filesystem path. Workspace sources
//! resolve against the project root; rule-output sources resolve through
//! the producing rule's declared [`OutputPath`], transparently following
//! forwarding outputs until an explicit path or a workspace file is
//! reached.
//!
//! Every resolved path must stay inside the project root. An escape is a
//! configuration error and resolution fails hard; it never falls back to
//! copying.
//!
//! Directory-ness of a rule-output source is derived structurally, by
//! walking to the workspace path whose shape the output takes. Probing the
//! output's own path would be wrong during planning: the whole graph is
//! planned before anything executes, so upstream outputs do not exist yet.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::trace;

use crate::graph::BuildGraph;
use crate::rule::BuildRule;
use crate::source::{OutputPath, SourcePath};
use crate::target::RuleTarget;

/// Errors from resolving a source to an absolute path.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// A source named a rule the graph does not contain.
  #[error("no rule in the graph produces {0}")]
  UnknownRule(RuleTarget),

  /// A source resolved to a path outside the project root.
  #[error("source '{src}' resolves outside the project root: {path}")]
  OutsideProjectRoot { src: String, path: PathBuf },

  /// Forwarding outputs refer back to themselves.
  #[error("forwarding outputs form a cycle at {0}")]
  ForwardingCycle(RuleTarget),
}

/// Resolves sources to absolute paths and probes directory-ness.
pub trait SourceResolver {
  /// The absolute filesystem path this source resolves to.
  fn absolute_path(&self, src: &SourcePath) -> Result<PathBuf, ResolveError>;

  /// Whether the source resolves to a directory. Missing or unreadable
  /// paths are not directories. The default probes the resolved path;
  /// implementations that plan before outputs exist derive the shape
  /// structurally instead.
  fn is_directory(&self, src: &SourcePath) -> bool {
    self.absolute_path(src).map(|p| p.is_dir()).unwrap_or(false)
  }
}

/// Resolver over one project root and the graph of rules inside it.
pub struct WorkspaceResolver<'a> {
  root: PathBuf,
  graph: &'a BuildGraph,
}

impl<'a> WorkspaceResolver<'a> {
  /// Create a resolver for the project rooted at `root` (absolute).
  pub fn new(root: impl Into<PathBuf>, graph: &'a BuildGraph) -> Self {
    Self {
      root: root.into(),
      graph,
    }
  }

  /// The project root this resolver is anchored at.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Join a project-relative path onto the root, rejecting components that
  /// would climb out of it. Lexical only: outputs that do not exist yet
  /// must still resolve.
  fn rooted(&self, rel: &Path, src: &SourcePath) -> Result<PathBuf, ResolveError> {
    let mut depth: usize = 0;
    for component in rel.components() {
      match component {
        Component::Normal(_) => depth += 1,
        Component::CurDir => {}
        Component::ParentDir => {
          if depth == 0 {
            return Err(ResolveError::OutsideProjectRoot {
              src: src.to_string(),
              path: self.root.join(rel),
            });
          }
          depth -= 1;
        }
        Component::RootDir | Component::Prefix(_) => {
          return Err(ResolveError::OutsideProjectRoot {
            src: src.to_string(),
            path: rel.to_path_buf(),
          });
        }
      }
    }
    Ok(self.root.join(rel))
  }

  fn resolve(&self, src: &SourcePath, visited: &mut BTreeSet<RuleTarget>) -> Result<PathBuf, ResolveError> {
    match src {
      SourcePath::Workspace(rel) => self.rooted(rel, src),
      SourcePath::Rule(target) => {
        if !visited.insert(target.clone()) {
          return Err(ResolveError::ForwardingCycle(target.clone()));
        }
        let rule = self
          .graph
          .rule(target)
          .ok_or_else(|| ResolveError::UnknownRule(target.clone()))?;
        match rule.output_path() {
          OutputPath::Forwarding { src: upstream, .. } => {
            trace!("following forwarded output of {} to {}", target, upstream);
            self.resolve(&upstream, visited)
          }
          OutputPath::Explicit { path, .. } => self.rooted(&path, src),
        }
      }
    }
  }
}

impl SourceResolver for WorkspaceResolver<'_> {
  fn absolute_path(&self, src: &SourcePath) -> Result<PathBuf, ResolveError> {
    self.resolve(src, &mut BTreeSet::new())
  }

  fn is_directory(&self, src: &SourcePath) -> bool {
    let mut visited = BTreeSet::new();
    let mut current = src.clone();
    loop {
      let target = match &current {
        SourcePath::Workspace(_) => {
          return self.absolute_path(&current).map(|p| p.is_dir()).unwrap_or(false);
        }
        SourcePath::Rule(target) => target.clone(),
      };
      if !visited.insert(target.clone()) {
        return false;
      }
      match self.graph.rule(&target).and_then(|r| r.output_source()) {
        // The output takes its source's shape; keep walking toward the
        // workspace path it mirrors.
        Some(next) => current = next.clone(),
        None => {
          return self.absolute_path(&current).map(|p| p.is_dir()).unwrap_or(false);
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::OutputLayout;
  use crate::rule::{ExportFile, ExportMode};
  use crate::source::SourcePath;

  fn graph_with_exports(pairs: &[(&str, &str, ExportMode)]) -> BuildGraph {
    let layout = OutputLayout::default();
    let mut graph = BuildGraph::new();
    for (target, src, mode) in pairs {
      let target = RuleTarget::parse(target).unwrap();
      let src = SourcePath::parse(src).unwrap();
      let name = target.name().to_string();
      let rule = ExportFile::new(target, name, *mode, src, layout.clone(), &graph);
      graph.add_rule(Box::new(rule)).unwrap();
    }
    graph
  }

  #[test]
  fn workspace_source_resolves_under_root() {
    let graph = BuildGraph::new();
    let resolver = WorkspaceResolver::new("/ws", &graph);
    let src = SourcePath::parse("docs/readme.md").unwrap();
    assert_eq!(
      resolver.absolute_path(&src).unwrap(),
      PathBuf::from("/ws/docs/readme.md")
    );
  }

  #[test]
  fn rule_source_resolves_to_copied_path() {
    let graph = graph_with_exports(&[("//docs:readme", "docs/readme.md", ExportMode::Copy)]);
    let resolver = WorkspaceResolver::new("/ws", &graph);
    let src = SourcePath::parse("//docs:readme").unwrap();
    assert_eq!(
      resolver.absolute_path(&src).unwrap(),
      PathBuf::from("/ws/quarry-out/gen/docs/readme/readme")
    );
  }

  #[test]
  fn forwarding_chain_resolves_to_original_file() {
    // reference -> reference -> workspace file
    let graph = graph_with_exports(&[
      ("//docs:inner", "docs/readme.md", ExportMode::Reference),
      ("//docs:outer", "//docs:inner", ExportMode::Reference),
    ]);
    let resolver = WorkspaceResolver::new("/ws", &graph);
    let src = SourcePath::parse("//docs:outer").unwrap();
    assert_eq!(
      resolver.absolute_path(&src).unwrap(),
      PathBuf::from("/ws/docs/readme.md")
    );
  }

  #[test]
  fn unknown_rule_is_an_error() {
    let graph = BuildGraph::new();
    let resolver = WorkspaceResolver::new("/ws", &graph);
    let src = SourcePath::parse("//ghost:rule").unwrap();
    assert!(matches!(
      resolver.absolute_path(&src),
      Err(ResolveError::UnknownRule(_))
    ));
  }

  #[test]
  fn escaping_the_root_is_an_error() {
    let graph = BuildGraph::new();
    let resolver = WorkspaceResolver::new("/ws", &graph);
    let src = SourcePath::parse("../outside.txt").unwrap();
    assert!(matches!(
      resolver.absolute_path(&src),
      Err(ResolveError::OutsideProjectRoot { .. })
    ));
  }

  #[test]
  fn dot_dot_within_the_root_is_allowed() {
    let graph = BuildGraph::new();
    let resolver = WorkspaceResolver::new("/ws", &graph);
    let src = SourcePath::parse("docs/../readme.md").unwrap();
    assert!(resolver.absolute_path(&src).is_ok());
  }

  #[test]
  fn missing_path_is_not_a_directory() {
    let graph = BuildGraph::new();
    let resolver = WorkspaceResolver::new("/nonexistent-root", &graph);
    let src = SourcePath::parse("no/such/dir").unwrap();
    assert!(!resolver.is_directory(&src));
  }

  #[test]
  fn directory_shape_is_derived_before_outputs_exist() {
    // A copy of a copy of a workspace directory. Nothing under the out
    // root exists yet; the shape must still come through the chain.
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("assets/static")).unwrap();
    std::fs::write(temp.path().join("assets/plain.txt"), "x").unwrap();

    let graph = graph_with_exports(&[
      ("//assets:static", "assets/static", ExportMode::Copy),
      ("//dist:static", "//assets:static", ExportMode::Copy),
      ("//assets:plain.txt", "assets/plain.txt", ExportMode::Copy),
      ("//dist:plain.txt", "//assets:plain.txt", ExportMode::Copy),
    ]);
    let resolver = WorkspaceResolver::new(temp.path(), &graph);

    assert!(resolver.is_directory(&SourcePath::parse("//dist:static").unwrap()));
    assert!(resolver.is_directory(&SourcePath::parse("//assets:static").unwrap()));
    assert!(!resolver.is_directory(&SourcePath::parse("//dist:plain.txt").unwrap()));
  }

  #[test]
  fn forwarding_cycle_is_an_error() {
    use crate::graph::TargetIndex;

    let mut index = TargetIndex::default();
    index.insert(RuleTarget::parse("//loop:a").unwrap());
    index.insert(RuleTarget::parse("//loop:b").unwrap());

    let mut graph = BuildGraph::new();
    for (target, src) in [("//loop:a", "//loop:b"), ("//loop:b", "//loop:a")] {
      let target = RuleTarget::parse(target).unwrap();
      let name = target.name().to_string();
      let rule = ExportFile::new(
        target,
        name,
        ExportMode::Reference,
        SourcePath::parse(src).unwrap(),
        OutputLayout::default(),
        &index,
      );
      graph.add_rule(Box::new(rule)).unwrap();
    }

    let resolver = WorkspaceResolver::new("/ws", &graph);
    let src = SourcePath::parse("//loop:a").unwrap();
    assert!(matches!(
      resolver.absolute_path(&src),
      Err(ResolveError::ForwardingCycle(_))
    ));
    assert!(!resolver.is_directory(&src));
  }
}
