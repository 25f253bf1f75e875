//! The file-export rule.
//!
//! Exposes an existing file or directory under a chosen logical output name
//! so other rules can depend on it. The rule does no real computation; all
//! of the interesting behavior is how it participates in the graph:
//!
//! - `Reference` mode declares the source's own location as the rule's
//!   output and emits no steps.
//! - `Copy` mode materializes a physical copy under the rule's private
//!   generated-output directory.
//!
//! See [`ExportArgs`](super::ExportArgs) for the defaulting rules applied
//! by the configuration layer.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::OutputLayout;
use crate::resolve::ResolveError;
use crate::rule::{ArtifactRecorder, BuildRule, HasOutputName, HasRuntimeDeps, PlanContext, RuleFinder};
use crate::rulekey::{RuleKey, RuleKeyError, RuleKeyed};
use crate::source::{OutputPath, SourcePath};
use crate::step::Step;
use crate::target::RuleTarget;

/// How the rule exposes its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
  /// Pass through: the output is the source's own location; no copy.
  Reference,
  /// Materialize: the output is a physical duplicate at a rule-owned path.
  Copy,
}

/// A rule exposing a file (or directory) under a logical output name.
///
/// Immutable after construction; every query is deterministic in `target`,
/// `name`, `mode`, and `src`.
#[derive(Debug)]
pub struct ExportFile {
  target: RuleTarget,
  name: String,
  mode: ExportMode,
  src: SourcePath,
  layout: OutputLayout,
  static_deps: BTreeSet<RuleTarget>,
}

/// The cache-relevant fields of an export rule.
#[derive(Serialize)]
struct ExportKey<'a> {
  target: &'a RuleTarget,
  name: &'a str,
  mode: ExportMode,
  src: &'a SourcePath,
}

impl RuleKeyed for ExportKey<'_> {}

impl ExportFile {
  /// Create the rule. Static dependencies are derived here, once: if `src`
  /// is produced by another rule, that rule must build first.
  pub fn new(
    target: RuleTarget,
    name: impl Into<String>,
    mode: ExportMode,
    src: SourcePath,
    layout: OutputLayout,
    finder: &dyn RuleFinder,
  ) -> Self {
    let static_deps = finder.producer_of(&src).into_iter().collect();
    Self {
      target,
      name: name.into(),
      mode,
      src,
      layout,
      static_deps,
    }
  }

  /// The declared source.
  pub fn src(&self) -> &SourcePath {
    &self.src
  }

  /// The output mode.
  pub fn mode(&self) -> ExportMode {
    self.mode
  }

  /// The destination of the copy, relative to the project root. Only
  /// meaningful in `Copy` mode; asking in `Reference` mode is a defect in
  /// the calling graph logic.
  pub fn copied_path(&self) -> PathBuf {
    assert!(
      self.mode == ExportMode::Copy,
      "copied path requested for {} in reference mode",
      self.target
    );
    self.layout.gen_path(&self.target).join(&self.name)
  }
}

impl HasOutputName for ExportFile {
  fn output_name(&self) -> &str {
    &self.name
  }
}

impl HasRuntimeDeps for ExportFile {
  fn runtime_deps<'a>(&'a self, finder: &'a dyn RuleFinder) -> Box<dyn Iterator<Item = RuleTarget> + 'a> {
    // In reference mode the output is literally another rule's output, so
    // whatever builds the source must have run by the time a consumer uses
    // it, even when the consumer never walks the static graph. A copy
    // already captured the dependency at build time.
    match self.mode {
      ExportMode::Reference => Box::new(finder.producer_of(&self.src).into_iter()),
      ExportMode::Copy => Box::new(std::iter::empty()),
    }
  }
}

impl BuildRule for ExportFile {
  fn target(&self) -> &RuleTarget {
    &self.target
  }

  fn static_deps(&self) -> &BTreeSet<RuleTarget> {
    &self.static_deps
  }

  fn plan_steps(
    &self,
    ctx: &PlanContext<'_>,
    recorder: &mut dyn ArtifactRecorder,
  ) -> Result<Vec<Step>, ResolveError> {
    let mut steps = Vec::new();

    // The source is copied rather than symlinked so that when the output
    // is archived and unpacked on another machine it is an ordinary file
    // in both scenarios.
    if self.mode == ExportMode::Copy {
      let out = self.copied_path();
      let parent = out
        .parent()
        .expect("copied path is always inside the gen dir")
        .to_path_buf();
      steps.push(Step::RecreateDir { path: parent });

      let src_abs = ctx.resolver.absolute_path(&self.src)?;
      if ctx.resolver.is_directory(&self.src) {
        steps.push(Step::CopyDirContents {
          src: src_abs,
          dst: out.clone(),
        });
      } else {
        steps.push(Step::CopyFile {
          src: src_abs,
          dst: out.clone(),
        });
      }

      debug!("{} exports {} to {}", self.target, self.src, out.display());
      recorder.record_artifact(&out);
    }

    Ok(steps)
  }

  fn output_path(&self) -> OutputPath {
    // In reference mode the output is the source's location itself; the
    // resolver has already verified both live under the same project root.
    // In copy mode it is the path allocated for the copy.
    match self.mode {
      ExportMode::Reference => OutputPath::Forwarding {
        target: self.target.clone(),
        src: self.src.clone(),
      },
      ExportMode::Copy => OutputPath::Explicit {
        target: self.target.clone(),
        path: self.copied_path(),
      },
    }
  }

  fn output_source(&self) -> Option<&SourcePath> {
    // A reference forwards to the source and a copy reproduces it, so the
    // output has the source's shape in both modes.
    Some(&self.src)
  }

  fn rule_key(&self) -> Result<RuleKey, RuleKeyError> {
    // Key over identity, output name, mode, and source; nothing else can
    // change what the rule produces.
    ExportKey {
      target: &self.target,
      name: &self.name,
      mode: self.mode,
      src: &self.src,
    }
    .compute_rule_key()
  }

  fn is_cacheable(&self) -> bool {
    // The rule only copies a file; redoing that locally is cheaper than
    // any cache round-trip.
    false
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::TargetIndex;
  use crate::util::testutil::{FixedResolver, TestRecorder};

  fn target(s: &str) -> RuleTarget {
    RuleTarget::parse(s).unwrap()
  }

  fn export(target_str: &str, name: &str, mode: ExportMode, src: &str, index: &TargetIndex) -> ExportFile {
    ExportFile::new(
      target(target_str),
      name,
      mode,
      SourcePath::parse(src).unwrap(),
      OutputLayout::default(),
      index,
    )
  }

  #[test]
  fn reference_mode_plans_no_steps() {
    let index = TargetIndex::default();
    let rule = export("//docs:readme", "readme.txt", ExportMode::Reference, "docs/readme.md", &index);

    let resolver = FixedResolver::new("/ws");
    let mut recorder = TestRecorder::default();
    let steps = rule.plan_steps(&PlanContext::new(&resolver), &mut recorder).unwrap();

    assert!(steps.is_empty());
    assert!(recorder.paths.is_empty());
    assert!(!rule.is_cacheable());
  }

  #[test]
  fn reference_mode_forwards_to_source() {
    let index = TargetIndex::default();
    let rule = export("//docs:readme", "readme.txt", ExportMode::Reference, "docs/readme.md", &index);

    let out = rule.output_path();
    assert_eq!(
      out,
      OutputPath::Forwarding {
        target: target("//docs:readme"),
        src: SourcePath::parse("docs/readme.md").unwrap(),
      }
    );
  }

  #[test]
  fn copy_mode_plans_recreate_then_copy() {
    let index = TargetIndex::default();
    let rule = export("//web:ie-exports", "some-file-ie.js", ExportMode::Copy, "web/some-file.js", &index);

    let resolver = FixedResolver::new("/ws");
    let mut recorder = TestRecorder::default();
    let steps = rule.plan_steps(&PlanContext::new(&resolver), &mut recorder).unwrap();

    assert_eq!(steps.len(), 2);
    assert_eq!(
      steps[0],
      Step::RecreateDir {
        path: PathBuf::from("quarry-out/gen/web/ie-exports"),
      }
    );
    assert_eq!(
      steps[1],
      Step::CopyFile {
        src: PathBuf::from("/ws/web/some-file.js"),
        dst: PathBuf::from("quarry-out/gen/web/ie-exports/some-file-ie.js"),
      }
    );
    assert!(!rule.is_cacheable());
  }

  #[test]
  fn copy_mode_records_the_destination() {
    let index = TargetIndex::default();
    let rule = export("//web:ie-exports", "some-file-ie.js", ExportMode::Copy, "web/some-file.js", &index);

    let resolver = FixedResolver::new("/ws");
    let mut recorder = TestRecorder::default();
    rule.plan_steps(&PlanContext::new(&resolver), &mut recorder).unwrap();

    assert_eq!(
      recorder.paths,
      vec![PathBuf::from("quarry-out/gen/web/ie-exports/some-file-ie.js")]
    );
  }

  #[test]
  fn copy_mode_with_directory_source_copies_contents() {
    let index = TargetIndex::default();
    let rule = export("//assets:static", "static", ExportMode::Copy, "assets/static", &index);

    let resolver = FixedResolver::new("/ws").with_directory("assets/static");
    let mut recorder = TestRecorder::default();
    let steps = rule.plan_steps(&PlanContext::new(&resolver), &mut recorder).unwrap();

    assert!(matches!(steps[1], Step::CopyDirContents { .. }));
  }

  #[test]
  fn copy_mode_declares_explicit_output() {
    let index = TargetIndex::default();
    let rule = export("//docs:readme", "readme.txt", ExportMode::Copy, "docs/readme.md", &index);

    assert_eq!(
      rule.output_path(),
      OutputPath::Explicit {
        target: target("//docs:readme"),
        path: PathBuf::from("quarry-out/gen/docs/readme/readme.txt"),
      }
    );
  }

  #[test]
  #[should_panic(expected = "reference mode")]
  fn copied_path_panics_in_reference_mode() {
    let index = TargetIndex::default();
    let rule = export("//docs:readme", "readme.txt", ExportMode::Reference, "docs/readme.md", &index);
    rule.copied_path();
  }

  #[test]
  fn static_deps_follow_the_source_producer() {
    let mut index = TargetIndex::default();
    index.insert(target("//gen:blob"));

    let with_producer = export("//docs:readme", "readme.txt", ExportMode::Copy, "//gen:blob", &index);
    assert_eq!(
      with_producer.static_deps().iter().collect::<Vec<_>>(),
      vec![&target("//gen:blob")]
    );

    let plain = export("//docs:readme", "readme.txt", ExportMode::Copy, "docs/readme.md", &index);
    assert!(plain.static_deps().is_empty());
  }

  #[test]
  fn runtime_deps_asymmetry_between_modes() {
    let mut index = TargetIndex::default();
    index.insert(target("//gen:blob"));

    let reference = export("//docs:readme", "readme.txt", ExportMode::Reference, "//gen:blob", &index);
    let copy = export("//docs:copy", "readme.txt", ExportMode::Copy, "//gen:blob", &index);

    let runtime: Vec<_> = reference.runtime_deps(&index).collect();
    assert_eq!(runtime, vec![target("//gen:blob")]);
    assert_eq!(copy.runtime_deps(&index).count(), 0);
  }

  #[test]
  fn runtime_deps_iterator_is_restartable() {
    let mut index = TargetIndex::default();
    index.insert(target("//gen:blob"));
    let rule = export("//docs:readme", "readme.txt", ExportMode::Reference, "//gen:blob", &index);

    assert_eq!(rule.runtime_deps(&index).count(), 1);
    assert_eq!(rule.runtime_deps(&index).count(), 1);
  }

  #[test]
  fn output_path_is_idempotent() {
    let index = TargetIndex::default();
    let rule = export("//docs:readme", "readme.txt", ExportMode::Copy, "docs/readme.md", &index);
    assert_eq!(rule.output_path(), rule.output_path());
    assert_eq!(rule.static_deps(), rule.static_deps());
  }

  #[test]
  fn rule_key_depends_on_mode_and_source() {
    let index = TargetIndex::default();
    let copy = export("//docs:readme", "readme.txt", ExportMode::Copy, "docs/readme.md", &index);
    let reference = export("//docs:readme", "readme.txt", ExportMode::Reference, "docs/readme.md", &index);
    let other_src = export("//docs:readme", "readme.txt", ExportMode::Copy, "docs/other.md", &index);

    let key = copy.rule_key().unwrap();
    assert_eq!(key, copy.rule_key().unwrap());
    assert_ne!(key, reference.rule_key().unwrap());
    assert_ne!(key, other_src.rule_key().unwrap());
  }
}
