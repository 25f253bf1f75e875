//! Build rules and the capability traits they implement.
//!
//! The graph never holds concrete rule types; it holds trait objects and
//! queries capabilities through small traits:
//! - [`BuildRule`]: identity, static dependencies, step planning, declared
//!   output path, cache eligibility
//! - [`HasOutputName`]: the logical name other rules see
//! - [`HasRuntimeDeps`]: rules that must have been built whenever this
//!   rule's output is consumed, independent of build-time step ordering
//!
//! Collaborators consumed by rules are traits as well: [`RuleFinder`] maps
//! a source to its producing rule and [`ArtifactRecorder`] is the
//! side-channel the caching layer uses to track produced outputs.

pub mod args;
pub mod export;

pub use args::{ArgsError, ExportArgs};
pub use export::{ExportFile, ExportMode};

use std::collections::BTreeSet;
use std::path::Path;

use crate::resolve::{ResolveError, SourceResolver};
use crate::rulekey::{RuleKey, RuleKeyError};
use crate::source::{OutputPath, SourcePath};
use crate::step::Step;
use crate::target::RuleTarget;

/// Locates the rule, if any, that produces a given source.
///
/// A workspace file has no producer; a rule-output source is produced by
/// the named rule if the graph knows it.
pub trait RuleFinder {
  fn producer_of(&self, src: &SourcePath) -> Option<RuleTarget>;
}

/// Side-channel notified about produced output paths, so the caching and
/// cleanup layers can track what a rule wrote.
pub trait ArtifactRecorder {
  /// Record `path` (project-root relative) as an output of the current rule.
  fn record_artifact(&mut self, path: &Path);
}

/// Everything step planning may consult. Resolution must be safe for
/// concurrent read access; planning itself performs no filesystem mutation.
pub struct PlanContext<'a> {
  pub resolver: &'a dyn SourceResolver,
}

impl<'a> PlanContext<'a> {
  pub fn new(resolver: &'a dyn SourceResolver) -> Self {
    Self { resolver }
  }
}

/// The logical output name other rules see.
pub trait HasOutputName {
  fn output_name(&self) -> &str;
}

/// Runtime dependencies: rules that must be present whenever anything
/// depending on this rule's output runs, even if this rule emitted no
/// steps.
pub trait HasRuntimeDeps {
  /// A finite, restartable sequence of rule identities. Each call returns
  /// a fresh iterator.
  fn runtime_deps<'a>(&'a self, _finder: &'a dyn RuleFinder) -> Box<dyn Iterator<Item = RuleTarget> + 'a> {
    Box::new(std::iter::empty())
  }
}

/// A node in the build graph.
///
/// Rules are immutable after construction: every method here is a pure
/// function of the rule's fields (plus the read-only context it is handed),
/// so a rule may be queried concurrently from multiple graph-traversal
/// threads without synchronization.
pub trait BuildRule: HasOutputName + HasRuntimeDeps {
  /// The unique identity of this rule.
  fn target(&self) -> &RuleTarget;

  /// Rules that must finish before this rule's own steps run. Computed
  /// once at construction; never changes.
  fn static_deps(&self) -> &BTreeSet<RuleTarget>;

  /// Compute the ordered steps that build this rule's output.
  ///
  /// Planning performs no I/O mutation; failures of the described
  /// operations surface later, when the executor runs the steps.
  fn plan_steps(
    &self,
    ctx: &PlanContext<'_>,
    recorder: &mut dyn ArtifactRecorder,
  ) -> Result<Vec<Step>, ResolveError>;

  /// The output this rule declares, forwarding or explicit.
  fn output_path(&self) -> OutputPath;

  /// The source whose on-disk shape this rule's output takes, if the
  /// output mirrors one. Resolvers use it to derive directory-ness for
  /// outputs that have not been materialized yet.
  fn output_source(&self) -> Option<&SourcePath> {
    None
  }

  /// The cache fingerprint over this rule's identity-relevant fields.
  fn rule_key(&self) -> Result<RuleKey, RuleKeyError>;

  /// Whether this rule's output may be stored in and fetched from a cache.
  fn is_cacheable(&self) -> bool {
    true
  }
}
