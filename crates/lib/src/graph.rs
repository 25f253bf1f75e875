//! The build graph container.
//!
//! Holds rules behind the [`BuildRule`] trait, resolves dependency order,
//! and plans the whole graph. The graph owns no execution; it hands ordered
//! steps to whatever executor the caller supplies.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::debug;

use crate::resolve::ResolveError;
use crate::rule::{ArtifactRecorder, BuildRule, PlanContext, RuleFinder};
use crate::source::SourcePath;
use crate::step::Step;
use crate::target::RuleTarget;

/// Errors from assembling or ordering the graph.
#[derive(Debug, Error)]
pub enum GraphError {
  /// Two rules were declared with the same target.
  #[error("duplicate rule target: {0}")]
  DuplicateTarget(RuleTarget),

  /// A rule depends on a target the graph does not contain.
  #[error("{rule} depends on unknown target {dependency}")]
  UnknownDependency {
    rule: RuleTarget,
    dependency: RuleTarget,
  },

  /// The static dependencies form a cycle.
  #[error("dependency cycle detected")]
  CycleDetected,
}

/// Errors from planning the whole graph.
#[derive(Debug, Error)]
pub enum PlanError {
  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Resolve(#[from] ResolveError),
}

/// The planned steps of one rule, in execution order.
#[derive(Debug)]
pub struct RulePlan {
  pub target: RuleTarget,
  pub steps: Vec<Step>,
}

/// An index of declared rule targets, used as a [`RuleFinder`] while rules
/// are still being constructed and the full graph does not exist yet.
#[derive(Debug, Default, Clone)]
pub struct TargetIndex {
  targets: BTreeSet<RuleTarget>,
}

impl TargetIndex {
  pub fn insert(&mut self, target: RuleTarget) -> bool {
    self.targets.insert(target)
  }

  pub fn contains(&self, target: &RuleTarget) -> bool {
    self.targets.contains(target)
  }
}

impl RuleFinder for TargetIndex {
  fn producer_of(&self, src: &SourcePath) -> Option<RuleTarget> {
    src.producer().filter(|t| self.targets.contains(t)).cloned()
  }
}

/// Container for all rules of one build-graph instantiation.
#[derive(Default)]
pub struct BuildGraph {
  rules: BTreeMap<RuleTarget, Box<dyn BuildRule>>,
}

impl BuildGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a rule; its target must be unique within the graph.
  pub fn add_rule(&mut self, rule: Box<dyn BuildRule>) -> Result<(), GraphError> {
    let target = rule.target().clone();
    if self.rules.contains_key(&target) {
      return Err(GraphError::DuplicateTarget(target));
    }
    self.rules.insert(target, rule);
    Ok(())
  }

  /// Look up a rule by target.
  pub fn rule(&self, target: &RuleTarget) -> Option<&dyn BuildRule> {
    self.rules.get(target).map(|r| r.as_ref())
  }

  /// All targets, in deterministic order.
  pub fn targets(&self) -> impl Iterator<Item = &RuleTarget> {
    self.rules.keys()
  }

  /// All rules, in deterministic target order.
  pub fn rules(&self) -> impl Iterator<Item = &dyn BuildRule> {
    self.rules.values().map(|r| r.as_ref())
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// Targets in an order where static dependencies come before dependents.
  pub fn execution_order(&self) -> Result<Vec<RuleTarget>, GraphError> {
    let mut graph: DiGraph<RuleTarget, ()> = DiGraph::new();
    let mut nodes: HashMap<RuleTarget, NodeIndex> = HashMap::new();

    for target in self.rules.keys() {
      let idx = graph.add_node(target.clone());
      nodes.insert(target.clone(), idx);
    }

    for (target, rule) in &self.rules {
      let dependent = nodes[target];
      for dep in rule.static_deps() {
        let dep_idx = nodes.get(dep).ok_or_else(|| GraphError::UnknownDependency {
          rule: target.clone(),
          dependency: dep.clone(),
        })?;
        // Edge from dependency to dependent
        graph.add_edge(*dep_idx, dependent, ());
      }
    }

    let sorted = toposort(&graph, None).map_err(|_| GraphError::CycleDetected)?;
    Ok(sorted.into_iter().map(|idx| graph[idx].clone()).collect())
  }

  /// Plan every rule in execution order.
  pub fn plan(
    &self,
    ctx: &PlanContext<'_>,
    recorder: &mut dyn ArtifactRecorder,
  ) -> Result<Vec<RulePlan>, PlanError> {
    let order = self.execution_order()?;
    let mut plans = Vec::with_capacity(order.len());

    for target in order {
      let rule = &self.rules[&target];
      let steps = rule.plan_steps(ctx, recorder)?;
      debug!("planned {} step(s) for {}", steps.len(), target);
      plans.push(RulePlan { target, steps });
    }

    Ok(plans)
  }
}

impl RuleFinder for BuildGraph {
  fn producer_of(&self, src: &SourcePath) -> Option<RuleTarget> {
    src.producer().filter(|t| self.rules.contains_key(t)).cloned()
  }
}
