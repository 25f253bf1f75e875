//! Implementation of the `quarry build` command.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use quarry_lib::exec::{ArtifactLedger, StepExecutor};
use quarry_lib::resolve::WorkspaceResolver;
use quarry_lib::rule::PlanContext;

use crate::output::{format_duration, print_stat, print_success};

pub fn cmd_build(root: &Path, manifest: &Path) -> Result<()> {
  let started = Instant::now();
  let (root, graph) = super::load_graph(root, manifest)?;

  let resolver = WorkspaceResolver::new(&root, &graph);
  let mut ledger = ArtifactLedger::new();
  let plans = graph
    .plan(&PlanContext::new(&resolver), &mut ledger)
    .context("Failed to plan build")?;

  let executor = StepExecutor::new(&root);
  let mut total_steps = 0;
  for plan in &plans {
    executor
      .execute(&plan.steps)
      .with_context(|| format!("Failed to build {}", plan.target))?;
    total_steps += plan.steps.len();
  }

  print_success(&format!(
    "Built {} rule(s) in {}",
    plans.len(),
    format_duration(started.elapsed())
  ));
  print_stat("Steps", &total_steps.to_string());
  print_stat("Artifacts", &ledger.len().to_string());

  Ok(())
}
