//! Implementation of the `quarry plan` command.
//!
//! Assembles the graph, plans every rule in execution order, and prints the
//! steps a build would run. Nothing is written to disk.

use std::path::Path;

use anyhow::{Context, Result};

use quarry_lib::exec::ArtifactLedger;
use quarry_lib::resolve::WorkspaceResolver;
use quarry_lib::rule::PlanContext;

use crate::output::{print_info, print_stat, symbols};

pub fn cmd_plan(root: &Path, manifest: &Path) -> Result<()> {
  let (root, graph) = super::load_graph(root, manifest)?;

  let resolver = WorkspaceResolver::new(&root, &graph);
  let mut ledger = ArtifactLedger::new();
  let plans = graph
    .plan(&PlanContext::new(&resolver), &mut ledger)
    .context("Failed to plan build")?;

  let mut total_steps = 0;
  for plan in &plans {
    print_info(&plan.target.to_string());
    for step in &plan.steps {
      println!("    {} {}", symbols::ARROW, step.description());
    }
    total_steps += plan.steps.len();
  }

  println!();
  print_stat("Rules", &plans.len().to_string());
  print_stat("Steps", &total_steps.to_string());
  print_stat("Artifacts", &ledger.len().to_string());

  Ok(())
}
