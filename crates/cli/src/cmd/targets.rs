//! Implementation of the `quarry targets` command.
//!
//! Lists every declared target with its logical output name, declared
//! output path, rule key, and cache eligibility. Forwarding outputs render
//! as an arrow to their source.

use std::path::Path;

use anyhow::{Context, Result};

use quarry_lib::rule::{BuildRule, HasOutputName};

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_targets(root: &Path, manifest: &Path, format: OutputFormat) -> Result<()> {
  let (_root, graph) = super::load_graph(root, manifest)?;

  if format.is_json() {
    let mut items = Vec::new();
    for rule in graph.rules() {
      let key = rule
        .rule_key()
        .with_context(|| format!("Failed to compute rule key for {}", rule.target()))?;
      items.push(serde_json::json!({
        "target": rule.target().to_string(),
        "out": rule.output_name(),
        "output": rule.output_path().to_string(),
        "key": key.to_string(),
        "cacheable": rule.is_cacheable(),
      }));
    }
    print_json(&items)?;
  } else {
    for rule in graph.rules() {
      let key = rule
        .rule_key()
        .with_context(|| format!("Failed to compute rule key for {}", rule.target()))?;
      println!("{}", rule.target());
      print_stat("out", rule.output_name());
      print_stat("output", &rule.output_path().to_string());
      print_stat("key", &key.to_string());
      print_stat("cacheable", if rule.is_cacheable() { "yes" } else { "no" });
    }
  }

  Ok(())
}
