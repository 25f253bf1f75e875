//! quarry-lib: Core types and logic for Quarry
//!
//! This crate provides the fundamental types of the build graph:
//! - `RuleTarget`: the unique identity of a rule in the graph
//! - `SourcePath` / `OutputPath`: where a rule reads from and what it declares
//! - `Step`: primitive build actions consumed by the step executor
//! - `ExportFile`: the rule that exposes a file under a logical output name
//! - `BuildGraph`: the container that orders rules and plans their steps

pub mod consts;
pub mod exec;
pub mod graph;
pub mod layout;
pub mod manifest;
pub mod resolve;
pub mod rule;
pub mod rulekey;
pub mod source;
pub mod step;
pub mod target;
pub mod util;
