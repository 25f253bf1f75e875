//! Project-wide constants.

/// Name of the directory at the project root that holds all generated state.
pub const OUT_ROOT: &str = "quarry-out";

/// Subdirectory of [`OUT_ROOT`] for generated rule outputs.
pub const GEN_DIR: &str = "gen";

/// Length of the truncated rule-key prefix used for cache fingerprints.
pub const RULE_KEY_PREFIX_LEN: usize = 20;
