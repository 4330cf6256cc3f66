//! Engine configuration.
//!
//! The awk binary comes from, in order: the `--awk` flag, the `VAWK_AWK`
//! environment variable, then `gawk`. The binary loads `.env` into the
//! environment once at startup, so `VAWK_AWK` may also live there.

use serde::{Deserialize, Serialize};
use std::env;

/// Engine used when nothing else is configured.
pub const DEFAULT_ENGINE: &str = "gawk";

/// Environment variable naming the engine binary.
pub const ENGINE_ENV_VAR: &str = "VAWK_AWK";

/// Which awk binary runs generated programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub program: String,
}

impl EngineConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Read the engine from `VAWK_AWK`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        lookup(ENGINE_ENV_VAR)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Replace the engine when an explicit one is given.
    pub fn with_override(self, program: Option<String>) -> Self {
        match program {
            Some(p) => Self::new(p),
            None => self,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}
