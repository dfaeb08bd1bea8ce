//! Runtime tuning knobs.

use std::env;

use log::warn;

pub const MAX_FLUSH_PASSES_VAR: &str = "RIACT_MAX_FLUSH_PASSES";
pub const LOG_PATCHES_VAR: &str = "RIACT_LOG_PATCHES";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    max_flush_passes: usize,
    log_patches: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_flush_passes: 64,
            log_patches: false,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `RIACT_MAX_FLUSH_PASSES` and `RIACT_LOG_PATCHES`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(MAX_FLUSH_PASSES_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(passes) if passes > 0 => config.max_flush_passes = passes,
                _ => warn!("ignoring {MAX_FLUSH_PASSES_VAR}={raw:?}: expected a positive integer"),
            }
        }
        if let Some(raw) = lookup(LOG_PATCHES_VAR) {
            config.log_patches = !matches!(raw.trim(), "" | "0" | "false" | "off");
        }
        config
    }

    /// Upper bound on task/dirty drain passes before a flush gives up; at least 1.
    pub fn max_flush_passes(&self) -> usize {
        self.max_flush_passes
    }

    /// Log every applied patch at `debug` instead of `trace`.
    pub fn log_patches(&self) -> bool {
        self.log_patches
    }

    pub fn with_max_flush_passes(mut self, passes: usize) -> Self {
        self.max_flush_passes = passes.max(1);
        self
    }

    pub fn with_log_patches(mut self, enabled: bool) -> Self {
        self.log_patches = enabled;
        self
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
