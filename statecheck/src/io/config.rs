//! Trial configuration stored as TOML (for example `statecheck.toml`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::seeded::DEFAULT_MAX_DRAWS;
use crate::repeat::StepBudget;
use crate::step::{DEFAULT_MAX_COSTLY_ATTEMPTS, RetryPolicy};

/// Default number of steps per trial.
pub const DEFAULT_STEPS: u32 = 30;

/// Repeat configuration (TOML).
///
/// Missing fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepeatConfig {
    /// Steps per trial before short mode is applied.
    pub steps: u32,

    /// Short mode halves `steps`.
    pub short: bool,

    /// Costly inapplicable attempts allowed per step.
    pub max_costly_attempts: u32,

    /// Draws a seeded engine may make per trial before it reports exhaustion.
    pub max_draws: u64,

    /// Base seed. Unset means a fresh seed per invocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            short: false,
            max_costly_attempts: DEFAULT_MAX_COSTLY_ATTEMPTS,
            max_draws: DEFAULT_MAX_DRAWS,
            seed: None,
        }
    }
}

/// Command-line overrides applied on top of a loaded config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub steps: Option<u32>,
    pub short: bool,
    pub max_costly_attempts: Option<u32>,
    pub seed: Option<u64>,
}

impl RepeatConfig {
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(anyhow!("steps must be > 0"));
        }
        if self.max_costly_attempts == 0 {
            return Err(anyhow!("max_costly_attempts must be > 0"));
        }
        if self.max_draws == 0 {
            return Err(anyhow!("max_draws must be > 0"));
        }
        Ok(())
    }

    pub fn budget(&self) -> StepBudget {
        StepBudget::new(self.steps, self.short).with_retry(RetryPolicy {
            max_costly_attempts: self.max_costly_attempts,
        })
    }

    pub fn apply_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if let Some(steps) = overrides.steps {
            self.steps = steps;
        }
        if overrides.short {
            self.short = true;
        }
        if let Some(max_costly_attempts) = overrides.max_costly_attempts {
            self.max_costly_attempts = max_costly_attempts;
        }
        if let Some(seed) = overrides.seed {
            self.seed = Some(seed);
        }
        self.validate()?;
        Ok(self)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RepeatConfig::default()`.
pub fn load_config(path: &Path) -> Result<RepeatConfig> {
    if !path.exists() {
        let cfg = RepeatConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RepeatConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, RepeatConfig::default());
    }

    #[test]
    fn full_file_loads_every_field() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("statecheck.toml");
        fs::write(
            &path,
            "steps = 12\nshort = true\nmax_costly_attempts = 5\nmax_draws = 900\nseed = 42\n",
        )
        .expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(
            loaded,
            RepeatConfig {
                steps: 12,
                short: true,
                max_costly_attempts: 5,
                max_draws: 900,
                seed: Some(42),
            }
        );
    }

    #[test]
    fn partial_file_uses_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("statecheck.toml");
        fs::write(&path, "steps = 8\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.steps, 8);
        assert_eq!(cfg.max_costly_attempts, DEFAULT_MAX_COSTLY_ATTEMPTS);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn zero_steps_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("statecheck.toml");
        fs::write(&path, "steps = 0\n").expect("write");
        let err = load_config(&path).expect_err("invalid");
        assert!(err.to_string().contains("steps must be > 0"));
    }

    #[test]
    fn overrides_apply_and_budget_halves_in_short_mode() {
        let cfg = RepeatConfig::default()
            .apply_overrides(&ConfigOverrides {
                steps: Some(10),
                short: true,
                max_costly_attempts: Some(5),
                seed: None,
            })
            .expect("overrides");
        let budget = cfg.budget();
        assert_eq!(budget.steps, 5);
        assert_eq!(budget.retry.max_costly_attempts, 5);
    }
}
