use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::correction::{CorrectionConfig, DEFAULT_ITERATIONS};
use crate::EddyError;

/// Settings for one correction run, optionally read from a TOML file.
///
/// Command-line flags override whatever the file provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Number of correction iterations, 1 to 100
    pub iterations: i64,
    /// Emit loader and per-iteration debug diagnostics
    pub verbose: bool,
    /// Per-iteration deviation history (CSV)
    pub history: Option<PathBuf>,
    /// Directory for per-iteration SVG plots
    pub plot_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: i64::from(DEFAULT_ITERATIONS),
            verbose: false,
            history: None,
            plot_dir: None,
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, EddyError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, EddyError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            EddyError::Config(format!(
                "unable to read config file \"{}\" ({err})",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), EddyError> {
        self.correction().map(|_| ())
    }

    pub fn correction(&self) -> Result<CorrectionConfig, EddyError> {
        CorrectionConfig::new(self.iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.iterations, 10);
        assert!(!cfg.verbose);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = RunConfig::from_toml_str("iterations = 25\n").unwrap();
        assert_eq!(cfg.iterations, 25);
        assert_eq!(cfg.history, None);
        assert_eq!(cfg.correction().unwrap().iterations, 25);
    }

    #[test]
    fn full_toml() {
        let cfg = RunConfig::from_toml_str(
            "iterations = 3\nverbose = true\nhistory = \"out/history.csv\"\nplot_dir = \"plots\"\n",
        )
        .unwrap();
        assert!(cfg.verbose);
        assert_eq!(cfg.history, Some(PathBuf::from("out/history.csv")));
        assert_eq!(cfg.plot_dir, Some(PathBuf::from("plots")));
    }

    #[test]
    fn negative_and_oversized_counts_fail_validation() {
        for iterations in [-1, 0, 101] {
            let cfg = RunConfig {
                iterations,
                ..RunConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(EddyError::Config(_))));
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(RunConfig::from_toml_str("iteration = 3\n").is_err());
    }
}
