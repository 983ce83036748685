//! Validator configuration.

use serde::{Deserialize, Serialize};

/// Switches for the optional parts of validation.
///
/// Structural checks (schema, references, cycles) always run. The
/// feasibility pre-checks can be turned off individually, e.g. when a
/// downstream solver treats deadlines as soft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Report structurally identical array entries as syntactic defects.
    /// When off, such entries surface as `DuplicateIdentifier`.
    pub strict_unique_items: bool,
    /// Check `release_time + min duration <= deadline` per job.
    pub check_windows: bool,
    /// Check deadlines across precedence edges.
    pub check_precedence_windows: bool,
    /// Check precedence chains against the horizon.
    pub check_horizon: bool,
    /// Run independent checkers on the rayon pool (`parallel` feature).
    pub parallel: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_unique_items: false,
            check_windows: true,
            check_precedence_windows: true,
            check_horizon: true,
            parallel: false,
        }
    }
}

impl ValidationConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only structural checks; every feasibility pre-check except orphan
    /// and over-demand detection is disabled.
    pub fn structural_only() -> Self {
        Self {
            check_windows: false,
            check_precedence_windows: false,
            check_horizon: false,
            ..Self::default()
        }
    }

    /// Sets `strict_unique_items`.
    pub fn with_strict_unique_items(mut self, strict: bool) -> Self {
        self.strict_unique_items = strict;
        self
    }

    /// Sets `check_windows`.
    pub fn with_window_checks(mut self, enabled: bool) -> Self {
        self.check_windows = enabled;
        self
    }

    /// Sets `check_precedence_windows`.
    pub fn with_precedence_window_checks(mut self, enabled: bool) -> Self {
        self.check_precedence_windows = enabled;
        self
    }

    /// Sets `check_horizon`.
    pub fn with_horizon_check(mut self, enabled: bool) -> Self {
        self.check_horizon = enabled;
        self
    }

    /// Sets `parallel`. Has no effect without the `parallel` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
