//! Precedence constraints.
//!
//! `successor` cannot start until `predecessor` has finished and `lag`
//! further periods have elapsed (finish-to-start with minimum time lag).

use serde::{Deserialize, Serialize};

/// A directed edge in the job graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Precedence {
    /// Job that must finish first.
    pub predecessor: String,
    /// Job that starts afterwards.
    pub successor: String,
    /// Minimum gap between predecessor finish and successor start.
    #[serde(default)]
    pub lag: u64,
}

impl Precedence {
    /// Creates a zero-lag precedence constraint.
    pub fn new(predecessor: impl Into<String>, successor: impl Into<String>) -> Self {
        Self {
            predecessor: predecessor.into(),
            successor: successor.into(),
            lag: 0,
        }
    }

    /// Sets the minimum lag.
    pub fn with_lag(mut self, lag: u64) -> Self {
        self.lag = lag;
        self
    }

    /// Whether the edge points back at its own origin.
    pub fn is_self_loop(&self) -> bool {
        self.predecessor == self.successor
    }
}
