//! Execution mode model.
//!
//! A mode is one alternative way of executing a job, trading duration,
//! cost and resource demand. A job is scheduled in exactly one of its modes.
//!
//! # Reference
//! Sprecher & Drexl (1998), "Multi-mode resource-constrained project scheduling
//! by a simple, general and powerful sequencing algorithm"

use serde::{Deserialize, Serialize};

/// An execution mode for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mode {
    /// Unique mode identifier.
    #[serde(rename = "mode_id")]
    pub id: String,
    /// Parent job identifier.
    pub job_id: String,
    /// Processing time in periods.
    pub duration: u64,
    /// Cost of selecting this mode.
    pub cost: f64,
    /// Resources consumed in every period while the job runs.
    #[serde(default)]
    pub resource_requirements: Vec<ResourceRequirement>,
}

impl Mode {
    /// Creates a zero-cost mode with no resource requirements.
    pub fn new(id: impl Into<String>, job_id: impl Into<String>, duration: u64) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            duration,
            cost: 0.0,
            resource_requirements: Vec::new(),
        }
    }

    /// Sets the cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Adds a resource requirement.
    pub fn with_requirement(mut self, resource_id: impl Into<String>, demand: u64) -> Self {
        self.resource_requirements
            .push(ResourceRequirement::new(resource_id, demand));
        self
    }

    /// Demand on `resource_id` summed over all requirements of this mode.
    pub fn demand_for(&self, resource_id: &str) -> u64 {
        self.resource_requirements
            .iter()
            .filter(|r| r.resource_id == resource_id)
            .fold(0u64, |acc, r| acc.saturating_add(r.demand))
    }
}

/// Per-period demand for a specific resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceRequirement {
    /// Referenced resource.
    pub resource_id: String,
    /// Units required per period.
    pub demand: u64,
}

impl ResourceRequirement {
    /// Creates a requirement.
    pub fn new(resource_id: impl Into<String>, demand: u64) -> Self {
        Self {
            resource_id: resource_id.into(),
            demand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_builder() {
        let mode = Mode::new("M1", "J1", 4)
            .with_cost(12.5)
            .with_requirement("R1", 2)
            .with_requirement("R2", 1);

        assert_eq!(mode.id, "M1");
        assert_eq!(mode.job_id, "J1");
        assert_eq!(mode.duration, 4);
        assert!((mode.cost - 12.5).abs() < 1e-10);
        assert_eq!(mode.resource_requirements.len(), 2);
        assert_eq!(mode.resource_requirements[1], ResourceRequirement::new("R2", 1));
    }

    #[test]
    fn test_demand_for() {
        let mode = Mode::new("M1", "J1", 1)
            .with_requirement("R1", 2)
            .with_requirement("R1", 3)
            .with_requirement("R2", 7);

        assert_eq!(mode.demand_for("R1"), 5);
        assert_eq!(mode.demand_for("R2"), 7);
        assert_eq!(mode.demand_for("R3"), 0);
    }

    #[test]
    fn test_requirements_default_empty() {
        let mode: Mode = serde_json::from_value(serde_json::json!({
            "mode_id": "M1", "job_id": "J1", "duration": 2, "cost": 0
        }))
        .unwrap();
        assert!(mode.resource_requirements.is_empty());
    }
}
