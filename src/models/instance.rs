//! Problem instance (aggregate root).
//!
//! An instance owns the four entity collections. The validator only ever
//! borrows it; nothing in this crate mutates an instance after it is built.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Job, Mode, Precedence, Resource};

/// A complete MM-RCPSP instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Instance {
    /// Optional instance label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_name: Option<String>,
    /// Planning horizon (maximum number of periods).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<u64>,
    /// Renewable resources.
    pub resources: Vec<Resource>,
    /// Jobs to schedule.
    pub jobs: Vec<Job>,
    /// Execution modes.
    pub modes: Vec<Mode>,
    /// Precedence edges.
    #[serde(default)]
    pub precedences: Vec<Precedence>,
}

impl Instance {
    /// Creates an empty instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the problem name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.problem_name = Some(name.into());
        self
    }

    /// Sets the planning horizon.
    pub fn with_horizon(mut self, horizon: u64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Adds a resource.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Adds a job.
    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// Adds a mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.modes.push(mode);
        self
    }

    /// Adds a precedence edge.
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedences.push(precedence);
        self
    }

    /// Modes declared for `job_id`, in declaration order.
    pub fn modes_of<'a>(&'a self, job_id: &'a str) -> impl Iterator<Item = &'a Mode> + 'a {
        self.modes.iter().filter(move |m| m.job_id == job_id)
    }

    /// Shortest duration over the job's modes. `None` if the job has no mode.
    pub fn min_duration(&self, job_id: &str) -> Option<u64> {
        self.modes_of(job_id).map(|m| m.duration).min()
    }

    /// [`min_duration`](Self::min_duration) for every job in one pass.
    /// Jobs without modes are absent.
    pub fn min_durations(&self) -> HashMap<&str, u64> {
        let mut durations: HashMap<&str, u64> = HashMap::with_capacity(self.jobs.len());
        for mode in &self.modes {
            durations
                .entry(mode.job_id.as_str())
                .and_modify(|d| *d = (*d).min(mode.duration))
                .or_insert(mode.duration);
        }
        durations
    }

    /// Serializes the instance into the input document format.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Instance {
        Instance::new()
            .with_name("sample")
            .with_horizon(20)
            .with_resource(Resource::new("R1", 5))
            .with_job(Job::new("J1"))
            .with_job(Job::new("J2"))
            .with_job(Job::new("J3"))
            .with_mode(Mode::new("M1", "J1", 4))
            .with_mode(Mode::new("M2", "J1", 2).with_requirement("R1", 5))
            .with_mode(Mode::new("M3", "J2", 0))
            .with_precedence(Precedence::new("J1", "J2"))
    }

    #[test]
    fn test_instance_builder() {
        let inst = sample();
        assert_eq!(inst.problem_name.as_deref(), Some("sample"));
        assert_eq!(inst.horizon, Some(20));
        assert_eq!(inst.resources.len(), 1);
        assert_eq!(inst.jobs.len(), 3);
        assert_eq!(inst.modes.len(), 3);
        assert_eq!(inst.precedences.len(), 1);
    }

    #[test]
    fn test_modes_of() {
        let inst = sample();
        let ids: Vec<&str> = inst.modes_of("J1").map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M2"]);
        assert_eq!(inst.modes_of("J3").count(), 0);
    }

    #[test]
    fn test_min_duration() {
        let inst = sample();
        assert_eq!(inst.min_duration("J1"), Some(2));
        assert_eq!(inst.min_duration("J2"), Some(0));
        assert_eq!(inst.min_duration("J3"), None);
    }

    #[test]
    fn test_min_durations_agree_with_min_duration() {
        let inst = sample();
        let all = inst.min_durations();
        for job in &inst.jobs {
            assert_eq!(all.get(job.id.as_str()).copied(), inst.min_duration(&job.id));
        }
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_to_json_omits_absent_optionals() {
        let value = Instance::new().with_job(Job::new("J1")).to_json().unwrap();
        assert!(value.get("horizon").is_none());
        assert!(value.get("problem_name").is_none());
        assert_eq!(value["jobs"][0]["deadline"], serde_json::Value::Null);
        assert_eq!(value["precedences"], serde_json::json!([]));
    }
}
