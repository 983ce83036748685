//! Job model.
//!
//! A job is a unit of work executed in exactly one of its modes. Jobs carry
//! an optional time window `[release_time, deadline]`.
//!
//! # Time Representation
//! All times are integer periods relative to the project start (t=0).

use serde::{Deserialize, Serialize};

/// A job to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    /// Unique job identifier.
    #[serde(rename = "job_id")]
    pub id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Earliest start period.
    #[serde(default)]
    pub release_time: u64,
    /// Latest finish period. `None` = unbounded.
    #[serde(default)]
    pub deadline: Option<u64>,
}

impl Job {
    /// Creates a job released at t=0 with no deadline.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            release_time: 0,
            deadline: None,
        }
    }

    /// Sets the job name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the release time.
    pub fn with_release_time(mut self, release_time: u64) -> Self {
        self.release_time = release_time;
        self
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Whether a job of `duration` periods fits in the window when started
    /// at `start`.
    pub fn fits(&self, start: u64, duration: u64) -> bool {
        match self.deadline {
            None => true,
            Some(deadline) => start.saturating_add(duration) <= deadline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_builder() {
        let job = Job::new("J1")
            .with_name("Pour foundation")
            .with_release_time(3)
            .with_deadline(10);

        assert_eq!(job.id, "J1");
        assert_eq!(job.name.as_deref(), Some("Pour foundation"));
        assert_eq!(job.release_time, 3);
        assert_eq!(job.deadline, Some(10));
    }

    #[test]
    fn test_defaults() {
        let job = Job::new("J1");
        assert_eq!(job.release_time, 0);
        assert_eq!(job.deadline, None);
    }

    #[test]
    fn test_fits() {
        let job = Job::new("J1").with_deadline(10);
        assert!(job.fits(0, 10));
        assert!(!job.fits(1, 10));
        assert!(Job::new("J2").fits(u64::MAX, u64::MAX));
    }

    #[test]
    fn test_deserialize_defaults() {
        let job: Job = serde_json::from_value(serde_json::json!({"job_id": "J1"})).unwrap();
        assert_eq!(job, Job::new("J1"));
    }
}
