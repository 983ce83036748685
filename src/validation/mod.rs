//! Input validation for MM-RCPSP instances.
//!
//! Runs the checkers in their fixed sequence and merges their findings:
//!
//! 1. [`syntax`]: schema-level checks; the only phase that can stop
//!    validation, when no typed instance can be built
//! 2. [`references`]: duplicate identifiers, dangling foreign keys
//! 3. [`graph`]: self-loops and precedence cycles
//! 4. [`feasibility`]: orphan jobs, over-demand, time windows, horizon
//!
//! Phases 2-4 never short-circuit: one call reports every defect.
//! The assembled [`ValidationReport`] is ordered by phase, then by
//! declaration order, independent of the order the checkers ran in.
//!
//! # Reference
//! Kolisch & Hartmann (2006), "Experimental investigation of heuristics for
//! resource-constrained project scheduling: An update"

mod config;
pub mod feasibility;
pub mod graph;
pub mod identifier;
pub mod references;
mod report;
pub mod syntax;

pub use config::ValidationConfig;
pub use report::{Phase, ValidationReport, Violation, ViolationKind};

use serde_json::Value;
use tracing::{debug, info};

use crate::models::Instance;
use references::EntityIndex;

/// Validator bound to a configuration.
///
/// Holds no state between calls; validating the same input twice yields
/// identical reports.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Creates a validator.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates a raw document.
    pub fn validate(&self, document: &Value) -> ValidationReport {
        match syntax::parse_instance_with(document, &self.config) {
            Ok(instance) => self.validate_instance(&instance),
            Err(err) => {
                info!(defects = err.defects.len(), "input is malformed");
                ValidationReport::from(err)
            }
        }
    }

    /// Validates an already-typed instance.
    pub fn validate_instance(&self, instance: &Instance) -> ValidationReport {
        debug!(
            resources = instance.resources.len(),
            jobs = instance.jobs.len(),
            modes = instance.modes.len(),
            precedences = instance.precedences.len(),
            "validating instance"
        );

        let mut violations = syntax::check_instance(instance);
        let entities = EntityIndex::build(instance);

        let (reference_violations, semantic_violations) = self.join(
            || references::check_references(instance, &entities),
            || {
                let analysis = graph::analyze(instance, &entities);
                let mut found =
                    feasibility::check_feasibility(instance, &entities, &analysis, &self.config);
                let mut graph_violations = analysis.violations;
                graph_violations.append(&mut found);
                graph_violations
            },
        );
        violations.extend(reference_violations);
        violations.extend(semantic_violations);

        let report = ValidationReport::assemble(violations);
        info!(
            violations = report.len(),
            valid = report.is_valid(),
            "validation finished"
        );
        report
    }

    #[cfg(feature = "parallel")]
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        if self.config.parallel {
            rayon::join(a, b)
        } else {
            (a(), b())
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA,
        B: FnOnce() -> RB,
    {
        (a(), b())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, Mode, Precedence, Resource};
    use serde_json::json;

    fn sample() -> Instance {
        Instance::new()
            .with_resource(Resource::new("R1", 5))
            .with_job(Job::new("J1"))
            .with_job(Job::new("J2"))
            .with_mode(Mode::new("M1", "J1", 2).with_requirement("R1", 3))
            .with_mode(Mode::new("M2", "J2", 1))
            .with_precedence(Precedence::new("J1", "J2"))
    }

    #[test]
    fn test_valid_instance() {
        let report = Validator::default().validate_instance(&sample());
        assert!(report.is_valid());
    }

    #[test]
    fn test_malformed_input_stops_early() {
        let report = Validator::default().validate(&json!({"jobs": [{"job_id": "J1"}]}));

        assert!(!report.is_valid());
        assert_eq!(report.kinds(), vec![ViolationKind::MalformedInput]);
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_all_phases_reported_in_order() {
        let inst = sample()
            .with_resource(Resource::new("R1", 2))
            .with_job(Job::new("J3"))
            .with_mode(Mode::new("M9", "J1", 1).with_requirement("R1", 6))
            .with_precedence(Precedence::new("J2", "J1"))
            .with_precedence(Precedence::new("J2", "J8"))
            .with_precedence(Precedence::new("J2", "J2"));
        let report = Validator::default().validate_instance(&inst);

        assert_eq!(
            report.kinds(),
            vec![
                ViolationKind::DuplicateIdentifier,
                ViolationKind::DanglingReference,
                ViolationKind::SelfLoop,
                ViolationKind::CyclicDependency,
                ViolationKind::UnschedulableJob,
                ViolationKind::InfeasibleDemand,
            ]
        );
        let phases: Vec<Phase> = report.violations().iter().map(Violation::phase).collect();
        let mut sorted = phases.clone();
        sorted.sort();
        assert_eq!(phases, sorted);
    }

    #[test]
    fn test_typed_instance_syntax_defects_do_not_halt() {
        let inst = sample().with_job(Job::new("9lives"));
        let report = Validator::default().validate_instance(&inst);

        assert_eq!(
            report.kinds(),
            vec![ViolationKind::MalformedInput, ViolationKind::UnschedulableJob]
        );
    }

    #[test]
    fn test_idempotent() {
        let inst = sample()
            .with_precedence(Precedence::new("J2", "J1"))
            .with_job(Job::new("J4"));
        let validator = Validator::default();

        let first = serde_json::to_string(&validator.validate_instance(&inst)).unwrap();
        let second = serde_json::to_string(&validator.validate_instance(&inst)).unwrap();
        assert_eq!(first, second);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let inst = sample()
            .with_precedence(Precedence::new("J2", "J1"))
            .with_mode(Mode::new("M3", "J7", 1));
        let sequential = Validator::default().validate_instance(&inst);
        let parallel =
            Validator::new(ValidationConfig::new().with_parallel(true)).validate_instance(&inst);
        assert_eq!(sequential, parallel);
    }
}
