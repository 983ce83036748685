//! Random and structured instance generators.
//!
//! Every generated instance is valid by construction:
//! - edges only go from a lower to a higher job index (acyclic)
//! - every job gets at least one mode
//! - demands never exceed capacity
//! - the horizon (and any deadline) is an upper bound on a serial schedule
//!   of all jobs in their slowest modes, so no time bound can be violated
//!
//! Used by property tests and for benchmarking the validator on large inputs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{Instance, Job, Mode, Precedence, Resource};

/// Shape parameters for [`InstanceGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Number of jobs.
    pub jobs: usize,
    /// Number of resources (at least 1 is always generated).
    pub resources: usize,
    /// Inclusive range of modes per job (minimum clamped to 1).
    pub modes_per_job: (usize, usize),
    /// Largest mode duration.
    pub max_duration: u64,
    /// Largest resource capacity.
    pub max_capacity: u64,
    /// Largest release time.
    pub max_release: u64,
    /// Largest precedence lag.
    pub max_lag: u64,
    /// Probability of an edge between two jobs `i < j`.
    pub edge_probability: f64,
    /// Probability that a job gets a deadline.
    pub deadline_probability: f64,
    /// Whether to declare a horizon.
    pub with_horizon: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            jobs: 20,
            resources: 3,
            modes_per_job: (1, 3),
            max_duration: 10,
            max_capacity: 10,
            max_release: 5,
            max_lag: 3,
            edge_probability: 0.15,
            deadline_probability: 0.3,
            with_horizon: true,
        }
    }
}

/// Seeded generator of random valid instances.
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl InstanceGenerator {
    /// Creates a generator with the given shape and seed.
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a generator with the default shape.
    pub fn seeded(seed: u64) -> Self {
        Self::new(GeneratorConfig::default(), seed)
    }

    /// Generates the next instance.
    pub fn generate(&mut self) -> Instance {
        let cfg = self.config.clone();
        let mut inst = Instance::new().with_name(format!("generated_{}", cfg.jobs));

        for r in 0..cfg.resources.max(1) {
            let capacity = self.rng.random_range(1..=cfg.max_capacity.max(1));
            inst = inst.with_resource(Resource::new(format!("R{r}"), capacity));
        }

        let (min_modes, max_modes) = (cfg.modes_per_job.0.max(1), cfg.modes_per_job.1);
        let mut serial_length = 0u64;
        let mut max_release = 0u64;

        for j in 0..cfg.jobs {
            let job_id = format!("J{j}");
            let release = self.rng.random_range(0..=cfg.max_release);
            max_release = max_release.max(release);
            inst = inst.with_job(Job::new(job_id.clone()).with_release_time(release));

            let mode_count = self.rng.random_range(min_modes..=max_modes.max(min_modes));
            let mut slowest = 0u64;
            for m in 0..mode_count {
                let duration = self.rng.random_range(0..=cfg.max_duration);
                slowest = slowest.max(duration);
                let cost = (self.rng.random::<f64>() * 10_000.0).round() / 100.0;
                let mut mode = Mode::new(format!("{job_id}_M{m}"), job_id.clone(), duration)
                    .with_cost(cost);
                for resource in &inst.resources {
                    if self.rng.random_bool(0.5) {
                        let demand = self.rng.random_range(0..=resource.capacity);
                        mode = mode.with_requirement(resource.id.clone(), demand);
                    }
                }
                inst.modes.push(mode);
            }
            serial_length = serial_length.saturating_add(slowest);
        }

        for i in 0..cfg.jobs {
            for j in (i + 1)..cfg.jobs {
                if self.rng.random_bool(cfg.edge_probability.clamp(0.0, 1.0)) {
                    let lag = self.rng.random_range(0..=cfg.max_lag);
                    serial_length = serial_length.saturating_add(lag);
                    inst = inst.with_precedence(
                        Precedence::new(format!("J{i}"), format!("J{j}")).with_lag(lag),
                    );
                }
            }
        }

        let bound = max_release.saturating_add(serial_length).max(1);
        if cfg.with_horizon {
            inst.horizon = Some(bound);
        }
        let deadline_probability = cfg.deadline_probability.clamp(0.0, 1.0);
        for job in &mut inst.jobs {
            if self.rng.random_bool(deadline_probability) {
                job.deadline = Some(bound);
            }
        }

        inst
    }
}

/// Linear chain `J0 -> J1 -> ... -> Jn-1`, one unit-duration mode per job.
pub fn chain(jobs: usize) -> Instance {
    let mut inst = Instance::new()
        .with_name("chain")
        .with_resource(Resource::new("R0", 1));
    for i in 0..jobs {
        inst = inst
            .with_job(Job::new(format!("J{i}")))
            .with_mode(Mode::new(format!("M{i}"), format!("J{i}"), 1).with_requirement("R0", 1));
        if i > 0 {
            inst = inst.with_precedence(Precedence::new(format!("J{}", i - 1), format!("J{i}")));
        }
    }
    inst
}

/// Diamond `start -> [P0..Pn-1] -> end`, one unit-duration mode per job.
pub fn diamond(parallel: usize) -> Instance {
    let mut inst = Instance::new()
        .with_name("diamond")
        .with_resource(Resource::new("R0", 1))
        .with_job(Job::new("start"))
        .with_job(Job::new("end"))
        .with_mode(Mode::new("M_start", "start", 1))
        .with_mode(Mode::new("M_end", "end", 1));
    for i in 0..parallel {
        let id = format!("P{i}");
        inst = inst
            .with_job(Job::new(id.clone()))
            .with_mode(Mode::new(format!("M_{id}"), id.clone(), 1).with_requirement("R0", 1))
            .with_precedence(Precedence::new("start", id.clone()))
            .with_precedence(Precedence::new(id, "end"));
    }
    inst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_instance;

    #[test]
    fn test_generated_instances_are_valid() {
        for seed in 0..50 {
            let inst = InstanceGenerator::seeded(seed).generate();
            let report = validate_instance(&inst);
            assert!(report.is_valid(), "seed {seed}: {report}");
        }
    }

    #[test]
    fn test_dense_generated_instances_are_valid() {
        let config = GeneratorConfig {
            jobs: 60,
            resources: 5,
            modes_per_job: (1, 4),
            edge_probability: 0.5,
            deadline_probability: 1.0,
            ..GeneratorConfig::default()
        };
        for seed in 0..10 {
            let inst = InstanceGenerator::new(config.clone(), seed).generate();
            assert!(validate_instance(&inst).is_valid(), "seed {seed}");
        }
    }

    #[test]
    fn test_same_seed_same_instance() {
        let a = InstanceGenerator::seeded(7).generate();
        let b = InstanceGenerator::seeded(7).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shape() {
        let config = GeneratorConfig {
            jobs: 12,
            resources: 2,
            modes_per_job: (2, 2),
            with_horizon: false,
            ..GeneratorConfig::default()
        };
        let inst = InstanceGenerator::new(config, 3).generate();

        assert_eq!(inst.jobs.len(), 12);
        assert_eq!(inst.resources.len(), 2);
        assert_eq!(inst.modes.len(), 24);
        assert_eq!(inst.horizon, None);
    }

    #[test]
    fn test_chain_and_diamond() {
        let c = chain(5);
        assert_eq!(c.precedences.len(), 4);
        assert!(validate_instance(&c).is_valid());

        let d = diamond(4);
        assert_eq!(d.jobs.len(), 6);
        assert_eq!(d.precedences.len(), 8);
        assert!(validate_instance(&d).is_valid());
    }
}
