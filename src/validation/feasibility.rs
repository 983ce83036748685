//! Consistency and feasibility pre-checks.
//!
//! Every check here flags an instance that is well-formed but provably
//! unsolvable. Bounds are computed with each job's fastest mode, so a
//! reported violation holds for every mode assignment.
//!
//! Temporal bounds use the earliest-start pass of CPM: `ES(s) = max(release(s),
//! ES(p) + minDur(p) + lag)` over all edges `p -> s`, evaluated in
//! topological order. On a cyclic graph only release times are used.
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-path planning and scheduling"

use std::collections::HashMap;
use tracing::debug;

use super::config::ValidationConfig;
use super::graph::{GraphAnalysis, PrecedenceGraph};
use super::references::EntityIndex;
use super::report::{Violation, ViolationKind};
use crate::models::{Instance, Job};

/// Runs the consistency battery.
pub fn check_feasibility(
    instance: &Instance,
    entities: &EntityIndex<'_>,
    analysis: &GraphAnalysis<'_>,
    config: &ValidationConfig,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let min_durations = instance.min_durations();
    let bounds = TimeBounds::compute(instance, entities, analysis, &min_durations);
    let horizon = instance
        .horizon
        .filter(|_| config.check_horizon && analysis.is_acyclic());

    // Findings are emitted entity by entity: jobs, then modes, then edges.
    for job in &instance.jobs {
        let min_duration = min_durations.get(job.id.as_str()).copied();
        if min_duration.is_none() {
            violations.push(Violation::new(
                ViolationKind::UnschedulableJob,
                [job.id.as_str()],
                format!("job '{}' has no execution mode", job.id),
            ));
        }
        if config.check_windows {
            job_window(job, min_duration, &mut violations);
        }
        if let (Some(horizon), Some(node)) = (horizon, analysis.graph.node(&job.id)) {
            horizon_overrun(&analysis.graph, &bounds, node, horizon, &mut violations);
        }
    }
    over_demand(instance, entities, &mut violations);
    if config.check_precedence_windows {
        precedence_windows(instance, entities, analysis, &bounds, &min_durations, &mut violations);
    }

    debug!(found = violations.len(), "feasibility check finished");
    violations
}

fn over_demand(instance: &Instance, entities: &EntityIndex<'_>, violations: &mut Vec<Violation>) {
    for (i, mode) in instance.modes.iter().enumerate() {
        let mut single_overruns = Vec::new();

        for (k, req) in mode.resource_requirements.iter().enumerate() {
            let Some(resource) = entities.resource(&req.resource_id) else {
                continue;
            };
            if !resource.can_supply(req.demand) {
                single_overruns.push(resource.id.as_str());
                violations.push(
                    Violation::new(
                        ViolationKind::InfeasibleDemand,
                        [mode.id.as_str(), resource.id.as_str()],
                        format!(
                            "mode '{}' demands {} of resource '{}' (capacity {})",
                            mode.id, req.demand, resource.id, resource.capacity
                        ),
                    )
                    .with_field(format!("modes[{i}].resource_requirements[{k}].demand")),
                );
            }
        }

        // Repeated requirements on one resource run at the same time.
        let mut seen: Vec<&str> = Vec::new();
        for req in &mode.resource_requirements {
            let id = req.resource_id.as_str();
            if seen.contains(&id) || single_overruns.contains(&id) {
                continue;
            }
            seen.push(id);
            let Some(resource) = entities.resource(id) else {
                continue;
            };
            let total = mode.demand_for(id);
            if !resource.can_supply(total) {
                violations.push(
                    Violation::new(
                        ViolationKind::InfeasibleDemand,
                        [mode.id.as_str(), id],
                        format!(
                            "mode '{}' demands {} of resource '{}' in total (capacity {})",
                            mode.id, total, id, resource.capacity
                        ),
                    )
                    .with_field(format!("modes[{i}].resource_requirements")),
                );
            }
        }
    }
}

fn job_window(job: &Job, min_duration: Option<u64>, violations: &mut Vec<Violation>) {
    let (Some(deadline), Some(duration)) = (job.deadline, min_duration) else {
        return;
    };
    if !job.fits(job.release_time, duration) {
        violations.push(Violation::new(
            ViolationKind::InfeasibleWindow,
            [job.id.as_str()],
            format!(
                "job '{}' released at {} needs at least {} period(s) but must finish by {}",
                job.id, job.release_time, duration, deadline
            ),
        ));
    }
}

/// Earliest start per graph node, plus the predecessor that set it.
struct TimeBounds {
    earliest_start: Vec<u64>,
    earliest_finish: Vec<u64>,
    critical_predecessor: Vec<Option<usize>>,
}

impl TimeBounds {
    fn compute(
        instance: &Instance,
        entities: &EntityIndex<'_>,
        analysis: &GraphAnalysis<'_>,
        min_durations: &HashMap<&str, u64>,
    ) -> Self {
        let graph = &analysis.graph;
        let n = graph.node_count();
        let duration: Vec<u64> = (0..n)
            .map(|v| min_durations.get(graph.id(v)).copied().unwrap_or(0))
            .collect();
        let mut earliest_start: Vec<u64> = (0..n)
            .map(|v| entities.job(graph.id(v)).map_or(0, |j| j.release_time))
            .collect();
        let mut critical_predecessor = vec![None; n];

        if let Some(order) = &analysis.order {
            for &v in order {
                let finish = earliest_start[v].saturating_add(duration[v]);
                for arc in graph.successors(v) {
                    let start = finish.saturating_add(arc.lag);
                    if start > earliest_start[arc.node] {
                        earliest_start[arc.node] = start;
                        critical_predecessor[arc.node] = Some(v);
                    }
                }
            }
        }

        let earliest_finish = (0..n)
            .map(|v| earliest_start[v].saturating_add(duration[v]))
            .collect();
        debug!(jobs = instance.jobs.len(), propagated = analysis.is_acyclic(), "time bounds computed");

        Self {
            earliest_start,
            earliest_finish,
            critical_predecessor,
        }
    }

    fn chain(&self, graph: &PrecedenceGraph<'_>, node: usize) -> Vec<String> {
        let mut chain = vec![graph.id(node).to_string()];
        let mut current = node;
        while let Some(p) = self.critical_predecessor[current] {
            chain.push(graph.id(p).to_string());
            current = p;
        }
        chain.reverse();
        chain
    }
}

fn precedence_windows(
    instance: &Instance,
    entities: &EntityIndex<'_>,
    analysis: &GraphAnalysis<'_>,
    bounds: &TimeBounds,
    min_durations: &HashMap<&str, u64>,
    violations: &mut Vec<Violation>,
) {
    let graph = &analysis.graph;

    for (i, p) in instance.precedences.iter().enumerate() {
        if p.is_self_loop() {
            continue;
        }
        let (Some(from), Some(successor)) = (graph.node(&p.predecessor), entities.job(&p.successor))
        else {
            continue;
        };
        let Some(deadline) = successor.deadline else {
            continue;
        };
        let (Some(&pred_duration), Some(&succ_duration)) = (
            min_durations.get(p.predecessor.as_str()),
            min_durations.get(p.successor.as_str()),
        ) else {
            continue;
        };

        let earliest_succ_start = bounds.earliest_start[from]
            .saturating_add(pred_duration)
            .saturating_add(p.lag);
        let earliest_succ_finish = earliest_succ_start.saturating_add(succ_duration);
        if earliest_succ_finish > deadline {
            violations.push(
                Violation::new(
                    ViolationKind::InfeasiblePrecedenceWindow,
                    [p.predecessor.as_str(), p.successor.as_str()],
                    format!(
                        "job '{}' cannot start before {} after '{}' (lag {}) and so cannot \
                         finish before {}, past its deadline {}",
                        p.successor,
                        earliest_succ_start,
                        p.predecessor,
                        p.lag,
                        earliest_succ_finish,
                        deadline
                    ),
                )
                .with_field(format!("precedences[{i}]")),
            );
        }
    }
}

fn horizon_overrun(
    graph: &PrecedenceGraph<'_>,
    bounds: &TimeBounds,
    v: usize,
    horizon: u64,
    violations: &mut Vec<Violation>,
) {
    if bounds.earliest_finish[v] <= horizon {
        return;
    }
    // Report only where a chain first crosses the horizon.
    let upstream_over = graph
        .predecessors(v)
        .iter()
        .any(|arc| bounds.earliest_finish[arc.node] > horizon);
    if upstream_over {
        return;
    }
    let chain = bounds.chain(graph, v);
    violations.push(Violation::new(
        ViolationKind::HorizonExceeded,
        [graph.id(v)],
        format!(
            "job '{}' cannot finish before {}, beyond horizon {} (chain: {})",
            graph.id(v),
            bounds.earliest_finish[v],
            horizon,
            chain.join(" -> ")
        ),
    ));
}
