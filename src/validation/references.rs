//! Reference resolver.
//!
//! Two passes: build identifier lookup tables, then check every foreign key
//! against them. The first declaration of an identifier wins; later ones
//! are reported as duplicates and otherwise ignored by the later checkers.

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use super::report::{Violation, ViolationKind};
use crate::models::{Instance, Job, Mode, Resource};

/// Identifier → entity lookup tables for one instance.
#[derive(Debug)]
pub struct EntityIndex<'a> {
    resources: HashMap<&'a str, &'a Resource>,
    jobs: HashMap<&'a str, &'a Job>,
    modes: HashMap<&'a str, &'a Mode>,
}

impl<'a> EntityIndex<'a> {
    /// Builds the lookup tables.
    pub fn build(instance: &'a Instance) -> Self {
        let mut resources = HashMap::with_capacity(instance.resources.len());
        for r in &instance.resources {
            resources.entry(r.id.as_str()).or_insert(r);
        }
        let mut jobs = HashMap::with_capacity(instance.jobs.len());
        for j in &instance.jobs {
            jobs.entry(j.id.as_str()).or_insert(j);
        }
        let mut modes = HashMap::with_capacity(instance.modes.len());
        for m in &instance.modes {
            modes.entry(m.id.as_str()).or_insert(m);
        }
        Self {
            resources,
            jobs,
            modes,
        }
    }

    /// Looks up a resource.
    pub fn resource(&self, id: &str) -> Option<&'a Resource> {
        self.resources.get(id).copied()
    }

    /// Looks up a job.
    pub fn job(&self, id: &str) -> Option<&'a Job> {
        self.jobs.get(id).copied()
    }

    /// Looks up a mode.
    pub fn mode(&self, id: &str) -> Option<&'a Mode> {
        self.modes.get(id).copied()
    }

    /// Whether `id` names a declared job.
    pub fn has_job(&self, id: &str) -> bool {
        self.jobs.contains_key(id)
    }
}

/// Reports duplicate identifiers and dangling foreign keys, entity by
/// entity in declaration order.
pub fn check_references(instance: &Instance, index: &EntityIndex<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    violations.extend(
        duplicates(
            "resource",
            "resources",
            "resource_id",
            instance.resources.iter().map(|r| r.id.as_str()),
        )
        .into_values(),
    );
    violations.extend(
        duplicates(
            "job",
            "jobs",
            "job_id",
            instance.jobs.iter().map(|j| j.id.as_str()),
        )
        .into_values(),
    );
    let mut mode_duplicates = duplicates(
        "mode",
        "modes",
        "mode_id",
        instance.modes.iter().map(|m| m.id.as_str()),
    );

    for (i, mode) in instance.modes.iter().enumerate() {
        if let Some(duplicate) = mode_duplicates.remove(&i) {
            violations.push(duplicate);
        }
        if !index.has_job(&mode.job_id) {
            violations.push(
                Violation::new(
                    ViolationKind::DanglingReference,
                    [mode.id.as_str(), mode.job_id.as_str()],
                    format!("mode '{}' references unknown job '{}'", mode.id, mode.job_id),
                )
                .with_field(format!("modes[{i}].job_id")),
            );
        }
        for (k, req) in mode.resource_requirements.iter().enumerate() {
            if index.resource(&req.resource_id).is_none() {
                violations.push(
                    Violation::new(
                        ViolationKind::DanglingReference,
                        [mode.id.as_str(), req.resource_id.as_str()],
                        format!(
                            "mode '{}' requires unknown resource '{}'",
                            mode.id, req.resource_id
                        ),
                    )
                    .with_field(format!("modes[{i}].resource_requirements[{k}].resource_id")),
                );
            }
        }
    }

    for (i, p) in instance.precedences.iter().enumerate() {
        for (field, target) in [("predecessor", &p.predecessor), ("successor", &p.successor)] {
            if !index.has_job(target) {
                violations.push(
                    Violation::new(
                        ViolationKind::DanglingReference,
                        [p.predecessor.as_str(), p.successor.as_str(), target.as_str()],
                        format!(
                            "precedence {} -> {} references unknown {field} job '{target}'",
                            p.predecessor, p.successor
                        ),
                    )
                    .with_field(format!("precedences[{i}].{field}")),
                );
            }
        }
    }

    debug!(found = violations.len(), "reference check finished");
    violations
}

/// One violation per duplicated identifier, keyed by the position of its
/// second declaration.
fn duplicates<'a>(
    noun: &str,
    collection: &str,
    key: &str,
    ids: impl Iterator<Item = &'a str>,
) -> BTreeMap<usize, Violation> {
    let mut violations = BTreeMap::new();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut reported: HashSet<&str> = HashSet::new();

    for (i, id) in ids.enumerate() {
        match first_seen.get(id) {
            None => {
                first_seen.insert(id, i);
            }
            Some(&first) => {
                if reported.insert(id) {
                    violations.insert(
                        i,
                        Violation::new(
                            ViolationKind::DuplicateIdentifier,
                            [id],
                            format!(
                                "{noun} id '{id}' is declared more than once \
                                 ({collection}[{first}] and {collection}[{i}])"
                            ),
                        )
                        .with_field(format!("{collection}[{i}].{key}")),
                    );
                }
            }
        }
    }
    violations
}
