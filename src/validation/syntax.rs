//! Syntactic checker: raw document → typed [`Instance`].
//!
//! Walks a `serde_json::Value` against the input schema and records every
//! defect it meets instead of stopping at the first one. Declared defaults
//! (`release_time`, `deadline`, `lag`, `resource_requirements`) are filled
//! in here.
//!
//! The only early exit is a document that is not an object or lacks one of
//! the top-level keys `resources`, `jobs`, `modes`.

use serde_json::{Map, Value};
use tracing::debug;

use super::config::ValidationConfig;
use super::identifier::{is_valid_identifier, IDENTIFIER_PATTERN};
use super::report::Violation;
use crate::error::{MalformedInputError, SyntaxDefect};
use crate::models::{Instance, Job, Mode, Precedence, Resource, ResourceRequirement};

const TOP_LEVEL_KEYS: &[&str] = &[
    "problem_name",
    "horizon",
    "resources",
    "jobs",
    "modes",
    "precedences",
];
const REQUIRED_KEYS: &[&str] = &["resources", "jobs", "modes"];
const RESOURCE_KEYS: &[&str] = &["resource_id", "name", "capacity"];
const JOB_KEYS: &[&str] = &["job_id", "name", "release_time", "deadline"];
const MODE_KEYS: &[&str] = &["mode_id", "job_id", "duration", "cost", "resource_requirements"];
const REQUIREMENT_KEYS: &[&str] = &["resource_id", "demand"];
const PRECEDENCE_KEYS: &[&str] = &["predecessor", "successor", "lag"];

// Keys naming the entity a defect belongs to.
const RESOURCE_ID: &[&str] = &["resource_id"];
const JOB_ID: &[&str] = &["job_id"];
const MODE_ID: &[&str] = &["mode_id"];
const PRECEDENCE_ENDS: &[&str] = &["predecessor", "successor"];

/// Parses a document with the default configuration.
pub fn parse_instance(document: &Value) -> Result<Instance, MalformedInputError> {
    parse_instance_with(document, &ValidationConfig::default())
}

/// Parses JSON text. Invalid JSON is reported as a single defect.
pub fn parse_instance_str(text: &str) -> Result<Instance, MalformedInputError> {
    let document: Value = serde_json::from_str(text).map_err(|e| {
        MalformedInputError::new(vec![SyntaxDefect::new("", format!("invalid JSON: {e}"))])
    })?;
    parse_instance(&document)
}

/// Parses a document into a typed instance, collecting every defect.
pub fn parse_instance_with(
    document: &Value,
    config: &ValidationConfig,
) -> Result<Instance, MalformedInputError> {
    let Some(root) = document.as_object() else {
        return Err(MalformedInputError::new(vec![SyntaxDefect::new(
            "",
            format!("document must be an object, found {}", type_name(document)),
        )]));
    };

    let missing: Vec<SyntaxDefect> = REQUIRED_KEYS
        .iter()
        .filter(|key| !root.contains_key(**key))
        .map(|key| SyntaxDefect::new(*key, "required field is missing"))
        .collect();
    if !missing.is_empty() {
        debug!(missing = missing.len(), "top-level keys absent, skipping normalization");
        return Err(MalformedInputError::new(missing));
    }

    let mut reader = Reader::default();
    reader.reject_unknown("", root, TOP_LEVEL_KEYS);

    let problem_name = root
        .get("problem_name")
        .and_then(|v| reader.string("problem_name", v));
    let horizon = root.get("horizon").and_then(|v| reader.integer("horizon", v, 1));

    let resources = reader.entries("resources", &root["resources"], 1, RESOURCE_ID, Reader::resource);
    let jobs = reader.entries("jobs", &root["jobs"], 1, JOB_ID, Reader::job);
    let modes = reader.entries("modes", &root["modes"], 1, MODE_ID, Reader::mode);
    let precedences = match root.get("precedences") {
        Some(v) => reader.entries("precedences", v, 0, PRECEDENCE_ENDS, Reader::precedence),
        None => Vec::new(),
    };

    if config.strict_unique_items {
        for key in ["resources", "jobs", "modes"] {
            reader.unique_items(key, &root[key]);
        }
    }

    if !reader.defects.is_empty() {
        debug!(defects = reader.defects.len(), "document rejected");
        return Err(MalformedInputError::new(reader.defects));
    }

    Ok(Instance {
        problem_name,
        horizon,
        resources,
        jobs,
        modes,
        precedences,
    })
}

/// Re-checks what the typed model cannot enforce on an instance built in
/// code: identifier pattern, empty references, empty collections, horizon
/// and cost ranges.
pub fn check_instance(instance: &Instance) -> Vec<Violation> {
    let mut defects = Vec::new();

    if instance.horizon == Some(0) {
        defects.push(SyntaxDefect::new("horizon", "must be >= 1, found 0"));
    }
    for (key, len) in [
        ("resources", instance.resources.len()),
        ("jobs", instance.jobs.len()),
        ("modes", instance.modes.len()),
    ] {
        if len == 0 {
            defects.push(SyntaxDefect::new(key, "must contain at least 1 item"));
        }
    }

    for (i, r) in instance.resources.iter().enumerate() {
        let start = defects.len();
        check_identifier(&mut defects, &format!("resources[{i}].resource_id"), &r.id);
        tag(&mut defects[start..], &[r.id.as_str()]);
    }
    for (i, j) in instance.jobs.iter().enumerate() {
        let start = defects.len();
        check_identifier(&mut defects, &format!("jobs[{i}].job_id"), &j.id);
        tag(&mut defects[start..], &[j.id.as_str()]);
    }
    for (i, m) in instance.modes.iter().enumerate() {
        let start = defects.len();
        let path = format!("modes[{i}]");
        check_identifier(&mut defects, &format!("{path}.mode_id"), &m.id);
        check_reference(&mut defects, &format!("{path}.job_id"), &m.job_id);
        if !m.cost.is_finite() || m.cost < 0.0 {
            defects.push(SyntaxDefect::new(
                format!("{path}.cost"),
                format!("must be a finite number >= 0, found {}", m.cost),
            ));
        }
        for (k, req) in m.resource_requirements.iter().enumerate() {
            check_reference(
                &mut defects,
                &format!("{path}.resource_requirements[{k}].resource_id"),
                &req.resource_id,
            );
        }
        tag(&mut defects[start..], &[m.id.as_str()]);
    }
    for (i, p) in instance.precedences.iter().enumerate() {
        let start = defects.len();
        check_reference(&mut defects, &format!("precedences[{i}].predecessor"), &p.predecessor);
        check_reference(&mut defects, &format!("precedences[{i}].successor"), &p.successor);
        tag(&mut defects[start..], &[p.predecessor.as_str(), p.successor.as_str()]);
    }

    defects.into_iter().map(Violation::from).collect()
}

/// Attributes untagged defects to an entity whose ids are all non-empty.
fn tag(defects: &mut [SyntaxDefect], ids: &[&str]) {
    if ids.iter().any(|id| id.is_empty()) {
        return;
    }
    for defect in defects.iter_mut().filter(|d| d.entities.is_empty()) {
        defect.entities = ids.iter().map(|id| id.to_string()).collect();
    }
}

fn check_identifier(defects: &mut Vec<SyntaxDefect>, path: &str, id: &str) {
    if !is_valid_identifier(id) {
        defects.push(SyntaxDefect::new(
            path,
            format!("'{id}' does not match {IDENTIFIER_PATTERN}"),
        ));
    }
}

fn check_reference(defects: &mut Vec<SyntaxDefect>, path: &str, id: &str) {
    if id.is_empty() {
        defects.push(SyntaxDefect::new(path, "must not be empty"));
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn entity_ids<'v>(item: &'v Value, keys: &[&str]) -> Vec<&'v str> {
    let ids: Vec<&str> = keys
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .filter(|id| !id.is_empty())
        .collect();
    if ids.len() == keys.len() {
        ids
    } else {
        Vec::new()
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Defect accumulator with typed field readers.
///
/// Every reader returns `None` after recording a defect, so entity parsers
/// can read all their fields before deciding whether the entity is usable.
#[derive(Default)]
struct Reader {
    defects: Vec<SyntaxDefect>,
}

impl Reader {
    fn defect(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.defects.push(SyntaxDefect::new(path, message));
    }

    fn object<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v Map<String, Value>> {
        let obj = value.as_object();
        if obj.is_none() {
            self.defect(path, format!("expected object, found {}", type_name(value)));
        }
        obj
    }

    fn reject_unknown(&mut self, path: &str, obj: &Map<String, Value>, allowed: &[&str]) {
        for key in obj.keys() {
            if !allowed.contains(&key.as_str()) {
                self.defect(child(path, key), "unknown field");
            }
        }
    }

    fn required<'v>(
        &mut self,
        path: &str,
        obj: &'v Map<String, Value>,
        key: &str,
    ) -> Option<&'v Value> {
        let value = obj.get(key);
        if value.is_none() {
            self.defect(child(path, key), "required field is missing");
        }
        value
    }

    fn string(&mut self, path: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.defect(path, format!("expected string, found {}", type_name(other)));
                None
            }
        }
    }

    fn identifier(&mut self, path: &str, value: &Value) -> Option<String> {
        let id = self.string(path, value)?;
        if !is_valid_identifier(&id) {
            self.defect(path, format!("'{id}' does not match {IDENTIFIER_PATTERN}"));
            return None;
        }
        Some(id)
    }

    fn reference(&mut self, path: &str, value: &Value) -> Option<String> {
        let id = self.string(path, value)?;
        if id.is_empty() {
            self.defect(path, "must not be empty");
            return None;
        }
        Some(id)
    }

    /// Integer with a lower bound. Integral floats such as `2.0` count as
    /// integers.
    fn integer(&mut self, path: &str, value: &Value, minimum: u64) -> Option<u64> {
        let Value::Number(n) = value else {
            self.defect(path, format!("expected integer, found {}", type_name(value)));
            return None;
        };

        let parsed = if let Some(u) = n.as_u64() {
            Ok(u)
        } else if n.as_i64().is_some() {
            Err(format!("must be >= {minimum}, found {n}"))
        } else {
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f < 0.0 => {
                    Err(format!("must be >= {minimum}, found {n}"))
                }
                Some(f) if f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
                _ => Err(format!("expected integer, found {n}")),
            }
        };

        match parsed {
            Ok(u) if u >= minimum => Some(u),
            Ok(u) => {
                self.defect(path, format!("must be >= {minimum}, found {u}"));
                None
            }
            Err(message) => {
                self.defect(path, message);
                None
            }
        }
    }

    fn non_negative_number(&mut self, path: &str, value: &Value) -> Option<f64> {
        match value.as_f64() {
            Some(f) if f >= 0.0 => Some(f),
            Some(f) => {
                self.defect(path, format!("must be >= 0, found {f}"));
                None
            }
            None => {
                self.defect(path, format!("expected number, found {}", type_name(value)));
                None
            }
        }
    }

    fn optional_name(&mut self, path: &str, obj: &Map<String, Value>) -> Result<Option<String>, ()> {
        match obj.get("name") {
            None => Ok(None),
            Some(v) => self.string(&child(path, "name"), v).map(Some).ok_or(()),
        }
    }

    /// Parses every item of an array, dropping the ones with defects.
    ///
    /// Defects inside an item are tagged with the item's `id_keys` values
    /// when all of them are non-empty strings.
    fn entries<T>(
        &mut self,
        path: &str,
        value: &Value,
        min_items: usize,
        id_keys: &[&str],
        parse: fn(&mut Self, &str, &Value) -> Option<T>,
    ) -> Vec<T> {
        let Some(items) = value.as_array() else {
            self.defect(path, format!("expected array, found {}", type_name(value)));
            return Vec::new();
        };
        if items.len() < min_items {
            self.defect(path, format!("must contain at least {min_items} item(s)"));
        }
        let mut parsed = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let before = self.defects.len();
            if let Some(entry) = parse(self, &format!("{path}[{i}]"), item) {
                parsed.push(entry);
            }
            let ids = entity_ids(item, id_keys);
            if !ids.is_empty() {
                tag(&mut self.defects[before..], &ids);
            }
        }
        parsed
    }

    fn unique_items(&mut self, path: &str, value: &Value) {
        let Some(items) = value.as_array() else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            if let Some(first) = items[..i].iter().position(|prev| prev == item) {
                self.defect(
                    format!("{path}[{i}]"),
                    format!("duplicates {path}[{first}]"),
                );
            }
        }
    }

    fn resource(&mut self, path: &str, value: &Value) -> Option<Resource> {
        let obj = self.object(path, value)?;
        self.reject_unknown(path, obj, RESOURCE_KEYS);

        let id = self
            .required(path, obj, "resource_id")
            .and_then(|v| self.identifier(&child(path, "resource_id"), v));
        let name = self.optional_name(path, obj);
        let capacity = self
            .required(path, obj, "capacity")
            .and_then(|v| self.integer(&child(path, "capacity"), v, 0));

        Some(Resource {
            id: id?,
            name: name.ok()?,
            capacity: capacity?,
        })
    }

    fn job(&mut self, path: &str, value: &Value) -> Option<Job> {
        let obj = self.object(path, value)?;
        self.reject_unknown(path, obj, JOB_KEYS);

        let id = self
            .required(path, obj, "job_id")
            .and_then(|v| self.identifier(&child(path, "job_id"), v));
        let name = self.optional_name(path, obj);
        let release_time = match obj.get("release_time") {
            None => Some(0),
            Some(v) => self.integer(&child(path, "release_time"), v, 0),
        };
        let deadline = match obj.get("deadline") {
            None | Some(Value::Null) => Some(None),
            Some(v) => self.integer(&child(path, "deadline"), v, 0).map(Some),
        };

        Some(Job {
            id: id?,
            name: name.ok()?,
            release_time: release_time?,
            deadline: deadline?,
        })
    }

    fn mode(&mut self, path: &str, value: &Value) -> Option<Mode> {
        let obj = self.object(path, value)?;
        self.reject_unknown(path, obj, MODE_KEYS);

        let id = self
            .required(path, obj, "mode_id")
            .and_then(|v| self.identifier(&child(path, "mode_id"), v));
        let job_id = self
            .required(path, obj, "job_id")
            .and_then(|v| self.reference(&child(path, "job_id"), v));
        let duration = self
            .required(path, obj, "duration")
            .and_then(|v| self.integer(&child(path, "duration"), v, 0));
        let cost = self
            .required(path, obj, "cost")
            .and_then(|v| self.non_negative_number(&child(path, "cost"), v));

        let requirements_path = child(path, "resource_requirements");
        let resource_requirements = match obj.get("resource_requirements") {
            None => Some(Vec::new()),
            Some(v) => {
                let before = self.defects.len();
                let parsed = self.entries(&requirements_path, v, 0, &[], Reader::requirement);
                (self.defects.len() == before).then_some(parsed)
            }
        };

        Some(Mode {
            id: id?,
            job_id: job_id?,
            duration: duration?,
            cost: cost?,
            resource_requirements: resource_requirements?,
        })
    }

    fn requirement(&mut self, path: &str, value: &Value) -> Option<ResourceRequirement> {
        let obj = self.object(path, value)?;
        self.reject_unknown(path, obj, REQUIREMENT_KEYS);

        let resource_id = self
            .required(path, obj, "resource_id")
            .and_then(|v| self.reference(&child(path, "resource_id"), v));
        let demand = self
            .required(path, obj, "demand")
            .and_then(|v| self.integer(&child(path, "demand"), v, 0));

        Some(ResourceRequirement {
            resource_id: resource_id?,
            demand: demand?,
        })
    }

    fn precedence(&mut self, path: &str, value: &Value) -> Option<Precedence> {
        let obj = self.object(path, value)?;
        self.reject_unknown(path, obj, PRECEDENCE_KEYS);

        let predecessor = self
            .required(path, obj, "predecessor")
            .and_then(|v| self.reference(&child(path, "predecessor"), v));
        let successor = self
            .required(path, obj, "successor")
            .and_then(|v| self.reference(&child(path, "successor"), v));
        let lag = match obj.get("lag") {
            None => Some(0),
            Some(v) => self.integer(&child(path, "lag"), v, 0),
        };

        Some(Precedence {
            predecessor: predecessor?,
            successor: successor?,
            lag: lag?,
        })
    }
}
