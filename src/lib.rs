//! Semantic validation for multi-mode resource-constrained project
//! scheduling (MM-RCPSP) instances.
//!
//! Takes a parsed input document (resources, jobs, modes, precedences) and
//! returns a [`ValidationReport`] listing every defect that would make the
//! instance unusable or provably unsolvable, before it reaches a solver.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Instance`, `Resource`, `Job`, `Mode`,
//!   `ResourceRequirement`, `Precedence`
//! - **`validation`**: Syntactic checks, reference resolution, cycle
//!   detection, feasibility pre-checks, report assembly
//! - **`generator`**: Seeded random generator of valid instances
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//!
//! let report = u_rcpsp::validate(&json!({
//!     "resources": [{"resource_id": "R1", "capacity": 5}],
//!     "jobs": [{"job_id": "J1"}, {"job_id": "J2"}],
//!     "modes": [
//!         {"mode_id": "M1", "job_id": "J1", "duration": 2, "cost": 0,
//!          "resource_requirements": [{"resource_id": "R1", "demand": 3}]},
//!         {"mode_id": "M2", "job_id": "J2", "duration": 1, "cost": 0}
//!     ],
//!     "precedences": [{"predecessor": "J1", "successor": "J2"}]
//! }));
//! assert!(report.is_valid());
//! ```
//!
//! # References
//!
//! - Kolisch & Sprecher (1997), "PSPLIB - A project scheduling problem library"
//! - Brucker et al. (1999), "Resource-constrained project scheduling:
//!   Notation, classification, models, and methods"

pub mod error;
pub mod generator;
pub mod models;
pub mod validation;

pub use error::{MalformedInputError, SyntaxDefect};
pub use models::{Instance, Job, Mode, Precedence, Resource, ResourceRequirement};
pub use validation::{
    Phase, ValidationConfig, ValidationReport, Validator, Violation, ViolationKind,
};

/// Validates a raw document with the default configuration.
pub fn validate(document: &serde_json::Value) -> ValidationReport {
    Validator::default().validate(document)
}

/// Validates a raw document with a custom configuration.
pub fn validate_with(document: &serde_json::Value, config: &ValidationConfig) -> ValidationReport {
    Validator::new(config.clone()).validate(document)
}

/// Validates a typed instance with the default configuration.
pub fn validate_instance(instance: &Instance) -> ValidationReport {
    Validator::default().validate_instance(instance)
}
