//! MM-RCPSP domain models.
//!
//! Typed entity records with explicit foreign-key fields. Identifiers are
//! plain strings; resolution of `job_id`, `resource_id`, `predecessor` and
//! `successor` happens in [`crate::validation`], never here.
//!
//! # Entity Relations
//!
//! | Entity | Key | References |
//! |--------|-----|------------|
//! | Resource | `resource_id` | — |
//! | Job | `job_id` | — |
//! | Mode | `mode_id` | `job_id`, `resource_requirements[].resource_id` |
//! | Precedence | — | `predecessor`, `successor` |

mod instance;
mod job;
mod mode;
mod precedence;
mod resource;

pub use instance::Instance;
pub use job::Job;
pub use mode::{Mode, ResourceRequirement};
pub use precedence::Precedence;
pub use resource::Resource;
