//! Resource model.
//!
//! Resources are renewable: their capacity is available again in every
//! time period (machines, workers, rooms). A mode that demands more units
//! than a resource's capacity can never run.
//!
//! # Reference
//! Kolisch & Sprecher (1997), "PSPLIB - A project scheduling problem library"

use serde::{Deserialize, Serialize};

/// A renewable resource with per-period capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resource {
    /// Unique resource identifier.
    #[serde(rename = "resource_id")]
    pub id: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Units available per time period.
    pub capacity: u64,
}

impl Resource {
    /// Creates a resource with the given capacity.
    pub fn new(id: impl Into<String>, capacity: u64) -> Self {
        Self {
            id: id.into(),
            name: None,
            capacity,
        }
    }

    /// Sets the resource name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether `demand` units fit in a single period.
    pub fn can_supply(&self, demand: u64) -> bool {
        demand <= self.capacity
    }
}
