//! Data model for node resource topology.
//!
//! The types in this crate mirror the objects an external node agent
//! publishes into the control plane:
//!
//! - **Node topology**: per-node inventory of resource zones (NUMA-like
//!   domains) with capacity/allocatable/available quantities, plus the
//!   pod-set fingerprint the agent embedded when it took the snapshot.
//! - **Pod**: a schedulable unit with its aggregate resource requests and
//!   its node assignment.
//!
//! Snapshots are immutable once published: consumers replace them wholesale,
//! never patch them in place.
//!
//! # Invariants
//!
//! - Quantities are canonical integer units; the agent is responsible for
//!   normalization before publishing.
//! - `available <= allocatable <= capacity` per zone resource, as published.

mod resources;
mod types;

pub use resources::{format_available, ResourceList};
pub use types::{FingerprintScope, NodeTopology, Pod, Zone, ZoneResource};
