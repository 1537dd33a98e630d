//! Over-reserve consistency cache for topology-aware scheduling.
//!
//! Node topology snapshots are published asynchronously by a node agent and
//! lag real allocation state by one or more refresh cycles. This crate keeps
//! the scheduler honest in the meantime:
//!
//! - Overlays the scheduler's own in-flight reservations on top of the stale
//!   published snapshot, so placement decisions never double-allocate a zone.
//! - Tracks dirty nodes (possibly over-reserved, or running foreign pods the
//!   overlay cannot account for).
//! - Periodically resyncs dirty nodes: a fresh snapshot whose embedded
//!   pod-set fingerprint matches the live roster is authoritative, so the
//!   overlay for that node is dropped and the snapshot replaces the cached
//!   one.
//!
//! The entry point is [`OverReserve`]. The backing object-store client and
//! pod lister are injected through the [`client`] traits; the cache performs
//! no writes against the control plane.

pub mod client;
pub mod config;
pub mod counter;
pub mod logid;
pub mod overlay;
pub mod overreserve;
pub mod store;

pub use client::{ClientError, ExclusivenessFn, PodLister, PodRelevanceFn, TopologyClient};
pub use config::{resolve_scope, ResyncMethod};
pub use overreserve::{CacheError, OverReserve, PodData};
