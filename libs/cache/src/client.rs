//! Seams to the external collaborators.
//!
//! The cache never talks to the control plane directly: it is handed a
//! read-only object-store client for topology snapshots and a pod lister,
//! plus two policy predicates. Cancellation and timeouts are the
//! collaborators' concern; the cache only propagates their failures.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use topas_topology::{NodeTopology, Pod};

/// Failures surfaced by the backing store or the pod lister.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backing store could not be reached or timed out.
    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    /// The backing store returned an object the caller cannot interpret.
    #[error("malformed object: {0}")]
    Malformed(String),
}

/// Read-only client for published node topology objects.
#[async_trait]
pub trait TopologyClient: Send + Sync {
    /// List all known node topology snapshots.
    async fn list_topologies(&self) -> Result<Vec<NodeTopology>, ClientError>;

    /// Fetch the current snapshot for one node. `Ok(None)` means the object
    /// does not exist, which is not a failure.
    async fn get_topology(&self, node: &str) -> Result<Option<NodeTopology>, ClientError>;
}

/// Lister for all pods known to the control plane.
#[async_trait]
pub trait PodLister: Send + Sync {
    async fn list_pods(&self) -> Result<Vec<Pod>, ClientError>;
}

/// Decides whether a pod participates in roster and fingerprint
/// computation. The second argument is the correlation log ID of the
/// current flow.
pub type PodRelevanceFn = Arc<dyn Fn(&Pod, &str) -> bool + Send + Sync>;

/// Decides whether a pod counts toward the exclusive-resources fingerprint
/// scope.
pub type ExclusivenessFn = Arc<dyn Fn(&Pod) -> bool + Send + Sync>;
