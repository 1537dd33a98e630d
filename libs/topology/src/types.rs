//! Published topology and pod types.

use serde::{Deserialize, Serialize};

use crate::resources::ResourceList;

/// Which pods the embedded pod-set fingerprint was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintScope {
    /// Every pod scheduled to the node.
    AllPods,

    /// Only pods requesting exclusive resource zones.
    ExclusiveResources,
}

/// One resource entry within a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneResource {
    /// Resource name (e.g. `cpu`, `memory`, a device class).
    pub name: String,

    /// Total quantity the zone was provisioned with.
    pub capacity: u64,

    /// Quantity available to workloads after system reservations.
    pub allocatable: u64,

    /// Quantity not yet allocated, as of the snapshot.
    pub available: u64,
}

/// A resource zone (NUMA-like domain) within a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone name, unique within the node.
    pub name: String,

    /// Per-resource quantities for this zone.
    pub resources: Vec<ZoneResource>,
}

impl Zone {
    /// Look up a resource entry by name.
    pub fn resource(&self, name: &str) -> Option<&ZoneResource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

/// A node's published resource topology snapshot.
///
/// Replaced wholesale on every agent refresh; never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTopology {
    /// Node name this snapshot belongs to.
    pub name: String,

    /// Resource zones of the node.
    pub zones: Vec<Zone>,

    /// Digest over the pod set running on the node when the snapshot was
    /// taken. Absent when the agent does not publish fingerprints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_fingerprint: Option<String>,

    /// Scope the fingerprint was computed over. Absent when the agent does
    /// not declare it; the consumer's resync method decides the fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_scope: Option<FingerprintScope>,
}

impl NodeTopology {
    /// Look up a zone by name.
    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Subtract `requests` from every zone's available quantity, saturating
    /// at zero.
    ///
    /// The charge hits every zone because the zone placement of an in-flight
    /// pod is unknown until the node agent publishes it; under-reporting
    /// availability is the safe direction.
    pub fn deduct_available(&mut self, requests: &ResourceList) {
        for zone in &mut self.zones {
            for resource in &mut zone.resources {
                if let Some(qty) = requests.get(&resource.name) {
                    resource.available = resource.available.saturating_sub(*qty);
                }
            }
        }
    }
}

/// A schedulable unit, as seen by the pod lister.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    /// Namespace of the pod.
    pub namespace: String,

    /// Name of the pod, unique within the namespace.
    pub name: String,

    /// Node the pod is assigned to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    /// Aggregate resource requests across all containers.
    #[serde(default)]
    pub requests: ResourceList,
}

impl Pod {
    /// Namespaced identifier, `namespace/name`.
    pub fn ident(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}
