//! Shared fakes and builders for cache integration tests.
//!
//! The fakes stand in for the control-plane collaborators: a scripted
//! topology client with per-node failure injection and a pod lister with a
//! whole-listing failure switch.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use topas_cache::{
    ClientError, ExclusivenessFn, OverReserve, PodLister, PodRelevanceFn, ResyncMethod,
    TopologyClient,
};
use topas_topology::{FingerprintScope, NodeTopology, Pod, ResourceList, Zone, ZoneResource};

/// Resource name the exclusivity predicate keys on in tests.
pub const DEVICE: &str = "example.com/device";

#[derive(Default)]
pub struct FakeTopologyClient {
    topologies: Mutex<Vec<NodeTopology>>,
    fail_list: AtomicBool,
    fail_get: Mutex<HashSet<String>>,
}

impl FakeTopologyClient {
    pub fn new(topologies: Vec<NodeTopology>) -> Self {
        Self {
            topologies: Mutex::new(topologies),
            ..Self::default()
        }
    }

    /// Replace the published objects, simulating an agent refresh.
    pub fn publish(&self, topologies: Vec<NodeTopology>) {
        *self.topologies.lock().unwrap() = topologies;
    }

    pub fn fail_next_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_get_for(&self, node: &str) {
        self.fail_get.lock().unwrap().insert(node.to_string());
    }
}

#[async_trait]
impl TopologyClient for FakeTopologyClient {
    async fn list_topologies(&self) -> Result<Vec<NodeTopology>, ClientError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ClientError::Unavailable("listing failed".to_string()));
        }
        Ok(self.topologies.lock().unwrap().clone())
    }

    async fn get_topology(&self, node: &str) -> Result<Option<NodeTopology>, ClientError> {
        if self.fail_get.lock().unwrap().contains(node) {
            return Err(ClientError::Unavailable(format!("get {node} failed")));
        }
        Ok(self
            .topologies
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.name == node)
            .cloned())
    }
}

#[derive(Default)]
pub struct FakePodLister {
    pods: Mutex<Vec<Pod>>,
    fail: AtomicBool,
}

impl FakePodLister {
    pub fn new(pods: Vec<Pod>) -> Self {
        Self {
            pods: Mutex::new(pods),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_pods(&self, pods: Vec<Pod>) {
        *self.pods.lock().unwrap() = pods;
    }

    pub fn fail_next_list(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PodLister for FakePodLister {
    async fn list_pods(&self) -> Result<Vec<Pod>, ClientError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::Unavailable("pod listing failed".to_string()));
        }
        Ok(self.pods.lock().unwrap().clone())
    }
}

pub fn always_relevant() -> PodRelevanceFn {
    Arc::new(|_, _| true)
}

/// Exclusive when the pod requests the test device resource.
pub fn exclusive_by_device() -> ExclusivenessFn {
    Arc::new(|pod: &Pod| pod.requests.contains_key(DEVICE))
}

pub fn zone(name: &str, cpu_available: u64, memory_available: u64) -> Zone {
    Zone {
        name: name.to_string(),
        resources: vec![
            ZoneResource {
                name: "cpu".to_string(),
                capacity: 16,
                allocatable: 16,
                available: cpu_available,
            },
            ZoneResource {
                name: "memory".to_string(),
                capacity: 64_000,
                allocatable: 64_000,
                available: memory_available,
            },
        ],
    }
}

pub fn topology(node: &str, zones: Vec<Zone>) -> NodeTopology {
    NodeTopology {
        name: node.to_string(),
        zones,
        pod_fingerprint: None,
        fingerprint_scope: None,
    }
}

pub fn topology_with_fingerprint(
    node: &str,
    zones: Vec<Zone>,
    fingerprint: &str,
    scope: Option<FingerprintScope>,
) -> NodeTopology {
    NodeTopology {
        name: node.to_string(),
        zones,
        pod_fingerprint: Some(fingerprint.to_string()),
        fingerprint_scope: scope,
    }
}

pub fn pod(namespace: &str, name: &str, node: Option<&str>, cpu: u64) -> Pod {
    Pod {
        namespace: namespace.to_string(),
        name: name.to_string(),
        node_name: node.map(str::to_string),
        requests: ResourceList::from([("cpu".to_string(), cpu)]),
    }
}

/// Construct a cache over the fakes with the default (autodetect) method.
pub async fn new_cache(
    client: Arc<FakeTopologyClient>,
    lister: Arc<FakePodLister>,
) -> OverReserve {
    new_cache_with_method(client, lister, None).await
}

pub async fn new_cache_with_method(
    client: Arc<FakeTopologyClient>,
    lister: Arc<FakePodLister>,
    method: Option<ResyncMethod>,
) -> OverReserve {
    OverReserve::new(
        client,
        lister,
        method,
        always_relevant(),
        exclusive_by_device(),
    )
    .await
    .expect("cache construction")
}

/// Available quantity of a resource in a zone of an adjusted view.
pub fn available(topology: &NodeTopology, zone: &str, resource: &str) -> u64 {
    topology
        .zone(zone)
        .and_then(|z| z.resource(resource))
        .map(|r| r.available)
        .unwrap_or_else(|| panic!("missing {zone}/{resource}"))
}
