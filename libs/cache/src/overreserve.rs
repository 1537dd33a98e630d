//! The over-reserve cache.
//!
//! Composes the topology store, the per-node resource overlays, and the
//! dirty-node counters behind one coarse lock, and runs the periodic resync
//! pass that decides when a node's overlay can be safely dropped.
//!
//! # Locking
//!
//! One `Mutex` guards all mutable state. Every public operation holds it for
//! its whole duration and none of them awaits while holding it: resync does
//! its network-bound fetches between lock acquisitions and reapplies the
//! results through a single batched [`OverReserve::flush_nodes`] call, which
//! keeps flush atomic with respect to reserve/unreserve. Coarse locking is
//! deliberate: each critical section is O(1) map work and node counts are
//! small, so per-node locks buy nothing but complexity here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use topas_fingerprint::{FingerprintStatus, PodIdent};
use topas_topology::{format_available, FingerprintScope, NodeTopology, Pod};

use crate::client::{ClientError, ExclusivenessFn, PodLister, PodRelevanceFn, TopologyClient};
use crate::config::{resolve_scope, ResyncMethod};
use crate::counter::Counter;
use crate::logid::{pod_log_id, time_log_id};
use crate::overlay::ResourceOverlay;
use crate::store::TopologyStore;

/// Construction-time failures. Everything after construction is handled in
/// place: staleness, mismatches, and absent objects are normal operation,
/// not errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The initial full listing of topology objects failed.
    #[error("initial topology listing failed: {0}")]
    InitialListing(#[from] ClientError),
}

/// Roster entry: what resync needs to know about one running pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodData {
    pub namespace: String,
    pub name: String,
    pub has_exclusive_resources: bool,
}

struct CacheState {
    store: TopologyStore,
    /// node name -> overlay; an entry exists only while at least one
    /// reservation is outstanding for the node.
    assumed: HashMap<String, ResourceOverlay>,
    /// Counts how many times a node was discarded as a placement candidate.
    /// Used as the trigger condition to try to resync the node; see
    /// [`OverReserve::resync`].
    maybe_over_reserved: Counter,
    foreign_pods: Counter,
}

/// Consistency cache overlaying in-flight reservations on top of published
/// topology snapshots.
pub struct OverReserve {
    state: Mutex<CacheState>,
    client: Arc<dyn TopologyClient>,
    pod_lister: Arc<dyn PodLister>,
    resync_method: ResyncMethod,
    is_pod_relevant: PodRelevanceFn,
    has_exclusive_resources: ExclusivenessFn,
}

impl OverReserve {
    /// Build the cache, loading all currently published topology snapshots.
    ///
    /// Fails if the initial listing fails; the scheduler must not start with
    /// an empty view it believes is complete.
    pub async fn new(
        client: Arc<dyn TopologyClient>,
        pod_lister: Arc<dyn PodLister>,
        resync_method: Option<ResyncMethod>,
        is_pod_relevant: PodRelevanceFn,
        has_exclusive_resources: ExclusivenessFn,
    ) -> Result<Self, CacheError> {
        let resync_method = ResyncMethod::from_config(resync_method);

        let topologies = client.list_topologies().await?;
        info!(
            objects = topologies.len(),
            method = ?resync_method,
            "Initializing over-reserve cache"
        );

        Ok(Self {
            state: Mutex::new(CacheState {
                store: TopologyStore::new(topologies),
                assumed: HashMap::new(),
                maybe_over_reserved: Counter::new(),
                foreign_pods: Counter::new(),
            }),
            client,
            pod_lister,
            resync_method,
            is_pod_relevant,
            has_exclusive_resources,
        })
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // cache state is plain map data; a poisoned lock still holds a
        // consistent view
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adjusted topology view for a node.
    ///
    /// Returns `(None, false)` when the node is flagged as running foreign
    /// pods: the overlay cannot be trusted and the caller must treat the
    /// node as unusable for topology-aware decisions. Returns `(None, true)`
    /// when no snapshot is known for the node yet. Otherwise the stored
    /// snapshot with the node's overlay applied, observed atomically.
    pub fn get_cached_topology(&self, node_name: &str, pod: &Pod) -> (Option<NodeTopology>, bool) {
        let state = self.lock();
        if state.foreign_pods.is_set(node_name) {
            return (None, false);
        }

        let Some(topology) = state.store.get_clone(node_name) else {
            return (None, true);
        };
        let Some(overlay) = state.assumed.get(node_name) else {
            return (Some(topology), true);
        };

        let log_id = pod_log_id(pod);
        trace!(
            log_id = %log_id,
            node = %node_name,
            available = %format_available(&topology),
            "Topology before overlay"
        );

        let adjusted = overlay.apply_to(&topology);
        debug!(
            log_id = %log_id,
            node = %node_name,
            available = %format_available(&adjusted),
            "Topology after overlay"
        );
        (Some(adjusted), true)
    }

    /// Record that a node was rejected as a placement candidate.
    ///
    /// The rejection may stem from genuine exhaustion or from overlay
    /// pessimism; either way the node becomes a resync candidate.
    pub fn mark_maybe_over_reserved(&self, node_name: &str, pod: &Pod) {
        let log_id = pod_log_id(pod);
        let mut state = self.lock();
        let count = state.maybe_over_reserved.incr(node_name);
        debug!(log_id = %log_id, node = %node_name, count, "Marked node as possibly over-reserved");
    }

    /// Record that a pod not tracked by the reservation path was observed
    /// running on the node.
    ///
    /// Ignored for nodes without a known snapshot: a node this cache has no
    /// topology for cannot be foreign in any meaningful way.
    pub fn mark_has_foreign_pods(&self, node_name: &str, pod: &Pod) {
        let log_id = pod_log_id(pod);
        let mut state = self.lock();
        if !state.store.contains(node_name) {
            debug!(log_id = %log_id, node = %node_name, "Ignoring foreign pods, no topology tracked");
            return;
        }
        let count = state.foreign_pods.incr(node_name);
        debug!(log_id = %log_id, node = %node_name, count, "Marked node as running foreign pods");
    }

    /// Charge a pod's resources against a node's overlay.
    ///
    /// Also clears the node's over-reserved counter: a successful
    /// reservation proves the adjusted view still had room, invalidating the
    /// earlier pessimism signal.
    pub fn reserve(&self, node_name: &str, pod: &Pod) {
        let log_id = pod_log_id(pod);
        let mut state = self.lock();

        let overlay = state.assumed.entry(node_name.to_string()).or_default();
        overlay.add_pod(pod);
        debug!(
            log_id = %log_id,
            node = %node_name,
            assumed = %overlay.summary(),
            "Reserved pod resources"
        );

        state.maybe_over_reserved.delete(node_name);
        trace!(log_id = %log_id, node = %node_name, "Reset over-reserved counter");
    }

    /// Release a pod's charge from a node's overlay.
    pub fn unreserve(&self, node_name: &str, pod: &Pod) {
        let log_id = pod_log_id(pod);
        let mut state = self.lock();

        let Some(overlay) = state.assumed.get_mut(node_name) else {
            // this should not happen, so we are vocal about it; there is
            // nothing to recover, so it is not an error either
            warn!(log_id = %log_id, node = %node_name, "No resources tracked for node");
            return;
        };

        overlay.remove_pod(pod);
        debug!(
            log_id = %log_id,
            node = %node_name,
            assumed = %overlay.summary(),
            "Released pod resources"
        );
    }

    /// Deduplicated union of nodes flagged foreign and nodes flagged
    /// possibly over-reserved, in no particular order.
    ///
    /// Intentionally over-inclusive: no attempt is made to tell genuine
    /// exhaustion apart from overlay pessimism, because that would mean
    /// predicting future workload demand. An unnecessary resync attempt is
    /// far cheaper than staying wrong.
    pub fn dirty_nodes(&self) -> Vec<String> {
        let state = self.lock();

        let mut nodes = state.foreign_pods.clone();
        let foreign_count = nodes.len();
        for node in state.maybe_over_reserved.keys() {
            nodes.incr(&node);
        }

        if !nodes.is_empty() {
            debug!(
                foreign = foreign_count,
                discarded = nodes.len() - foreign_count,
                total = nodes.len(),
                "Found dirty nodes"
            );
        }
        nodes.keys()
    }

    /// Reset the cached state of the given nodes from fresh snapshots.
    ///
    /// For each snapshot, under one lock acquisition: replace the stored
    /// snapshot, drop the node's overlay entry outright, and clear both
    /// dirty counters.
    pub fn flush_nodes(&self, topologies: Vec<NodeTopology>) {
        let mut state = self.lock();
        for topology in topologies {
            debug!(node = %topology.name, "Flushing node");
            state.assumed.remove(&topology.name);
            state.maybe_over_reserved.delete(&topology.name);
            state.foreign_pods.delete(&topology.name);
            state.store.update(topology);
        }
    }

    /// Run one resync pass over the dirty nodes.
    ///
    /// A dirty node is flushed only when its freshly fetched snapshot
    /// carries a pod-set fingerprint matching the live roster: that proves
    /// the snapshot already accounts for the exact current pod membership,
    /// at which point the overlay is redundant. Every other outcome (fetch
    /// failure, absent roster, missing digest, mismatch) leaves the node
    /// dirty and untouched, to be retried on the next externally triggered
    /// pass. A pod listing failure aborts the whole pass.
    ///
    /// Not reentrant: the periodic trigger must serialize invocations.
    pub async fn resync(&self) {
        let log_id = time_log_id();

        let node_names = self.dirty_nodes();
        // the common case; keep it cheap and quiet
        if node_names.is_empty() {
            trace!(log_id = %log_id, "No dirty nodes detected");
            return;
        }

        let node_to_pods = match self.node_to_pod_data(&log_id).await {
            Ok(map) => map,
            Err(e) => {
                error!(log_id = %log_id, error = %e, "Cannot map running pods to nodes");
                return;
            }
        };

        debug!(log_id = %log_id, nodes = node_names.len(), "Topology cache resync starting");

        let mut updates = Vec::new();
        for node_name in node_names {
            let candidate = match self.client.get_topology(&node_name).await {
                Ok(Some(topology)) => topology,
                Ok(None) => {
                    debug!(log_id = %log_id, node = %node_name, "Missing topology object");
                    continue;
                }
                Err(e) => {
                    debug!(
                        log_id = %log_id,
                        node = %node_name,
                        error = %e,
                        "Failed to fetch topology object"
                    );
                    continue;
                }
            };

            let Some(pods) = node_to_pods.get(&node_name) else {
                // a dirty node with no relevant pods really should not
                // happen; skip it and let the next pass retry
                debug!(log_id = %log_id, node = %node_name, "Cannot find any pod for node");
                continue;
            };

            let Some(expected) = candidate.pod_fingerprint.clone() else {
                // agent or configuration issue, distinct from a plain
                // mismatch
                debug!(log_id = %log_id, node = %node_name, "Missing pod-set fingerprint data");
                continue;
            };
            let scope = resolve_scope(candidate.fingerprint_scope, self.resync_method);

            trace!(
                log_id = %log_id,
                node = %node_name,
                fingerprint = %expected,
                scope = ?scope,
                "Trying to resync node topology"
            );

            let idents: Vec<PodIdent> = pods
                .iter()
                .filter(|p| scope == FingerprintScope::AllPods || p.has_exclusive_resources)
                .map(|p| PodIdent::new(p.namespace.clone(), p.name.clone()))
                .collect();

            match topas_fingerprint::verify(&expected, &idents) {
                FingerprintStatus::Mismatch => {
                    // expected while the published snapshot lags, not critical
                    debug!(log_id = %log_id, node = %node_name, "Pod-set fingerprint mismatch");
                    continue;
                }
                FingerprintStatus::Match => {}
            }

            debug!(log_id = %log_id, node = %node_name, "Overriding cached topology");
            updates.push(candidate);
        }

        self.flush_nodes(updates);
        debug!(log_id = %log_id, "Topology cache resync complete");
    }

    /// No-op hook kept on the contract surface for future use.
    pub fn post_bind(&self, _node_name: &str, _pod: &Pod) {}

    /// One-shot map from node name to the roster of relevant pods assigned
    /// to it.
    async fn node_to_pod_data(
        &self,
        log_id: &str,
    ) -> Result<HashMap<String, Vec<PodData>>, ClientError> {
        let mut map: HashMap<String, Vec<PodData>> = HashMap::new();

        let pods = self.pod_lister.list_pods().await?;
        for pod in pods {
            if !(self.is_pod_relevant)(&pod, log_id) {
                continue;
            }
            let Some(node_name) = pod.node_name.clone() else {
                continue;
            };
            let has_exclusive_resources = (self.has_exclusive_resources)(&pod);
            map.entry(node_name).or_default().push(PodData {
                namespace: pod.namespace,
                name: pod.name,
                has_exclusive_resources,
            });
        }

        Ok(map)
    }
}
