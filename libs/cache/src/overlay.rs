//! Per-node overlay of resources assumed consumed by in-flight reservations.
//!
//! Every pod the scheduler has provisionally placed on a node, but which the
//! node's published snapshot does not yet reflect, is charged here. The
//! overlay is keyed by pod identifier so removal is exact and a double
//! unreserve can never corrupt the accounting.

use std::collections::BTreeMap;
use std::fmt::Write;

use topas_topology::{NodeTopology, Pod, ResourceList};

/// Accumulated resource charges for one node.
#[derive(Debug, Clone, Default)]
pub struct ResourceOverlay {
    charges: BTreeMap<String, ResourceList>,
}

impl ResourceOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge a pod's requests against the node.
    ///
    /// Reserving the same pod twice overwrites the previous charge rather
    /// than doubling it.
    pub fn add_pod(&mut self, pod: &Pod) {
        self.charges.insert(pod.ident(), pod.requests.clone());
    }

    /// Remove a pod's charge. Unknown or already-removed pods are a no-op.
    ///
    /// Returns whether a charge was actually removed.
    pub fn remove_pod(&mut self, pod: &Pod) -> bool {
        self.charges.remove(&pod.ident()).is_some()
    }

    /// Produce an adjusted copy of `topology` with every tracked charge
    /// subtracted from each zone's available quantity, saturating at zero.
    pub fn apply_to(&self, topology: &NodeTopology) -> NodeTopology {
        let mut adjusted = topology.clone();
        for requests in self.charges.values() {
            adjusted.deduct_available(requests);
        }
        adjusted
    }

    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }

    /// Compact rendering of the tracked charges, for debug logging.
    ///
    /// Format: `default/web-0=[cpu=2 memory=1024] default/web-1=[cpu=1]`.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (i, (ident, requests)) in self.charges.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{ident}=[");
            for (ri, (name, qty)) in requests.iter().enumerate() {
                if ri > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{name}={qty}");
            }
            out.push(']');
        }
        out
    }
}
