//! Storage for the latest known topology snapshot per node.
//!
//! Pure storage: no resource arithmetic, no staleness logic. Snapshots are
//! replaced wholesale on update. Not thread-safe on its own; all access goes
//! through the cache lock.

use std::collections::HashMap;

use topas_topology::NodeTopology;

/// Node-name-keyed snapshot store.
#[derive(Debug, Default)]
pub struct TopologyStore {
    topologies: HashMap<String, NodeTopology>,
}

impl TopologyStore {
    /// Build a store from an initial full listing.
    pub fn new(initial: Vec<NodeTopology>) -> Self {
        let topologies = initial.into_iter().map(|t| (t.name.clone(), t)).collect();
        Self { topologies }
    }

    /// Clone of the stored snapshot for a node, if any.
    pub fn get_clone(&self, node: &str) -> Option<NodeTopology> {
        self.topologies.get(node).cloned()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.topologies.contains_key(node)
    }

    /// Upsert a snapshot, keyed by its node name.
    pub fn update(&mut self, topology: NodeTopology) {
        self.topologies.insert(topology.name.clone(), topology);
    }

    pub fn len(&self) -> usize {
        self.topologies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topologies.is_empty()
    }
}
