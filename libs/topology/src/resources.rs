//! Resource quantity bookkeeping and log rendering.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::types::NodeTopology;

/// Resource name to quantity, in canonical integer units.
pub type ResourceList = BTreeMap<String, u64>;

/// Render a topology's per-zone availability as a compact single line,
/// for debug logging.
///
/// Format: `zone-0=[cpu=10 memory=20000] zone-1=[cpu=4]`.
pub fn format_available(topology: &NodeTopology) -> String {
    let mut out = String::new();
    for (zi, zone) in topology.zones.iter().enumerate() {
        if zi > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}=[", zone.name);
        for (ri, resource) in zone.resources.iter().enumerate() {
            if ri > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{}={}", resource.name, resource.available);
        }
        out.push(']');
    }
    out
}
