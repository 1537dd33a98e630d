//! Correlation IDs for log lines.
//!
//! Pod-scoped flows (reserve, unreserve, lookups) are correlated by the
//! pod's namespaced name; pod-less flows (resync passes) by a time-derived
//! ID unique enough to tell consecutive passes apart.

use chrono::Utc;
use topas_topology::Pod;

/// Log ID for a pod-scoped flow: `namespace/name`.
pub fn pod_log_id(pod: &Pod) -> String {
    format!("{}/{}", pod.namespace, pod.name)
}

/// Log ID for a pod-less flow: `uts/<unix seconds>`.
pub fn time_log_id() -> String {
    format!("uts/{}", Utc::now().timestamp())
}
