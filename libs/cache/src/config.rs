//! Resync-method configuration.

use serde::{Deserialize, Serialize};
use tracing::info;

use topas_topology::FingerprintScope;

/// How fingerprint scope is decided for snapshots that do not declare one.
///
/// Supplied by the plugin configuration and read once at cache construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncMethod {
    /// Follow whatever scope the snapshot declares; all pods otherwise.
    #[default]
    Autodetect,

    /// Undeclared snapshots are fingerprinted over all pods.
    AllResources,

    /// Undeclared snapshots are fingerprinted over exclusive-resource pods
    /// only.
    ExclusiveResourcesOnly,
}

impl ResyncMethod {
    /// Resolve the configured method, falling back to autodetect when the
    /// plugin configuration left it unset.
    pub fn from_config(value: Option<ResyncMethod>) -> ResyncMethod {
        match value {
            Some(method) => method,
            None => {
                let fallback = ResyncMethod::Autodetect;
                info!(fallback = ?fallback, "Cache resync method missing");
                fallback
            }
        }
    }

    /// Fingerprint scope for a snapshot that does not declare its own.
    pub fn fallback_scope(self) -> FingerprintScope {
        match self {
            ResyncMethod::ExclusiveResourcesOnly => FingerprintScope::ExclusiveResources,
            ResyncMethod::Autodetect | ResyncMethod::AllResources => FingerprintScope::AllPods,
        }
    }
}

/// Scope to fingerprint a snapshot's roster with: the snapshot's own
/// declaration wins; the resync method decides the fallback.
pub fn resolve_scope(declared: Option<FingerprintScope>, method: ResyncMethod) -> FingerprintScope {
    declared.unwrap_or_else(|| method.fallback_scope())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_from_config_fallback() {
        assert_eq!(ResyncMethod::from_config(None), ResyncMethod::Autodetect);
        assert_eq!(
            ResyncMethod::from_config(Some(ResyncMethod::AllResources)),
            ResyncMethod::AllResources
        );
    }

    #[rstest]
    #[case(None, ResyncMethod::Autodetect, FingerprintScope::AllPods)]
    #[case(None, ResyncMethod::AllResources, FingerprintScope::AllPods)]
    #[case(None, ResyncMethod::ExclusiveResourcesOnly, FingerprintScope::ExclusiveResources)]
    #[case(
        Some(FingerprintScope::ExclusiveResources),
        ResyncMethod::AllResources,
        FingerprintScope::ExclusiveResources
    )]
    #[case(
        Some(FingerprintScope::AllPods),
        ResyncMethod::ExclusiveResourcesOnly,
        FingerprintScope::AllPods
    )]
    fn test_resolve_scope(
        #[case] declared: Option<FingerprintScope>,
        #[case] method: ResyncMethod,
        #[case] expected: FingerprintScope,
    ) {
        assert_eq!(resolve_scope(declared, method), expected);
    }

    #[test]
    fn test_serde_names() {
        let method: ResyncMethod = serde_json::from_str("\"exclusive_resources_only\"").unwrap();
        assert_eq!(method, ResyncMethod::ExclusiveResourcesOnly);
        assert_eq!(serde_json::to_string(&ResyncMethod::Autodetect).unwrap(), "\"autodetect\"");
    }
}
