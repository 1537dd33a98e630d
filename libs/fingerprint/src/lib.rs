//! Order-independent pod-set fingerprinting.
//!
//! A fingerprint is a digest over the set of `namespace/name` identifiers of
//! the pods scheduled to a node. The node agent embeds one in every topology
//! snapshot it publishes; the scheduler recomputes it from the live pod
//! roster and compares. Equality proves the published snapshot already
//! accounts for the exact current pod membership, so any local overlay for
//! that node is redundant.
//!
//! # Invariants
//!
//! - The digest is independent of the order pods are supplied in.
//! - Adding, removing, or renaming any pod changes the digest.
//! - The digest is only ever compared for equality; its encoding is stable
//!   but otherwise opaque to consumers.

use sha2::{Digest, Sha256};

/// Version prefix of the rendered fingerprint.
pub const FINGERPRINT_PREFIX: &str = "pfpv1:";

/// Namespaced pod identifier, the unit the fingerprint is computed over.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PodIdent {
    pub namespace: String,
    pub name: String,
}

impl PodIdent {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for PodIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Outcome of comparing a computed fingerprint against a published one.
///
/// A mismatch is an expected state while the published snapshot lags the
/// live pod roster; it is data, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintStatus {
    /// The published snapshot reflects the live pod set.
    Match,

    /// The published snapshot is stale relative to the live pod set.
    Mismatch,
}

/// Compute the fingerprint of a pod set.
///
/// Identifiers are sorted before hashing, so the result does not depend on
/// the order of `idents`. Namespace and name are separated by NUL bytes to
/// keep distinct sets from colliding on concatenation.
pub fn pod_set_fingerprint(idents: &[PodIdent]) -> String {
    let mut sorted: Vec<&PodIdent> = idents.iter().collect();
    sorted.sort();
    sorted.dedup();

    let mut hasher = Sha256::new();
    for ident in sorted {
        hasher.update(ident.namespace.as_bytes());
        hasher.update([0u8]);
        hasher.update(ident.name.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    format!("{}{}", FINGERPRINT_PREFIX, hex::encode(&digest[..16]))
}

/// Compare the fingerprint of `idents` against a published digest.
pub fn verify(expected: &str, idents: &[PodIdent]) -> FingerprintStatus {
    if pod_set_fingerprint(idents) == expected {
        FingerprintStatus::Match
    } else {
        FingerprintStatus::Mismatch
    }
}
