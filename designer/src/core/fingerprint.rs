//! Snapshot fingerprinting

use sha2::{Digest, Sha256};
use shared::FormSnapshot;

use crate::types::Fingerprint;

/// Hash the canonical JSON form of a snapshot.
///
/// Struct fields serialize in declaration order, rooms in list order and
/// amenities in `BTreeSet` order, so equal snapshots hash equally and any
/// field or ordering change produces a different key.
pub fn fingerprint(snapshot: &FormSnapshot) -> Fingerprint {
    let canonical = match serde_json::to_vec(snapshot) {
        Ok(bytes) => bytes,
        // Not reachable for this model; Debug output is deterministic too
        Err(_) => format!("{snapshot:?}").into_bytes(),
    };

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Fingerprint::from_hex(format!("{:x}", hasher.finalize()))
}
