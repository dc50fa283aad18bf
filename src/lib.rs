pub mod compat;
pub mod error;
pub mod model;
pub mod snapshot;
pub mod surface;

pub use compat::{ApiDiffEngine, ChangeCategory, ChangeSeverity, CompareOptions, ComparisonResult, TypeChange};
pub use error::{DiffError, SnapshotSide};
pub use snapshot::{ApiSnapshot, SnapshotDocument, TypeProvider};
pub use surface::{ApiSurface, Compatibility};

use anyhow::Context;
use compat::identity::{SignatureKey, identity_string};
use model::{TypeDescriptor, TypeRef};
use sha2::{Digest, Sha256};

/// Generates a fingerprint of the public surface of a snapshot.
///
/// The fingerprint is a SHA-256 hash of a canonical JSON rendering of the
/// types. It is insensitive to assembly versions and to the order in which
/// types, interfaces, members and enum values were listed.
///
/// # Arguments
///
/// * `snapshot` - The snapshot to fingerprint.
///
/// # Returns
///
/// A `Result` containing the hex-encoded SHA-256 fingerprint string.
pub fn generate_fingerprint(snapshot: &ApiSnapshot) -> anyhow::Result<String> {
    // 1. Normalize every type into its canonical form.
    let mut types: Vec<TypeDescriptor> = snapshot.types.iter().map(canonical_type).collect();

    // 2. Order types by identity so listing order does not matter.
    types.sort_by(|a, b| {
        (&a.namespace, &a.name, &a.assembly.name).cmp(&(&b.namespace, &b.name, &b.assembly.name))
    });

    // 3. Serialize the canonical representation to a stable JSON string.
    let json_string =
        serde_json::to_string(&types).context("Failed to serialize canonical surface to JSON")?;

    // 4. Compute the SHA-256 hash of the JSON string.
    let mut hasher = Sha256::new();
    hasher.update(json_string.as_bytes());
    let hash_result = hasher.finalize();

    Ok(format!("{:x}", hash_result))
}

fn canonical_type(t: &TypeDescriptor) -> TypeDescriptor {
    let mut t = t.clone();
    t.assembly.version = None;
    t.assembly.public_key_token = None;
    if let Some(base) = t.base_type.as_mut() {
        strip_versions(base);
    }
    t.interfaces.iter_mut().for_each(strip_versions);
    t.interfaces.sort_by_key(identity_string);
    t.enum_values.sort_by(|a, b| a.name.cmp(&b.name));
    for member in &mut t.members {
        if let Some(member_type) = member.member_type.as_mut() {
            strip_versions(member_type);
        }
        for p in &mut member.parameters {
            strip_versions(&mut p.parameter_type);
        }
    }
    t.members.sort_by_cached_key(SignatureKey::of);
    t
}

fn strip_versions(t: &mut TypeRef) {
    match t {
        TypeRef::Named(n) => {
            n.assembly.version = None;
            n.assembly.public_key_token = None;
        }
        TypeRef::Generic {
            definition,
            arguments,
        } => {
            definition.assembly.version = None;
            definition.assembly.public_key_token = None;
            arguments.iter_mut().for_each(strip_versions);
        }
        TypeRef::Array { element, .. } => strip_versions(element),
        TypeRef::GenericParameter { .. } | TypeRef::Unresolved { .. } => {}
    }
}
