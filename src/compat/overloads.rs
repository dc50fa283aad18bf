//! Recognizes method overloads that only append optional parameters.
//!
//! Under signature-key diffing, `F(string)` becoming `F(string, int? x = null)`
//! looks like a removal plus an unrelated addition. Existing call sites keep
//! compiling, so such pairs are reported as a single `MethodOverloadAdded`.

use crate::compat::identity::{equivalence, optional_equivalence};
use crate::model::{MemberDescriptor, MemberKind};

/// True when `new` accepts every call that compiled against `old`: same
/// return type, strictly more parameters, an equivalent positional prefix,
/// and a default value on every appended parameter.
pub fn is_compatible_overload(old: &MemberDescriptor, new: &MemberDescriptor) -> bool {
    if old.kind != MemberKind::Method || new.kind != MemberKind::Method || old.name != new.name {
        return false;
    }

    if optional_equivalence(old.member_type.as_ref(), new.member_type.as_ref()).is_different() {
        return false;
    }

    let prefix = old.parameters.len();
    if new.parameters.len() <= prefix {
        return false;
    }

    let prefix_matches = old
        .parameters
        .iter()
        .zip(&new.parameters)
        .all(|(o, n)| !equivalence(&o.parameter_type, &n.parameter_type).is_different());

    prefix_matches && new.parameters[prefix..].iter().all(|p| p.has_default)
}

/// Pairs removed method signatures with added ones they are compatible with.
///
/// Returns, for each removed entry, the index of the added entry it merges
/// with. Removed entries are visited in order and each takes the first
/// unclaimed compatible added entry; ties are not re-ranked.
pub fn pair_compatible_overloads(
    removed: &[&MemberDescriptor],
    added: &[&MemberDescriptor],
) -> Vec<Option<usize>> {
    let mut claimed = vec![false; added.len()];

    removed
        .iter()
        .map(|old| {
            let hit = added
                .iter()
                .enumerate()
                .find(|(i, new)| !claimed[*i] && is_compatible_overload(old, new))
                .map(|(i, _)| i);
            if let Some(i) = hit {
                claimed[i] = true;
            }
            hit
        })
        .collect()
}
