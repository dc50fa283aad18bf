//! Member-level rules over the declared public and protected members of a
//! matched type pair.

use crate::compat::categories::{ChangeCategory, ChangeSeverity};
use crate::compat::handlers::{
    create_member_change, create_type_change_with_severity, skip_unresolved,
};
use crate::compat::identity::{Equivalence, SignatureKey, equivalence, identity_string, optional_equivalence};
use crate::compat::overloads::pair_compatible_overloads;
use crate::compat::types::TypeChange;
use crate::model::{MemberDescriptor, MemberKind, TypeDescriptor};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Externally visible members keyed by signature, in declaration order.
struct MemberIndex<'a> {
    ordered: Vec<(SignatureKey, &'a MemberDescriptor)>,
    by_key: HashMap<SignatureKey, &'a MemberDescriptor>,
}

impl<'a> MemberIndex<'a> {
    fn build(owner: &'a TypeDescriptor) -> Self {
        let mut ordered = Vec::new();
        let mut by_key = HashMap::new();

        for member in owner
            .members
            .iter()
            .filter(|m| m.accessibility.is_externally_visible())
        {
            let key = SignatureKey::of(member);
            if by_key.contains_key(&key) {
                debug!(
                    type_name = %owner.full_name(),
                    signature = %key,
                    "duplicate signature key, keeping first declaration"
                );
                continue;
            }
            by_key.insert(key.clone(), member);
            ordered.push((key, member));
        }

        Self { ordered, by_key }
    }

    fn contains(&self, key: &SignatureKey) -> bool {
        self.by_key.contains_key(key)
    }
}

/// Diffs the member sets of a matched type pair.
pub fn compare_members(old: &TypeDescriptor, new: &TypeDescriptor) -> Vec<TypeChange> {
    let old_index = MemberIndex::build(old);
    let new_index = MemberIndex::build(new);

    let removed: Vec<(&SignatureKey, &MemberDescriptor)> = old_index
        .ordered
        .iter()
        .filter(|(key, _)| !new_index.contains(key))
        .map(|(key, member)| (key, *member))
        .collect();
    let added: Vec<(&SignatureKey, &MemberDescriptor)> = new_index
        .ordered
        .iter()
        .filter(|(key, _)| !old_index.contains(key))
        .map(|(key, member)| (key, *member))
        .collect();

    let mut consumed_added = vec![false; added.len()];
    let mut handled_removed = vec![false; removed.len()];
    let mut retyped = Vec::new();

    // A property or field whose key changed but whose name survived changed
    // its declared type.
    for (ri, (_, old_member)) in removed.iter().enumerate() {
        if !matches!(old_member.kind, MemberKind::Property | MemberKind::Field) {
            continue;
        }
        let hit = added.iter().enumerate().find(|(ai, (_, new_member))| {
            !consumed_added[*ai] && new_member.kind == old_member.kind && new_member.name == old_member.name
        });
        if let Some((ai, (_, new_member))) = hit {
            consumed_added[ai] = true;
            handled_removed[ri] = true;
            retyped.extend(check_member_type(new, old_member, new_member));
        }
    }

    let unpaired_removed: Vec<&MemberDescriptor> = removed
        .iter()
        .enumerate()
        .filter(|(ri, _)| !handled_removed[*ri])
        .map(|(_, (_, m))| *m)
        .collect();
    let added_candidates: Vec<(usize, &MemberDescriptor)> = added
        .iter()
        .enumerate()
        .filter(|(ai, _)| !consumed_added[*ai])
        .map(|(ai, (_, m))| (ai, *m))
        .collect();
    let candidate_members: Vec<&MemberDescriptor> = added_candidates.iter().map(|(_, m)| *m).collect();
    let mut pairing = pair_compatible_overloads(&unpaired_removed, &candidate_members).into_iter();

    let mut changes = Vec::new();
    let mut replaced_names: HashSet<(MemberKind, &str)> = HashSet::new();

    for (ri, (key, member)) in removed.iter().enumerate() {
        if handled_removed[ri] {
            continue;
        }
        match pairing.next().flatten() {
            Some(ci) => {
                let (ai, _) = added_candidates[ci];
                consumed_added[ai] = true;
                changes.push(
                    create_member_change(ChangeCategory::MethodOverloadAdded, new, &member.name)
                        .with_from(key.to_string())
                        .with_to(added[ai].0.to_string()),
                );
            }
            None => {
                replaced_names.insert((member.kind, member.name.as_str()));
                changes.push(
                    create_member_change(ChangeCategory::MemberRemoved, new, &member.name)
                        .with_from(key.to_string()),
                );
            }
        }
    }

    for (ai, (key, member)) in added.iter().enumerate() {
        if consumed_added[ai] {
            continue;
        }
        // Same-name replacement of a removed signature breaks existing callers.
        let severity = if replaced_names.contains(&(member.kind, member.name.as_str())) {
            ChangeSeverity::High
        } else {
            ChangeCategory::MemberAdded.default_severity()
        };
        changes.push(
            create_type_change_with_severity(ChangeCategory::MemberAdded, severity, new)
                .with_member(member.name.clone())
                .with_to(key.to_string()),
        );
    }

    for (key, old_member) in &old_index.ordered {
        if let Some(new_member) = new_index.by_key.get(key) {
            changes.extend(compare_member_pair(new, key, old_member, new_member));
        }
    }

    changes.extend(retyped);
    changes
}

/// Detail checks for a member present under the same signature key on both
/// sides.
fn compare_member_pair(
    owner: &TypeDescriptor,
    key: &SignatureKey,
    old: &MemberDescriptor,
    new: &MemberDescriptor,
) -> Vec<TypeChange> {
    let mut changes = Vec::new();
    let signature = key.to_string();

    match old.kind {
        MemberKind::Method => check_method_signature(owner, &signature, old, new, &mut changes),
        MemberKind::Property | MemberKind::Field => changes.extend(check_member_type(owner, old, new)),
        MemberKind::Event => {}
    }

    if old.is_virtual && !new.is_virtual {
        changes.push(
            create_member_change(ChangeCategory::VirtualRemoved, owner, &new.name).with_from(signature.clone()),
        );
    }

    if new.accessibility < old.accessibility {
        changes.push(
            create_member_change(ChangeCategory::AccessibilityReduced, owner, &new.name)
                .with_from(old.accessibility.to_string())
                .with_to(new.accessibility.to_string()),
        );
    } else if new.accessibility > old.accessibility {
        changes.push(
            create_member_change(ChangeCategory::AccessibilityExpanded, owner, &new.name)
                .with_from(old.accessibility.to_string())
                .with_to(new.accessibility.to_string()),
        );
    }

    if !old.is_obsolete && new.is_obsolete {
        changes.push(
            create_member_change(ChangeCategory::MemberObsoleted, owner, &new.name).with_from(signature),
        );
    }

    changes
}

fn check_method_signature(
    owner: &TypeDescriptor,
    signature: &str,
    old: &MemberDescriptor,
    new: &MemberDescriptor,
    changes: &mut Vec<TypeChange>,
) {
    match optional_equivalence(old.member_type.as_ref(), new.member_type.as_ref()) {
        Equivalence::Equivalent => {}
        Equivalence::Unknown => skip_unresolved(owner, "return type", Some(new.name.as_str())),
        Equivalence::Different => {
            let describe = |m: &MemberDescriptor| m.member_type.as_ref().map(identity_string).unwrap_or_default();
            changes.push(
                create_member_change(ChangeCategory::ReturnTypeChanged, owner, &new.name)
                    .with_from(signature)
                    .with_to(signature)
                    .with_types(describe(old), describe(new)),
            );
        }
    }

    if old.parameters.len() != new.parameters.len() {
        changes.push(
            create_member_change(ChangeCategory::MethodSignatureChanged, owner, &new.name)
                .with_from(signature)
                .with_to(SignatureKey::of(new).to_string()),
        );
        return;
    }

    for (position, (o, n)) in old.parameters.iter().zip(&new.parameters).enumerate() {
        match equivalence(&o.parameter_type, &n.parameter_type) {
            Equivalence::Equivalent => {}
            Equivalence::Unknown => skip_unresolved(owner, "parameter type", Some(new.name.as_str())),
            Equivalence::Different => changes.push(
                create_member_change(ChangeCategory::ParameterTypeChanged, owner, &new.name)
                    .with_from(format!("{signature} #{position} {}", o.name))
                    .with_to(n.name.clone())
                    .with_types(identity_string(&o.parameter_type), identity_string(&n.parameter_type)),
            ),
        }

        if o.has_default != n.has_default {
            // Dropping a default breaks call sites that omitted the argument.
            let severity = if o.has_default {
                ChangeSeverity::Medium
            } else {
                ChangeSeverity::Low
            };
            changes.push(
                create_type_change_with_severity(ChangeCategory::ParameterDefaultChanged, severity, owner)
                    .with_member(new.name.clone())
                    .with_from(format!("{signature} #{position} {}", o.name))
                    .with_to(if n.has_default { "optional" } else { "required" }),
            );
        }
    }
}

fn check_member_type(owner: &TypeDescriptor, old: &MemberDescriptor, new: &MemberDescriptor) -> Option<TypeChange> {
    match optional_equivalence(old.member_type.as_ref(), new.member_type.as_ref()) {
        Equivalence::Equivalent => None,
        Equivalence::Unknown => {
            skip_unresolved(owner, "member type", Some(new.name.as_str()));
            None
        }
        Equivalence::Different => {
            let describe = |m: &MemberDescriptor| m.member_type.as_ref().map(identity_string).unwrap_or_default();
            Some(
                create_member_change(ChangeCategory::MemberTypeChanged, owner, &new.name)
                    .with_from(SignatureKey::of(old).to_string())
                    .with_to(SignatureKey::of(new).to_string())
                    .with_types(describe(old), describe(new)),
            )
        }
    }
}
