//! Type-level rules: base class, interfaces, modifiers, generic arity and
//! enum values of one matched type pair.

use crate::compat::categories::ChangeCategory;
use crate::compat::handlers::{create_member_change, create_type_change, skip_unresolved};
use crate::compat::identity::{Equivalence, equivalence, identity_string, optional_equivalence};
use crate::compat::member_rules;
use crate::compat::types::TypeChange;
use crate::model::{TypeDescriptor, TypeRef};
use std::collections::HashSet;

/// Compares a matched old/new type pair. All rules are independent and may
/// fire together.
pub fn compare_type_pair(old: &TypeDescriptor, new: &TypeDescriptor) -> Vec<TypeChange> {
    let mut changes = Vec::new();

    check_base_class(old, new, &mut changes);
    check_interfaces(old, new, &mut changes);

    if !old.is_sealed && new.is_sealed {
        changes.push(create_type_change(ChangeCategory::SealedAdded, new));
    }

    if !old.is_abstract && new.is_abstract {
        changes.push(create_type_change(ChangeCategory::AbstractAdded, new));
    }

    if old.generic_parameter_count != new.generic_parameter_count {
        changes.push(
            create_type_change(ChangeCategory::GenericParametersChanged, new)
                .with_from(old.generic_parameter_count.to_string())
                .with_to(new.generic_parameter_count.to_string()),
        );
    }

    if old.is_enum && new.is_enum {
        changes.extend(compare_enum_values(old, new));
    } else {
        changes.extend(member_rules::compare_members(old, new));
    }

    changes
}

fn check_base_class(old: &TypeDescriptor, new: &TypeDescriptor, changes: &mut Vec<TypeChange>) {
    match optional_equivalence(old.base_type.as_ref(), new.base_type.as_ref()) {
        Equivalence::Equivalent => {}
        Equivalence::Unknown => skip_unresolved(new, "base class", None),
        Equivalence::Different => {
            let describe = |t: Option<&TypeRef>| t.map(identity_string).unwrap_or_default();
            changes.push(
                create_type_change(ChangeCategory::BaseClassChanged, new).with_types(
                    describe(old.base_type.as_ref()),
                    describe(new.base_type.as_ref()),
                ),
            );
        }
    }
}

/// Whether `candidates` holds a reference equivalent to `target`. An
/// undecidable comparison (unresolved, same name) counts as a match.
fn contains_equivalent(candidates: &[TypeRef], target: &TypeRef) -> bool {
    candidates
        .iter()
        .any(|c| !equivalence(c, target).is_different())
}

fn check_interfaces(old: &TypeDescriptor, new: &TypeDescriptor, changes: &mut Vec<TypeChange>) {
    for iface in &old.interfaces {
        if iface.is_unresolved() {
            skip_unresolved(new, "interface removed", None);
            continue;
        }
        if !contains_equivalent(&new.interfaces, iface) {
            changes.push(
                create_type_change(ChangeCategory::InterfaceRemoved, new)
                    .with_from(identity_string(iface)),
            );
        }
    }

    for iface in &new.interfaces {
        if iface.is_unresolved() {
            skip_unresolved(new, "interface added", None);
            continue;
        }
        if !contains_equivalent(&old.interfaces, iface) {
            changes.push(
                create_type_change(ChangeCategory::InterfaceAdded, new)
                    .with_to(identity_string(iface)),
            );
        }
    }
}

/// Diffs enum value names. Underlying numeric values are not compared.
pub fn compare_enum_values(old: &TypeDescriptor, new: &TypeDescriptor) -> Vec<TypeChange> {
    let old_names: HashSet<&str> = old.enum_values.iter().map(|v| v.name.as_str()).collect();
    let new_names: HashSet<&str> = new.enum_values.iter().map(|v| v.name.as_str()).collect();
    let mut changes = Vec::new();

    for value in &old.enum_values {
        if !new_names.contains(value.name.as_str()) {
            changes.push(
                create_member_change(ChangeCategory::EnumValueRemoved, new, &value.name)
                    .with_from(value.name.clone()),
            );
        }
    }

    for value in &new.enum_values {
        if !old_names.contains(value.name.as_str()) {
            changes.push(
                create_member_change(ChangeCategory::EnumValueAdded, new, &value.name)
                    .with_to(value.name.clone()),
            );
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::categories::ChangeSeverity;
    use crate::model::AssemblyName;

    fn class(name: &str) -> TypeDescriptor {
        TypeDescriptor::new("Contoso", name, "Contoso.Core")
    }

    fn categories(changes: &[TypeChange]) -> Vec<ChangeCategory> {
        changes.iter().map(TypeChange::category).collect()
    }

    #[test]
    fn test_identical_types_have_no_changes() {
        let t = class("Widget");
        assert!(compare_type_pair(&t, &t.clone()).is_empty());
    }

    #[test]
    fn test_base_class_version_only_change_is_ignored() {
        let mut old = class("Widget");
        let mut new = class("Widget");
        old.base_type = Some(TypeRef::Named(crate::model::TypeName::new(
            "Contoso",
            "Component",
            AssemblyName::new("Contoso.Core").with_version("1.0.0.0"),
        )));
        new.base_type = Some(TypeRef::Named(crate::model::TypeName::new(
            "Contoso",
            "Component",
            AssemblyName::new("Contoso.Core").with_version("2.0.0.0"),
        )));
        assert!(compare_type_pair(&old, &new).is_empty());
    }

    #[test]
    fn test_base_class_changed() {
        let mut old = class("Widget");
        let mut new = class("Widget");
        old.base_type = Some(TypeRef::named("Contoso", "Component", "Contoso.Core"));
        new.base_type = Some(TypeRef::named("Contoso", "Control", "Contoso.Core"));

        let changes = compare_type_pair(&old, &new);
        assert_eq!(categories(&changes), vec![ChangeCategory::BaseClassChanged]);
        assert_eq!(changes[0].severity(), ChangeSeverity::High);
        assert_eq!(changes[0].from_type(), Some("Contoso.Component, Contoso.Core"));
        assert_eq!(changes[0].to_type(), Some("Contoso.Control, Contoso.Core"));
    }

    #[test]
    fn test_unresolved_base_class_is_skipped() {
        let mut old = class("Widget");
        let mut new = class("Widget");
        old.base_type = Some(TypeRef::named("Contoso", "Component", "Contoso.Core"));
        new.base_type = Some(TypeRef::unresolved("Contoso.Component"));
        assert!(compare_type_pair(&old, &new).is_empty());
    }

    #[test]
    fn test_interface_changes() {
        let mut old = class("Widget");
        let mut new = class("Widget");
        old.interfaces = vec![
            TypeRef::named("System", "IDisposable", "System.Runtime"),
            TypeRef::named("System", "ICloneable", "System.Runtime"),
        ];
        new.interfaces = vec![
            TypeRef::named("System", "IDisposable", "System.Runtime"),
            TypeRef::named("System", "IComparable", "System.Runtime"),
        ];

        let changes = compare_type_pair(&old, &new);
        assert_eq!(
            categories(&changes),
            vec![ChangeCategory::InterfaceRemoved, ChangeCategory::InterfaceAdded]
        );
        assert_eq!(changes[0].from(), Some("System.ICloneable, System.Runtime"));
        assert_eq!(changes[1].severity(), ChangeSeverity::Low);
    }

    #[test]
    fn test_unresolved_interface_does_not_hide_other_changes() {
        let mut old = class("Widget");
        let mut new = class("Widget");
        old.interfaces = vec![
            TypeRef::named("System", "IDisposable", "System.Runtime"),
            TypeRef::named("System", "ICloneable", "System.Runtime"),
        ];
        new.interfaces = vec![
            TypeRef::named("System", "IDisposable", "System.Runtime"),
            TypeRef::unresolved("Vendor.Plugins.IPlugin"),
        ];

        let changes = compare_type_pair(&old, &new);
        assert_eq!(categories(&changes), vec![ChangeCategory::InterfaceRemoved]);
        assert_eq!(changes[0].from(), Some("System.ICloneable, System.Runtime"));

        // Same situation seen from the other direction
        let changes = compare_type_pair(&new, &old);
        assert_eq!(categories(&changes), vec![ChangeCategory::InterfaceAdded]);
        assert_eq!(changes[0].to(), Some("System.ICloneable, System.Runtime"));
    }

    #[test]
    fn test_unresolved_interface_skips_only_its_own_check() {
        let mut old = class("Widget");
        let mut new = class("Widget");
        old.interfaces = vec![
            TypeRef::unresolved("Vendor.Plugins.IPlugin, Vendor.Plugins"),
            TypeRef::named("System", "ICloneable", "System.Runtime"),
        ];
        new.interfaces = vec![TypeRef::named("Vendor.Plugins", "IPlugin", "Vendor.Plugins")];
        new.is_sealed = true;

        let changes = compare_type_pair(&old, &new);
        assert_eq!(
            categories(&changes),
            vec![ChangeCategory::InterfaceRemoved, ChangeCategory::SealedAdded]
        );
        assert_eq!(changes[0].from(), Some("System.ICloneable, System.Runtime"));
    }

    #[test]
    fn test_unresolved_base_class_with_other_name_is_a_change() {
        let mut old = class("Widget");
        let mut new = class("Widget");
        old.base_type = Some(TypeRef::named("Contoso", "Component", "Contoso.Core"));
        new.base_type = Some(TypeRef::unresolved("Vendor.Controls.Control"));

        let changes = compare_type_pair(&old, &new);
        assert_eq!(categories(&changes), vec![ChangeCategory::BaseClassChanged]);
        assert_eq!(changes[0].to_type(), Some("Vendor.Controls.Control"));
    }

    #[test]
    fn test_modifier_and_arity_changes_fire_together() {
        let old = class("Widget");
        let mut new = class("Widget");
        new.is_sealed = true;
        new.is_abstract = true;
        new.generic_parameter_count = 1;

        let changes = compare_type_pair(&old, &new);
        assert_eq!(
            categories(&changes),
            vec![
                ChangeCategory::SealedAdded,
                ChangeCategory::AbstractAdded,
                ChangeCategory::GenericParametersChanged,
            ]
        );
        assert!(changes.iter().all(|c| c.severity() == ChangeSeverity::High));
    }

    #[test]
    fn test_removing_sealed_is_not_reported() {
        let mut old = class("Widget");
        old.is_sealed = true;
        let new = class("Widget");
        assert!(compare_type_pair(&old, &new).is_empty());
    }

    #[test]
    fn test_enum_value_removed() {
        let old = class("Color").as_enum(["A", "B", "C"]);
        let new = class("Color").as_enum(["A", "C"]);

        let changes = compare_type_pair(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].category(), ChangeCategory::EnumValueRemoved);
        assert_eq!(changes[0].member_name(), Some("B"));
        assert_eq!(changes[0].severity(), ChangeSeverity::High);
    }

    #[test]
    fn test_enum_renumbering_is_not_tracked() {
        let old = class("Color").as_enum(["A", "B"]);
        let new = class("Color").as_enum(["B", "A", "D"]);

        let changes = compare_type_pair(&old, &new);
        assert_eq!(categories(&changes), vec![ChangeCategory::EnumValueAdded]);
        assert_eq!(changes[0].to(), Some("D"));
    }
}
