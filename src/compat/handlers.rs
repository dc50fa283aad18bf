//! Helpers shared by the type and member rules for building changes.
//!
//! This is the single place where a category is turned into a [`TypeChange`],
//! so classification stays consistent across rules.

use crate::compat::categories::{ChangeCategory, ChangeSeverity};
use crate::compat::types::TypeChange;
use crate::model::TypeDescriptor;
use tracing::debug;

/// Helper function to create a type-level change with the category's severity
pub fn create_type_change(category: ChangeCategory, owner: &TypeDescriptor) -> TypeChange {
    create_type_change_with_severity(category, category.default_severity(), owner)
}

/// Helper function to create a type-level change with an explicit severity
pub fn create_type_change_with_severity(
    category: ChangeCategory,
    severity: ChangeSeverity,
    owner: &TypeDescriptor,
) -> TypeChange {
    TypeChange::new(category, severity, owner.name.clone(), owner.full_name())
}

/// Helper function to create a member-level change
pub fn create_member_change(
    category: ChangeCategory,
    owner: &TypeDescriptor,
    member_name: &str,
) -> TypeChange {
    create_type_change(category, owner).with_member(member_name)
}

/// Records a check that could not run because a reference is unresolved.
pub fn skip_unresolved(owner: &TypeDescriptor, what: &str, member_name: Option<&str>) {
    debug!(
        type_name = %owner.full_name(),
        member = member_name.unwrap_or(""),
        check = what,
        "skipping check on unresolved type reference"
    );
}
