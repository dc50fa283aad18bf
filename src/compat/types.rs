//! Core types for API surface change detection

use crate::compat::categories::{ChangeCategory, ChangeClass, ChangeSeverity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single change detected between two versions of a type.
///
/// Category and severity are fixed when the change is created; there are no
/// setters for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeChange {
    category: ChangeCategory,
    severity: ChangeSeverity,
    type_name: String,
    full_type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    member_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to_type: Option<String>,
    impact: String,
}

impl TypeChange {
    pub fn new(
        category: ChangeCategory,
        severity: ChangeSeverity,
        type_name: impl Into<String>,
        full_type_name: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            type_name: type_name.into(),
            full_type_name: full_type_name.into(),
            member_name: None,
            from: None,
            to: None,
            from_type: None,
            to_type: None,
            impact: category.impact().to_string(),
        }
    }

    pub fn with_member(mut self, member_name: impl Into<String>) -> Self {
        self.member_name = Some(member_name.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn with_types(mut self, from_type: impl Into<String>, to_type: impl Into<String>) -> Self {
        self.from_type = Some(from_type.into());
        self.to_type = Some(to_type.into());
        self
    }

    pub fn category(&self) -> ChangeCategory {
        self.category
    }

    pub fn severity(&self) -> ChangeSeverity {
        self.severity
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn full_type_name(&self) -> &str {
        &self.full_type_name
    }

    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn from_type(&self) -> Option<&str> {
        self.from_type.as_deref()
    }

    pub fn to_type(&self) -> Option<&str> {
        self.to_type.as_deref()
    }

    pub fn impact(&self) -> &str {
        &self.impact
    }

    pub fn is_breaking(&self) -> bool {
        self.category.is_breaking()
    }
}

/// Counts over the complete change list of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total_changes: usize,
    pub breaking_changes: usize,
    pub non_breaking_changes: usize,
    pub additions: usize,
    pub removals: usize,
    pub modifications: usize,
    pub changes_by_severity: BTreeMap<ChangeSeverity, usize>,
    pub changes_by_category: BTreeMap<ChangeCategory, usize>,
}

impl ComparisonSummary {
    pub fn from_changes(changes: &[TypeChange]) -> Self {
        let mut summary = Self {
            total_changes: changes.len(),
            ..Default::default()
        };

        for change in changes {
            let category = change.category();
            *summary.changes_by_severity.entry(change.severity()).or_insert(0) += 1;
            *summary.changes_by_category.entry(category).or_insert(0) += 1;

            match category.class() {
                ChangeClass::Breaking => summary.breaking_changes += 1,
                ChangeClass::Addition => summary.additions += 1,
                ChangeClass::NonBreaking => {}
            }
            if category.is_removal() {
                summary.removals += 1;
            }
            if !category.is_addition() && !category.is_removal() {
                summary.modifications += 1;
            }
        }

        summary.non_breaking_changes = summary.total_changes - summary.breaking_changes;
        summary
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.breaking_changes > 0
    }

    pub fn count_for(&self, category: ChangeCategory) -> usize {
        self.changes_by_category.get(&category).copied().unwrap_or(0)
    }
}

/// Result of comparing two API snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub package_id: String,
    pub from_version: String,
    pub to_version: String,
    /// Changes after member, severity and per-category filtering
    pub changes: Vec<TypeChange>,
    /// Computed before any of the filters that narrow `changes`
    pub summary: ComparisonSummary,
    pub is_truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name_filter: Option<String>,
    pub breaking_changes_only: bool,
    pub max_changes_per_category: usize,
}

impl ComparisonResult {
    pub fn has_breaking_changes(&self) -> bool {
        self.summary.has_breaking_changes()
    }

    pub fn changes_in(&self, category: ChangeCategory) -> impl Iterator<Item = &TypeChange> {
        self.changes.iter().filter(move |c| c.category() == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(category: ChangeCategory) -> TypeChange {
        TypeChange::new(category, category.default_severity(), "Widget", "Contoso.Widget")
    }

    #[test]
    fn test_summary_buckets() {
        let changes = vec![
            change(ChangeCategory::TypeRemoved),
            change(ChangeCategory::ReturnTypeChanged),
            change(ChangeCategory::MemberAdded),
            change(ChangeCategory::MemberObsoleted),
        ];
        let summary = ComparisonSummary::from_changes(&changes);

        assert_eq!(summary.total_changes, 4);
        assert_eq!(summary.breaking_changes, 2);
        assert_eq!(summary.non_breaking_changes, 2);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.removals, 1);
        // ReturnTypeChanged and MemberObsoleted
        assert_eq!(summary.modifications, 2);
        assert_eq!(summary.changes_by_severity[&ChangeSeverity::High], 2);
        assert_eq!(summary.changes_by_severity[&ChangeSeverity::Medium], 1);
        assert_eq!(summary.count_for(ChangeCategory::MemberAdded), 1);
        assert_eq!(summary.count_for(ChangeCategory::EnumValueAdded), 0);
    }

    #[test]
    fn test_change_carries_impact_text() {
        let c = change(ChangeCategory::SealedAdded).with_member("ignored");
        assert_eq!(c.impact(), ChangeCategory::SealedAdded.impact());
        assert_eq!(c.member_name(), Some("ignored"));
    }

    #[test]
    fn test_change_serializes_without_empty_fields() {
        let json = serde_json::to_value(change(ChangeCategory::TypeAdded)).unwrap();
        assert_eq!(json["category"], "TypeAdded");
        assert_eq!(json["severity"], "Low");
        assert!(json.get("member_name").is_none());
    }
}
