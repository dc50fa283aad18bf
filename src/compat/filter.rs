//! Wildcard filters and the post-diff narrowing of the change list.

use crate::compat::categories::{ChangeCategory, ChangeSeverity};
use crate::compat::types::TypeChange;
use crate::error::{DiffError, Result};
use crate::model::TypeDescriptor;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// Case-insensitive, anchored wildcard pattern (`*` any run, `?` any single
/// character). Alternatives may be separated by `|`.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Parses a single pattern; `|` is matched literally.
    pub fn new(pattern: &str) -> Result<Self> {
        Self::build(pattern, &[pattern])
    }

    /// Parses `|`-separated alternatives.
    pub fn with_alternatives(pattern: &str) -> Result<Self> {
        let alternatives: Vec<&str> = pattern.split('|').map(str::trim).collect();
        Self::build(pattern, &alternatives)
    }

    fn build(source: &str, alternatives: &[&str]) -> Result<Self> {
        if alternatives.iter().any(|a| a.is_empty()) {
            return Err(DiffError::InvalidFilter {
                pattern: source.to_string(),
                reason: "empty pattern".to_string(),
            });
        }

        let body: Vec<String> = alternatives.iter().map(|a| wildcard_to_regex(a)).collect();
        let regex = RegexBuilder::new(&format!("^(?:{})$", body.join("|")))
            .case_insensitive(true)
            .build()
            .map_err(|e| DiffError::InvalidFilter {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Escapes every regex metacharacter, then turns the wildcards back on.
fn wildcard_to_regex(pattern: &str) -> String {
    regex::escape(pattern).replace(r"\*", ".*").replace(r"\?", ".")
}

/// Matches a type by simple name or full name.
pub fn type_matches(pattern: &WildcardPattern, t: &TypeDescriptor) -> bool {
    pattern.is_match(&t.name) || pattern.is_match(&t.full_name())
}

/// Narrowed change list and whether the per-category cap dropped anything.
#[derive(Debug, Default)]
pub struct Narrowed {
    pub changes: Vec<TypeChange>,
    pub is_truncated: bool,
}

/// Applies, in order: member-name filter, breaking-only filter, per-category
/// cap. Detection order is preserved.
pub fn narrow_changes(
    changes: &[TypeChange],
    member_filter: Option<&WildcardPattern>,
    breaking_only: bool,
    max_per_category: usize,
) -> Narrowed {
    let mut per_category: HashMap<ChangeCategory, usize> = HashMap::new();
    let mut narrowed = Narrowed::default();

    let selected = changes
        .iter()
        .filter(|c| match member_filter {
            Some(pattern) => c.member_name().is_some_and(|m| pattern.is_match(m)),
            None => true,
        })
        .filter(|c| !breaking_only || c.severity() == ChangeSeverity::High);

    for change in selected {
        let seen = per_category.entry(change.category()).or_insert(0);
        if *seen >= max_per_category {
            narrowed.is_truncated = true;
            continue;
        }
        *seen += 1;
        narrowed.changes.push(change.clone());
    }

    narrowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(category: ChangeCategory, member: Option<&str>) -> TypeChange {
        let c = TypeChange::new(category, category.default_severity(), "Widget", "Contoso.Widget");
        match member {
            Some(m) => c.with_member(m),
            None => c,
        }
    }

    #[test]
    fn test_wildcards_are_anchored_and_case_insensitive() {
        let p = WildcardPattern::new("*Service").unwrap();
        assert!(p.is_match("OrderService"));
        assert!(p.is_match("orderservice"));
        assert!(!p.is_match("OrderServiceFactory"));

        let q = WildcardPattern::new("Get?").unwrap();
        assert!(q.is_match("GetX"));
        assert!(!q.is_match("Get"));
        assert!(!q.is_match("GetXY"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let p = WildcardPattern::new("List`1.Add(T)").unwrap();
        assert!(p.is_match("List`1.Add(T)"));
        assert!(!p.is_match("List`1xAdd(T)"));
        assert!(WildcardPattern::new("a+b[").unwrap().is_match("A+B["));
    }

    #[test]
    fn test_alternatives() {
        let p = WildcardPattern::with_alternatives("Get*|Set*").unwrap();
        assert!(p.is_match("GetValue"));
        assert!(p.is_match("setValue"));
        assert!(!p.is_match("Reset"));
    }

    #[test]
    fn test_empty_alternative_is_input_error() {
        let err = WildcardPattern::with_alternatives("Get*||Set*").unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_type_matches_simple_or_full_name() {
        let t = TypeDescriptor::new("Contoso.Orders", "OrderService", "Contoso");
        assert!(type_matches(&WildcardPattern::new("OrderService").unwrap(), &t));
        assert!(type_matches(&WildcardPattern::new("Contoso.Orders.*").unwrap(), &t));
        assert!(!type_matches(&WildcardPattern::new("Orders.*").unwrap(), &t));
    }

    #[test]
    fn test_member_filter_drops_type_level_changes() {
        let changes = vec![
            change(ChangeCategory::SealedAdded, None),
            change(ChangeCategory::MemberRemoved, Some("GetValue")),
            change(ChangeCategory::MemberRemoved, Some("Reset")),
        ];
        let filter = WildcardPattern::with_alternatives("Get*").unwrap();
        let narrowed = narrow_changes(&changes, Some(&filter), false, 100);
        assert_eq!(narrowed.changes.len(), 1);
        assert_eq!(narrowed.changes[0].member_name(), Some("GetValue"));
        assert!(!narrowed.is_truncated);
    }

    #[test]
    fn test_breaking_only_keeps_high_severity() {
        let changes = vec![
            change(ChangeCategory::MemberAdded, Some("A")),
            change(ChangeCategory::MemberObsoleted, Some("B")),
            change(ChangeCategory::MemberRemoved, Some("C")),
        ];
        let narrowed = narrow_changes(&changes, None, true, 100);
        assert_eq!(narrowed.changes.len(), 1);
        assert_eq!(narrowed.changes[0].category(), ChangeCategory::MemberRemoved);
    }

    #[test]
    fn test_cap_is_per_category_in_detection_order() {
        let changes = vec![
            change(ChangeCategory::MemberAdded, Some("A")),
            change(ChangeCategory::MemberRemoved, Some("B")),
            change(ChangeCategory::MemberAdded, Some("C")),
            change(ChangeCategory::MemberAdded, Some("D")),
        ];
        let narrowed = narrow_changes(&changes, None, false, 2);
        let members: Vec<_> = narrowed.changes.iter().filter_map(TypeChange::member_name).collect();
        assert_eq!(members, vec!["A", "B", "C"]);
        assert!(narrowed.is_truncated);
    }
}
