//! API surface comparison engine
//!
//! Matches the types of two snapshots by version-independent identity, runs
//! the type and member rules over every matched pair, and narrows the
//! resulting change list according to [`CompareOptions`].

use crate::compat::categories::ChangeCategory;
use crate::compat::filter::{WildcardPattern, narrow_changes, type_matches};
use crate::compat::handlers::create_type_change;
use crate::compat::identity::TypeIdentity;
use crate::compat::type_rules::compare_type_pair;
use crate::compat::types::{ComparisonResult, ComparisonSummary, TypeChange};
use crate::error::{DiffError, Result, SnapshotSide};
use crate::model::TypeDescriptor;
use crate::snapshot::ApiSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

pub const DEFAULT_MAX_CHANGES_PER_CATEGORY: usize = 100;

fn default_max_changes_per_category() -> usize {
    DEFAULT_MAX_CHANGES_PER_CATEGORY
}

/// Options for a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Wildcard pattern matched against type simple and full names before diffing
    #[serde(default)]
    pub type_name_filter: Option<String>,
    /// `|`-separated wildcard patterns matched against change member names
    #[serde(default)]
    pub member_name_filter: Option<String>,
    /// Only return High severity changes
    #[serde(default)]
    pub breaking_changes_only: bool,
    /// Maximum number of returned changes per category
    #[serde(default = "default_max_changes_per_category")]
    pub max_changes_per_category: usize,
}

impl CompareOptions {
    /// Load configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        #[derive(serde::Deserialize)]
        struct ConfigFile {
            compare: Option<CompareOptions>,
        }

        let config_file: ConfigFile = serde_yaml::from_str(yaml)?;
        Ok(config_file.compare.unwrap_or_default())
    }

    fn compiled_filters(&self) -> Result<(Option<WildcardPattern>, Option<WildcardPattern>)> {
        let type_filter = non_empty(&self.type_name_filter)
            .map(WildcardPattern::new)
            .transpose()?;
        let member_filter = non_empty(&self.member_name_filter)
            .map(WildcardPattern::with_alternatives)
            .transpose()?;
        Ok((type_filter, member_filter))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            type_name_filter: None,
            member_name_filter: None,
            breaking_changes_only: false,
            max_changes_per_category: DEFAULT_MAX_CHANGES_PER_CATEGORY,
        }
    }
}

/// Main engine for API surface comparison
pub struct ApiDiffEngine {
    // Engine is stateless; every call works on its own snapshots
}

impl ApiDiffEngine {
    /// Create a new comparison engine
    pub fn new() -> Self {
        Self {}
    }

    /// Compares two snapshots, carrying their package and version labels into
    /// the result.
    pub fn compare_snapshots(
        &self,
        old: &ApiSnapshot,
        new: &ApiSnapshot,
        options: &CompareOptions,
    ) -> Result<ComparisonResult> {
        let mut result = self.compare(&old.types, &new.types, options)?;
        result.package_id = if new.package_id.is_empty() {
            old.package_id.clone()
        } else {
            new.package_id.clone()
        };
        result.from_version = old.version.clone();
        result.to_version = new.version.clone();
        Ok(result)
    }

    /// Like [`Self::compare_snapshots`], but returns [`DiffError::Cancelled`]
    /// if `cancel` is already set.
    pub fn compare_cancellable(
        &self,
        old: &ApiSnapshot,
        new: &ApiSnapshot,
        options: &CompareOptions,
        cancel: &AtomicBool,
    ) -> Result<ComparisonResult> {
        if cancel.load(Ordering::Relaxed) {
            return Err(DiffError::Cancelled);
        }
        self.compare_snapshots(old, new, options)
    }

    /// Compares two lists of public types.
    pub fn compare(
        &self,
        old_types: &[TypeDescriptor],
        new_types: &[TypeDescriptor],
        options: &CompareOptions,
    ) -> Result<ComparisonResult> {
        if old_types.is_empty() {
            return Err(DiffError::EmptySnapshot {
                side: SnapshotSide::Old,
            });
        }
        if new_types.is_empty() {
            return Err(DiffError::EmptySnapshot {
                side: SnapshotSide::New,
            });
        }

        let (type_filter, member_filter) = options.compiled_filters()?;
        let keep = |t: &&TypeDescriptor| type_filter.as_ref().is_none_or(|p| type_matches(p, t));
        let old_selected: Vec<&TypeDescriptor> = old_types.iter().filter(keep).collect();
        let new_selected: Vec<&TypeDescriptor> = new_types.iter().filter(keep).collect();

        let all_changes = diff_type_sets(&old_selected, &new_selected);
        let summary = ComparisonSummary::from_changes(&all_changes);

        let narrowed = narrow_changes(
            &all_changes,
            member_filter.as_ref(),
            options.breaking_changes_only,
            options.max_changes_per_category,
        );

        info!(
            old_types = old_selected.len(),
            new_types = new_selected.len(),
            total = summary.total_changes,
            breaking = summary.breaking_changes,
            returned = narrowed.changes.len(),
            truncated = narrowed.is_truncated,
            "api surface comparison complete"
        );

        Ok(ComparisonResult {
            package_id: String::new(),
            from_version: String::new(),
            to_version: String::new(),
            changes: narrowed.changes,
            summary,
            is_truncated: narrowed.is_truncated,
            type_name_filter: options.type_name_filter.clone(),
            member_name_filter: options.member_name_filter.clone(),
            breaking_changes_only: options.breaking_changes_only,
            max_changes_per_category: options.max_changes_per_category,
        })
    }
}

impl Default for ApiDiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Every identity present on either side ends up unchanged, compared,
/// removed or added.
fn diff_type_sets(old_types: &[&TypeDescriptor], new_types: &[&TypeDescriptor]) -> Vec<TypeChange> {
    let mut new_by_identity: HashMap<TypeIdentity, &TypeDescriptor> = HashMap::new();
    for t in new_types {
        // First declaration wins, as on the old side
        new_by_identity.entry(TypeIdentity::of_descriptor(t)).or_insert(*t);
    }
    let mut seen: HashSet<TypeIdentity> = HashSet::new();
    let mut changes = Vec::new();

    for old in old_types {
        let identity = TypeIdentity::of_descriptor(old);
        if !seen.insert(identity.clone()) {
            debug!(type_name = %identity, "duplicate type identity in old snapshot");
            continue;
        }
        match new_by_identity.get(&identity) {
            Some(new) => changes.extend(compare_type_pair(old, new)),
            None => changes.push(
                create_type_change(ChangeCategory::TypeRemoved, old).with_from(identity.to_string()),
            ),
        }
    }

    let mut added_seen: HashSet<TypeIdentity> = HashSet::new();
    for new in new_types {
        let identity = TypeIdentity::of_descriptor(new);
        if seen.contains(&identity) || !added_seen.insert(identity.clone()) {
            continue;
        }
        changes.push(create_type_change(ChangeCategory::TypeAdded, new).with_to(identity.to_string()));
    }

    debug!(changes = changes.len(), "type sets compared");
    changes
}
