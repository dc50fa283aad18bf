//! Provides the high-level API for comparing two versions of a library surface.

use crate::compat::{ApiDiffEngine, ChangeSeverity, CompareOptions, ComparisonResult};
use crate::generate_fingerprint;
use crate::snapshot::{ApiSnapshot, SnapshotDocument};
use std::path::Path;

/// The result of a compatibility comparison between two API surfaces.
#[derive(Debug, PartialEq, Eq)]
pub enum Compatibility {
    /// The two surfaces are structurally identical.
    Green,
    /// The new surface is backward-compatible with the old one (e.g., a member was added).
    Yellow,
    /// The new surface breaks callers of the old one (e.g., a member was removed).
    Red,
}

/// Represents the public surface of one library version, holding its
/// snapshot and fingerprint.
pub struct ApiSurface {
    /// The public types of this version.
    pub snapshot: ApiSnapshot,
    /// The version-insensitive surface fingerprint.
    pub fingerprint: String,
}

impl ApiSurface {
    /// Creates a new `ApiSurface` from the content of a snapshot document.
    ///
    /// This parses the document and computes the fingerprint, so it should be
    /// called once per version.
    pub fn try_from(content: &str) -> anyhow::Result<Self> {
        let document = SnapshotDocument::from_content(content)?;
        Self::from_snapshot(ApiSnapshot::from_document(&document))
    }

    /// Loads a snapshot document from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let document = SnapshotDocument::from_file(path)?;
        Self::from_snapshot(ApiSnapshot::from_document(&document))
    }

    pub fn from_snapshot(snapshot: ApiSnapshot) -> anyhow::Result<Self> {
        let fingerprint = generate_fingerprint(&snapshot)?;
        Ok(ApiSurface {
            snapshot,
            fingerprint,
        })
    }

    /// Compares this surface (the "old" version) with another surface (the
    /// "new" version) to determine their compatibility level.
    pub fn compare_with(&self, new_surface: &ApiSurface) -> anyhow::Result<Compatibility> {
        // Identical fingerprints mean structurally identical surfaces.
        if self.fingerprint == new_surface.fingerprint {
            return Ok(Compatibility::Green);
        }

        let options = CompareOptions {
            breaking_changes_only: true,
            ..Default::default()
        };
        let result = self.check_changes(new_surface, &options)?;

        let has_high = result
            .summary
            .changes_by_severity
            .get(&ChangeSeverity::High)
            .is_some_and(|count| *count > 0);
        if has_high {
            Ok(Compatibility::Red)
        } else {
            Ok(Compatibility::Yellow)
        }
    }

    /// Runs the full comparison against a newer surface.
    pub fn check_changes(
        &self,
        new_surface: &ApiSurface,
        options: &CompareOptions,
    ) -> anyhow::Result<ComparisonResult> {
        let engine = ApiDiffEngine::new();
        Ok(engine.compare_snapshots(&self.snapshot, &new_surface.snapshot, options)?)
    }
}
