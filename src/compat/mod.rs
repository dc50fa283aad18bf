//! API surface change detection
//!
//! This module compares two snapshots of a library's public types and
//! classifies every structural difference by category and severity.

pub mod categories;
pub mod engine;
pub mod filter;
pub mod handlers;
pub mod identity;
pub mod member_rules;
pub mod overloads;
pub mod type_rules;
pub mod types;

pub use categories::{ChangeCategory, ChangeClass, ChangeSeverity};
pub use engine::{ApiDiffEngine, CompareOptions};
pub use types::{ComparisonResult, ComparisonSummary, TypeChange};
