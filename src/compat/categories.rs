//! Change taxonomy: every detected change belongs to exactly one category,
//! and every category belongs to exactly one change class.

use serde::{Deserialize, Serialize};

/// Top-level bucket a category is statically assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeClass {
    /// Existing callers may fail to compile or run.
    Breaking,
    /// Modification that existing callers tolerate.
    NonBreaking,
    /// New surface.
    Addition,
}

/// How much attention a change needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeSeverity {
    Low,
    Medium,
    High,
}

impl ChangeSeverity {
    pub fn all() -> [Self; 3] {
        [ChangeSeverity::Low, ChangeSeverity::Medium, ChangeSeverity::High]
    }
}

impl std::fmt::Display for ChangeSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeSeverity::Low => "Low",
            ChangeSeverity::Medium => "Medium",
            ChangeSeverity::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeCategory {
    // Breaking
    TypeRemoved,
    BaseClassChanged,
    InterfaceRemoved,
    SealedAdded,
    AbstractAdded,
    GenericParametersChanged,
    MemberRemoved,
    MemberTypeChanged,
    MethodSignatureChanged,
    ParameterRemoved,
    ParameterTypeChanged,
    ReturnTypeChanged,
    VirtualRemoved,
    AccessibilityReduced,
    EnumValueRemoved,
    // Non-breaking modifications
    MemberObsoleted,
    AccessibilityExpanded,
    ParameterDefaultChanged,
    // Additions
    TypeAdded,
    MemberAdded,
    MethodOverloadAdded,
    ParameterAdded,
    InterfaceAdded,
    EnumValueAdded,
}

/// Categories whose changes count as breaking.
pub const BREAKING_CATEGORIES: &[ChangeCategory] = &[
    ChangeCategory::TypeRemoved,
    ChangeCategory::BaseClassChanged,
    ChangeCategory::InterfaceRemoved,
    ChangeCategory::SealedAdded,
    ChangeCategory::AbstractAdded,
    ChangeCategory::GenericParametersChanged,
    ChangeCategory::MemberRemoved,
    ChangeCategory::MemberTypeChanged,
    ChangeCategory::MethodSignatureChanged,
    ChangeCategory::ParameterRemoved,
    ChangeCategory::ParameterTypeChanged,
    ChangeCategory::ReturnTypeChanged,
    ChangeCategory::VirtualRemoved,
    ChangeCategory::AccessibilityReduced,
    ChangeCategory::EnumValueRemoved,
];

/// Categories that modify existing surface without breaking it.
pub const NON_BREAKING_CATEGORIES: &[ChangeCategory] = &[
    ChangeCategory::MemberObsoleted,
    ChangeCategory::AccessibilityExpanded,
    ChangeCategory::ParameterDefaultChanged,
];

/// Categories that introduce new surface.
pub const ADDITION_CATEGORIES: &[ChangeCategory] = &[
    ChangeCategory::TypeAdded,
    ChangeCategory::MemberAdded,
    ChangeCategory::MethodOverloadAdded,
    ChangeCategory::ParameterAdded,
    ChangeCategory::InterfaceAdded,
    ChangeCategory::EnumValueAdded,
];

/// Categories that take away surface; counted independently of the class.
pub const REMOVAL_CATEGORIES: &[ChangeCategory] = &[
    ChangeCategory::TypeRemoved,
    ChangeCategory::InterfaceRemoved,
    ChangeCategory::MemberRemoved,
    ChangeCategory::ParameterRemoved,
    ChangeCategory::EnumValueRemoved,
];

impl ChangeCategory {
    pub fn class(&self) -> ChangeClass {
        if BREAKING_CATEGORIES.contains(self) {
            ChangeClass::Breaking
        } else if ADDITION_CATEGORIES.contains(self) {
            ChangeClass::Addition
        } else {
            ChangeClass::NonBreaking
        }
    }

    pub fn is_breaking(&self) -> bool {
        self.class() == ChangeClass::Breaking
    }

    pub fn is_addition(&self) -> bool {
        self.class() == ChangeClass::Addition
    }

    pub fn is_removal(&self) -> bool {
        REMOVAL_CATEGORIES.contains(self)
    }

    /// Severity a change of this category gets unless the detecting rule
    /// knows better.
    pub fn default_severity(&self) -> ChangeSeverity {
        match self.class() {
            ChangeClass::Breaking => ChangeSeverity::High,
            ChangeClass::Addition => ChangeSeverity::Low,
            ChangeClass::NonBreaking => match self {
                ChangeCategory::MemberObsoleted | ChangeCategory::ParameterDefaultChanged => {
                    ChangeSeverity::Medium
                }
                _ => ChangeSeverity::Low,
            },
        }
    }

    /// Get the string identifier for this category
    pub fn id(&self) -> &'static str {
        match self {
            ChangeCategory::TypeRemoved => "TypeRemoved",
            ChangeCategory::BaseClassChanged => "BaseClassChanged",
            ChangeCategory::InterfaceRemoved => "InterfaceRemoved",
            ChangeCategory::SealedAdded => "SealedAdded",
            ChangeCategory::AbstractAdded => "AbstractAdded",
            ChangeCategory::GenericParametersChanged => "GenericParametersChanged",
            ChangeCategory::MemberRemoved => "MemberRemoved",
            ChangeCategory::MemberTypeChanged => "MemberTypeChanged",
            ChangeCategory::MethodSignatureChanged => "MethodSignatureChanged",
            ChangeCategory::ParameterRemoved => "ParameterRemoved",
            ChangeCategory::ParameterTypeChanged => "ParameterTypeChanged",
            ChangeCategory::ReturnTypeChanged => "ReturnTypeChanged",
            ChangeCategory::VirtualRemoved => "VirtualRemoved",
            ChangeCategory::AccessibilityReduced => "AccessibilityReduced",
            ChangeCategory::EnumValueRemoved => "EnumValueRemoved",
            ChangeCategory::MemberObsoleted => "MemberObsoleted",
            ChangeCategory::AccessibilityExpanded => "AccessibilityExpanded",
            ChangeCategory::ParameterDefaultChanged => "ParameterDefaultChanged",
            ChangeCategory::TypeAdded => "TypeAdded",
            ChangeCategory::MemberAdded => "MemberAdded",
            ChangeCategory::MethodOverloadAdded => "MethodOverloadAdded",
            ChangeCategory::ParameterAdded => "ParameterAdded",
            ChangeCategory::InterfaceAdded => "InterfaceAdded",
            ChangeCategory::EnumValueAdded => "EnumValueAdded",
        }
    }

    /// What the change means for code compiled against the old version.
    pub fn impact(&self) -> &'static str {
        match self {
            ChangeCategory::TypeRemoved => "Code referencing this type will no longer compile.",
            ChangeCategory::BaseClassChanged => {
                "Conversions to the old base class and inherited members may no longer be available."
            }
            ChangeCategory::InterfaceRemoved => {
                "Code using the type through this interface will no longer compile."
            }
            ChangeCategory::SealedAdded => "Classes deriving from this type will no longer compile.",
            ChangeCategory::AbstractAdded => "Code instantiating this type will no longer compile.",
            ChangeCategory::GenericParametersChanged => {
                "Every use of this type must supply a different number of type arguments."
            }
            ChangeCategory::MemberRemoved => "Callers of this member will no longer compile.",
            ChangeCategory::MemberTypeChanged => {
                "Code reading or assigning this member must adapt to the new type."
            }
            ChangeCategory::MethodSignatureChanged => "Call sites must be updated to the new signature.",
            ChangeCategory::ParameterRemoved => "Call sites passing this argument must be updated.",
            ChangeCategory::ParameterTypeChanged => {
                "Arguments passed at this position must be converted to the new type."
            }
            ChangeCategory::ReturnTypeChanged => "Code consuming the return value must adapt.",
            ChangeCategory::VirtualRemoved => "Overrides of this member will no longer compile.",
            ChangeCategory::AccessibilityReduced => {
                "Callers outside the new accessibility scope lose access."
            }
            ChangeCategory::EnumValueRemoved => "Code using this enum value will no longer compile.",
            ChangeCategory::MemberObsoleted => {
                "Callers will see obsolescence warnings and should migrate."
            }
            ChangeCategory::AccessibilityExpanded => "The member is visible to more callers.",
            ChangeCategory::ParameterDefaultChanged => {
                "Call sites relying on the parameter default may need review."
            }
            ChangeCategory::TypeAdded => "New type available.",
            ChangeCategory::MemberAdded => "New member available.",
            ChangeCategory::MethodOverloadAdded => {
                "Existing calls keep compiling; a new overload with optional parameters is available."
            }
            ChangeCategory::ParameterAdded => "New optional parameter available.",
            ChangeCategory::InterfaceAdded => "The type can now be used through a new interface.",
            ChangeCategory::EnumValueAdded => "New enum value available.",
        }
    }

    /// Parse category from string ID
    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.id() == id)
    }

    /// Get all available categories
    pub fn all() -> Vec<Self> {
        BREAKING_CATEGORIES
            .iter()
            .chain(NON_BREAKING_CATEGORIES)
            .chain(ADDITION_CATEGORIES)
            .copied()
            .collect()
    }
}

impl std::fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for ChangeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| format!("Unknown change category: {s}"))
    }
}
