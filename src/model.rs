//! Immutable descriptors of a library's public type surface.
//!
//! Descriptors are produced once per snapshot by a [`crate::snapshot::TypeProvider`]
//! and only ever read by the diff engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the snapshot document layout understood by this crate.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Marker that prefixes compiler-generated type names.
pub const COMPILER_GENERATED_MARKER: char = '<';

//==============================================================================
// Type References
//==============================================================================

/// Name of an assembly. Only `name` takes part in cross-version identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssemblyName {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_token: Option<String>,
}

impl AssemblyName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            public_key_token: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// A named, non-generic type as seen from a referencing site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
    pub assembly: AssemblyName,
}

impl TypeName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, assembly: AssemblyName) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            assembly,
        }
    }

    /// Namespace-qualified name.
    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

/// Reference to a type used by a base class, interface, member or parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A plain named type.
    Named(TypeName),
    /// A constructed or open generic type.
    Generic {
        definition: TypeName,
        arguments: Vec<TypeRef>,
    },
    /// Single- or multi-dimensional array.
    Array {
        element: Box<TypeRef>,
        #[serde(default = "default_rank")]
        rank: u32,
    },
    /// Generic parameter of the enclosing type or method (`T`, `TKey`).
    GenericParameter { name: String },
    /// Reference into an assembly the metadata reader could not load.
    Unresolved { display: String },
}

fn default_rank() -> u32 {
    1
}

impl TypeRef {
    pub fn named(namespace: &str, name: &str, assembly: &str) -> Self {
        TypeRef::Named(TypeName::new(namespace, name, AssemblyName::new(assembly)))
    }

    pub fn generic(definition: TypeName, arguments: Vec<TypeRef>) -> Self {
        TypeRef::Generic {
            definition,
            arguments,
        }
    }

    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
            rank: 1,
        }
    }

    pub fn unresolved(display: impl Into<String>) -> Self {
        TypeRef::Unresolved {
            display: display.into(),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        match self {
            TypeRef::Unresolved { .. } => true,
            TypeRef::Array { element, .. } => element.is_unresolved(),
            _ => false,
        }
    }

    /// Short display name, e.g. `List<String>` or `Int32[]`.
    pub fn simple_name(&self) -> String {
        match self {
            TypeRef::Named(n) => n.name.clone(),
            TypeRef::Generic {
                definition,
                arguments,
            } => {
                let args: Vec<String> = arguments.iter().map(TypeRef::simple_name).collect();
                format!("{}<{}>", strip_arity(&definition.name), args.join(","))
            }
            TypeRef::Array { element, rank } => {
                format!("{}[{}]", element.simple_name(), ",".repeat(rank.saturating_sub(1) as usize))
            }
            TypeRef::GenericParameter { name } => name.clone(),
            TypeRef::Unresolved { display } => display.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

fn strip_arity(name: &str) -> &str {
    name.split('`').next().unwrap_or(name)
}

pub(crate) fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

//==============================================================================
// Members
//==============================================================================

/// Accessibility levels, ordered from least to most visible.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Private,
    Internal,
    Protected,
    #[default]
    Public,
}

impl Accessibility {
    /// Visible to external callers or subclasses.
    pub fn is_externally_visible(self) -> bool {
        self >= Accessibility::Protected
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Accessibility::Private => "private",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::Public => "public",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    Property,
    Field,
    Event,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub parameter_type: TypeRef,
    #[serde(default)]
    pub has_default: bool,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, parameter_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            parameter_type,
            has_default: false,
        }
    }

    pub fn optional(name: impl Into<String>, parameter_type: TypeRef) -> Self {
        Self {
            has_default: true,
            ..Self::new(name, parameter_type)
        }
    }
}

/// A declared member of a type.
///
/// `member_type` is the return type of a method, the declared type of a
/// property or field, and the handler type of an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub kind: MemberKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub is_obsolete: bool,
}

impl MemberDescriptor {
    pub fn method(name: impl Into<String>, return_type: TypeRef, parameters: Vec<ParameterDescriptor>) -> Self {
        Self {
            kind: MemberKind::Method,
            name: name.into(),
            member_type: Some(return_type),
            parameters,
            accessibility: Accessibility::Public,
            is_virtual: false,
            is_obsolete: false,
        }
    }

    pub fn property(name: impl Into<String>, property_type: TypeRef) -> Self {
        Self {
            kind: MemberKind::Property,
            member_type: Some(property_type),
            parameters: Vec::new(),
            ..Self::method(name, TypeRef::unresolved(""), Vec::new())
        }
    }

    pub fn field(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            kind: MemberKind::Field,
            ..Self::property(name, field_type)
        }
    }

    pub fn event(name: impl Into<String>, handler_type: TypeRef) -> Self {
        Self {
            kind: MemberKind::Event,
            ..Self::property(name, handler_type)
        }
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn as_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn obsolete(mut self) -> Self {
        self.is_obsolete = true;
        self
    }
}

//==============================================================================
// Types
//==============================================================================

/// Named enum constant. Only the name takes part in diffing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    #[serde(default)]
    pub value: i64,
}

/// A type as it appears in one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeDescriptor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub assembly: AssemblyName,
    #[serde(default)]
    pub visibility: Accessibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub generic_parameter_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberDescriptor>,
}

impl TypeDescriptor {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, assembly: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            assembly: AssemblyName::new(assembly),
            ..Default::default()
        }
    }

    pub fn full_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    pub fn is_generic(&self) -> bool {
        self.generic_parameter_count > 0
    }

    pub fn is_compiler_generated(&self) -> bool {
        self.name.starts_with(COMPILER_GENERATED_MARKER)
    }

    /// Reference to this type as a [`TypeName`].
    pub fn type_name(&self) -> TypeName {
        TypeName::new(self.namespace.clone(), self.name.clone(), self.assembly.clone())
    }

    pub fn with_member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    pub fn as_enum<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.is_enum = true;
        self.enum_values = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| EnumValue {
                name: name.into(),
                value: i as i64,
            })
            .collect();
        self
    }
}
