//! Version-independent identity and equivalence of types and members.
//!
//! Two snapshots of the same library are usually loaded from assemblies with
//! different versions or strong names. Every cross-version comparison in the
//! engine goes through [`equivalence`] so that version-only differences never
//! surface as changes.

use crate::model::{MemberDescriptor, MemberKind, TypeDescriptor, TypeName, TypeRef, qualify};
use serde::Serialize;
use std::fmt;

/// Outcome of comparing two type references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equivalence {
    Equivalent,
    Different,
    /// At least one side is unresolved; nothing can be proven.
    Unknown,
}

impl Equivalence {
    /// True only when the references are provably different.
    pub fn is_different(self) -> bool {
        self == Equivalence::Different
    }

    fn from_bool(same: bool) -> Self {
        if same {
            Equivalence::Equivalent
        } else {
            Equivalence::Different
        }
    }
}

/// Namespace, simple name and assembly simple name of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeIdentity {
    pub namespace: String,
    pub name: String,
    pub assembly: String,
}

impl TypeIdentity {
    pub fn of_descriptor(t: &TypeDescriptor) -> Self {
        Self {
            namespace: t.namespace.clone(),
            name: t.name.clone(),
            assembly: t.assembly.name.clone(),
        }
    }

    pub fn of_name(n: &TypeName) -> Self {
        Self {
            namespace: n.namespace.clone(),
            name: n.name.clone(),
            assembly: n.assembly.name.clone(),
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", qualify(&self.namespace, &self.name), self.assembly)
    }
}

fn same_definition(a: &TypeName, b: &TypeName) -> bool {
    a.namespace == b.namespace && a.name == b.name && a.assembly.name == b.assembly.name
}

/// Decides whether two type references denote the same type across versions.
///
/// Generic types compare by definition and argument count only. Arrays compare
/// by rank and element type. An unresolved reference is `Unknown` unless its
/// display name already disagrees with the other side.
pub fn equivalence(a: &TypeRef, b: &TypeRef) -> Equivalence {
    match (a, b) {
        (TypeRef::Unresolved { display: x }, TypeRef::Unresolved { display: y }) => {
            if unresolved_name(x) == unresolved_name(y) {
                Equivalence::Unknown
            } else {
                Equivalence::Different
            }
        }
        (TypeRef::Unresolved { display }, other) | (other, TypeRef::Unresolved { display }) => {
            unresolved_against(display, other)
        }
        (TypeRef::Named(x), TypeRef::Named(y)) => Equivalence::from_bool(same_definition(x, y)),
        (
            TypeRef::Generic {
                definition: dx,
                arguments: ax,
            },
            TypeRef::Generic {
                definition: dy,
                arguments: ay,
            },
        ) => Equivalence::from_bool(same_definition(dx, dy) && ax.len() == ay.len()),
        (
            TypeRef::Array {
                element: ex,
                rank: rx,
            },
            TypeRef::Array {
                element: ey,
                rank: ry,
            },
        ) => {
            if rx != ry {
                Equivalence::Different
            } else {
                equivalence(ex, ey)
            }
        }
        (TypeRef::GenericParameter { name: x }, TypeRef::GenericParameter { name: y }) => {
            Equivalence::from_bool(x == y)
        }
        _ => Equivalence::Different,
    }
}

/// Type name part of an unresolved display, without any assembly qualification.
fn unresolved_name(display: &str) -> &str {
    display.split(',').next().unwrap_or(display).trim()
}

/// An unresolved reference can still be told apart by name. Only a name that
/// agrees with the resolved side leaves the outcome open.
fn unresolved_against(display: &str, resolved: &TypeRef) -> Equivalence {
    let full_name = match resolved {
        TypeRef::Named(n) => n.full_name(),
        TypeRef::Generic { definition, .. } => definition.full_name(),
        _ => return Equivalence::Unknown,
    };
    let name = unresolved_name(display);
    let agrees = if name.contains('.') {
        name == full_name
    } else {
        full_name.rsplit('.').next() == Some(name)
    };
    if agrees {
        Equivalence::Unknown
    } else {
        Equivalence::Different
    }
}

/// Equivalence lifted to optional references: two absent references are
/// equivalent, an absent and a present one are not.
pub fn optional_equivalence(a: Option<&TypeRef>, b: Option<&TypeRef>) -> Equivalence {
    match (a, b) {
        (None, None) => Equivalence::Equivalent,
        (Some(x), Some(y)) => equivalence(x, y),
        _ => Equivalence::Different,
    }
}

/// Version-independent identity string, e.g. `System.IDisposable, System.Runtime`.
pub fn identity_string(t: &TypeRef) -> String {
    match t {
        TypeRef::Named(n) => TypeIdentity::of_name(n).to_string(),
        TypeRef::Generic {
            definition,
            arguments,
        } => {
            let args: Vec<String> = arguments.iter().map(TypeRef::simple_name).collect();
            format!(
                "{}<{}>, {}",
                definition.full_name(),
                args.join(","),
                definition.assembly.name
            )
        }
        TypeRef::Array { element, rank } => {
            format!("{}[{}]", identity_string(element), ",".repeat(rank.saturating_sub(1) as usize))
        }
        TypeRef::GenericParameter { name } => name.clone(),
        TypeRef::Unresolved { display } => display.clone(),
    }
}

//==============================================================================
// Signature Keys
//==============================================================================

/// Structural key of a type inside a member signature. Uses simple names so
/// that assembly versions never leak into member identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKey {
    Named(String),
    Generic { name: String, arity: usize },
    Array { element: Box<TypeKey>, rank: u32 },
}

impl TypeKey {
    pub fn of(t: &TypeRef) -> Self {
        match t {
            TypeRef::Named(n) => TypeKey::Named(n.name.clone()),
            TypeRef::Generic {
                definition,
                arguments,
            } => TypeKey::Generic {
                name: definition.name.split('`').next().unwrap_or(&definition.name).to_string(),
                arity: arguments.len(),
            },
            TypeRef::Array { element, rank } => TypeKey::Array {
                element: Box::new(TypeKey::of(element)),
                rank: *rank,
            },
            TypeRef::GenericParameter { name } => TypeKey::Named(name.clone()),
            // Unresolved references only carry a display name; key on its
            // last segment so they still line up with the resolved side.
            TypeRef::Unresolved { display } => {
                let name = unresolved_name(display);
                TypeKey::Named(name.rsplit('.').next().unwrap_or(name).to_string())
            }
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Named(name) => f.write_str(name),
            TypeKey::Generic { name, arity } => write!(f, "{name}`{arity}"),
            TypeKey::Array { element, rank } => {
                write!(f, "{element}[{}]", ",".repeat(rank.saturating_sub(1) as usize))
            }
        }
    }
}

/// Identity of a member overload across versions.
///
/// Methods key on name and ordered parameter types; properties and fields on
/// name and declared type; events on name alone. Parameter names never take
/// part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignatureKey {
    pub kind: MemberKind,
    pub name: String,
    pub parameters: Vec<TypeKey>,
    pub declared_type: Option<TypeKey>,
}

impl SignatureKey {
    pub fn of(member: &MemberDescriptor) -> Self {
        let (parameters, declared_type) = match member.kind {
            MemberKind::Method => (
                member
                    .parameters
                    .iter()
                    .map(|p| TypeKey::of(&p.parameter_type))
                    .collect(),
                None,
            ),
            MemberKind::Property | MemberKind::Field => {
                (Vec::new(), member.member_type.as_ref().map(TypeKey::of))
            }
            MemberKind::Event => (Vec::new(), None),
        };
        Self {
            kind: member.kind,
            name: member.name.clone(),
            parameters,
            declared_type,
        }
    }
}

impl fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declared = self
            .declared_type
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        match self.kind {
            MemberKind::Method => {
                let params: Vec<String> = self.parameters.iter().map(ToString::to_string).collect();
                write!(f, "{}({})", self.name, params.join(","))
            }
            MemberKind::Property => write!(f, "Property:{}:{}", self.name, declared),
            MemberKind::Field => write!(f, "Field:{}:{}", self.name, declared),
            MemberKind::Event => write!(f, "Event:{}", self.name),
        }
    }
}
