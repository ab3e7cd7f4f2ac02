//! Errors surfaced by attribute access and coercion.
use thiserror::Error;

use crate::value::Shape;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Attribute has no stored value and no declaration marks it optional.
    #[error("{class} has no field `{name}`")]
    FieldNotFound { class: &'static str, name: String },

    /// The declared descriptor itself is malformed.
    #[error("ambiguous declaration `{ty}`: {reason}")]
    AmbiguousDeclaration { ty: String, reason: Ambiguity },

    #[error("cannot reconstruct a {shape} value as `{ty}`")]
    UnsupportedShape { ty: String, shape: Shape },

    /// A plain constructor rejected the raw value.
    #[error("failed to construct `{target}`: {reason}")]
    Construct { target: String, reason: String },

    #[error("expected {expected}, found {found}")]
    Mismatch { expected: &'static str, found: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ambiguity {
    #[error("naked union must name at least one non-null type, e.g. optional(str)")]
    NakedUnion,
    #[error("value is not null, can't infer which of {alternatives} non-null alternatives applies")]
    Optional { alternatives: usize },
    #[error("can't build a sequence from {arity} element types")]
    Sequence { arity: usize },
}

impl Error {
    pub(crate) fn ambiguous(ty: &crate::ty::Ty, reason: Ambiguity) -> Self {
        Error::AmbiguousDeclaration { ty: ty.to_string(), reason }
    }

    pub(crate) fn unsupported(ty: &crate::ty::Ty, shape: Shape) -> Self {
        Error::UnsupportedShape { ty: ty.to_string(), shape }
    }

    pub fn is_field_not_found(&self) -> bool {
        matches!(self, Error::FieldNotFound { .. })
    }

    pub fn is_ambiguous_declaration(&self) -> bool {
        matches!(self, Error::AmbiguousDeclaration { .. })
    }
}
