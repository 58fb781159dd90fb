use std::fmt;

use crate::field::PrimitiveKind;

/// Reason a structure could not be translated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("unsupported field type '{ty}' for field '{field}'")]
    UnsupportedFieldType { field: String, ty: String },

    #[error("static field '{field}' has no value")]
    MissingStaticValue { field: String },

    #[error("static field '{field}' is declared as {expected} but holds a {found} value")]
    StaticValueMismatch {
        field: String,
        expected: PrimitiveKind,
        found: PrimitiveKind,
    },

    #[error("'{ty} {field}' can not be packed into a register because it contains more than 4 fields.")]
    CompositeTooLarge { field: String, ty: String },

    #[error(
        "'{ty} {field}' can not be packed into a register, since it contains a non-primitive field type '{subfield_ty}'"
    )]
    CompositeNonPrimitiveSubfield {
        field: String,
        ty: String,
        subfield_ty: String,
    },

    #[error(
        "'{ty} {field}' can not be packed into a register, since it contains an unsupported field type '{subfield_ty}'"
    )]
    CompositeUnsupportedSubfield {
        field: String,
        ty: String,
        subfield_ty: String,
    },

    #[error("'{ty} {field}' can not be packed into a single register because it contains mixed basic types.")]
    CompositeMixedKinds { field: String, ty: String },

    #[error(
        "can't merge '{merged}' and '{candidate}' into the same register because they have incompatible types.  Consider reordering the fields so that adjacent fields have the same primitive type."
    )]
    PackIncompatibleKinds { merged: String, candidate: String },

    #[error(
        "merging matrix types not yet supported ('{merged}' and '{candidate}').  Consider reordering the fields to place matrix-typed variables on four-component vector boundaries."
    )]
    PackMatrixUnsupported { merged: String, candidate: String },

    #[error(
        "can't merge '{merged}' and '{candidate}' because then {field} would cross register boundary.  Consider reordering the fields so that none of them cross four-component vector boundaries when packed."
    )]
    PackRegisterOverflow {
        merged: String,
        candidate: String,
        field: String,
    },
}

/// Failed generation of one structure
///
/// Never carries partial output; `errors` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub full_name: String,
    pub errors: Vec<GenerateError>,
}

impl GenerationFailure {
    pub fn new(full_name: impl Into<String>, error: GenerateError) -> Self {
        Self {
            full_name: full_name.into(),
            errors: vec![error],
        }
    }

    /// Human-readable messages, one per error
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|error| {
                format!(
                    "Failed to generate shader type for {}: {}",
                    self.full_name, error
                )
            })
            .collect()
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("\n"))
    }
}

impl std::error::Error for GenerationFailure {}
