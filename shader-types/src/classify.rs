//! Field classification
//!
//! Turns declared host fields into shader fields and static constants.
//! Classification stops at the first unsupported field.

use crate::error::GenerateError;
use crate::field::{PrimitiveKind, ShaderField};
use crate::model::{CompositeType, DeclaredField, FieldType, StructureDescription};

/// Component roles used in composite field comments
const ROLES: [char; 4] = ['x', 'y', 'z', 'w'];

/// Maximum number of components in one register
pub const REGISTER_SIZE: u32 = 4;

/// A static field emitted as a `#define`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticConstant {
    pub name: String,
    pub value: String,
}

/// Output of classification, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub fields: Vec<ShaderField>,
    pub statics: Vec<StaticConstant>,
}

/// Classify every declared field of `description`
pub fn classify(description: &StructureDescription) -> Result<Classified, GenerateError> {
    let mut classified = Classified::default();

    for field in &description.fields {
        if field.is_static {
            classified.statics.push(classify_static(field)?);
            continue;
        }

        if let Some(shader_field) = classify_instance(field)? {
            classified.fields.push(shader_field);
        }
    }

    tracing::debug!(
        structure = %description.full_name,
        fields = classified.fields.len(),
        statics = classified.statics.len(),
        "classified fields"
    );

    Ok(classified)
}

fn classify_static(field: &DeclaredField) -> Result<StaticConstant, GenerateError> {
    let Some(kind) = field.ty.primitive_kind() else {
        return Err(unsupported(field));
    };
    let Some(value) = field.value else {
        return Err(GenerateError::MissingStaticValue {
            field: field.name.clone(),
        });
    };
    if value.kind() != kind {
        return Err(GenerateError::StaticValueMismatch {
            field: field.name.clone(),
            expected: kind,
            found: value.kind(),
        });
    }

    Ok(StaticConstant {
        name: field.name.clone(),
        value: value.to_string(),
    })
}

fn classify_instance(field: &DeclaredField) -> Result<Option<ShaderField>, GenerateError> {
    let shader_field = match &field.ty {
        FieldType::Scalar(_) => match field.ty.primitive_kind() {
            Some(kind) => ShaderField::new(kind, &field.name, 1, 1),
            None => return Err(unsupported(field)),
        },
        FieldType::FloatVector(n @ 2..=4) => ShaderField::new(PrimitiveKind::Float, &field.name, *n, 1),
        FieldType::FloatMatrix4x4 => ShaderField::new(PrimitiveKind::Float, &field.name, 4, 4),
        FieldType::Composite(composite) => return flatten_composite(field, composite),
        FieldType::FloatVector(_) | FieldType::Opaque(_) => return Err(unsupported(field)),
    };

    Ok(Some(shader_field))
}

/// Flatten a composite into a single vector of one primitive kind
///
/// Returns `None` when the composite has no instance fields.
fn flatten_composite(
    field: &DeclaredField,
    composite: &CompositeType,
) -> Result<Option<ShaderField>, GenerateError> {
    let mut kinds: Vec<PrimitiveKind> = Vec::new();
    let mut roles: Vec<String> = Vec::new();

    for subfield in composite.fields.iter().filter(|f| !f.is_static) {
        if !subfield.ty.is_primitive() {
            return Err(GenerateError::CompositeNonPrimitiveSubfield {
                field: field.name.clone(),
                ty: composite.name.clone(),
                subfield_ty: subfield.ty.to_string(),
            });
        }
        let Some(kind) = subfield.ty.primitive_kind() else {
            return Err(GenerateError::CompositeUnsupportedSubfield {
                field: field.name.clone(),
                ty: composite.name.clone(),
                subfield_ty: subfield.ty.to_string(),
            });
        };
        if kinds.len() == REGISTER_SIZE as usize {
            return Err(GenerateError::CompositeTooLarge {
                field: field.name.clone(),
                ty: composite.name.clone(),
            });
        }

        roles.push(format!("{}: {}", ROLES[kinds.len()], subfield.name));
        kinds.push(kind);
    }

    let Some(&kind) = kinds.first() else {
        return Ok(None);
    };
    if kinds.iter().any(|&k| k != kind) {
        return Err(GenerateError::CompositeMixedKinds {
            field: field.name.clone(),
            ty: composite.name.clone(),
        });
    }

    let rows = kinds.len() as u32;
    Ok(Some(
        ShaderField::new(kind, &field.name, rows, 1).with_comment(roles.join(" ")),
    ))
}

fn unsupported(field: &DeclaredField) -> GenerateError {
    GenerateError::UnsupportedFieldType {
        field: field.name.clone(),
        ty: field.ty.to_string(),
    }
}
