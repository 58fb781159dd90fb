//! Generation pipeline: classify, pack, then hand the result to the emitter

use crate::classify::{StaticConstant, classify};
use crate::error::GenerationFailure;
use crate::field::ShaderField;
use crate::model::{PackingRule, StructureDescription};
use crate::pack::pack;

/// A successfully generated shader type
///
/// Holds everything the emitter needs; see the `emit_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedType {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) packing: PackingRule,
    pub(crate) statics: Vec<StaticConstant>,
    pub(crate) fields: Vec<ShaderField>,
    pub(crate) packed_fields: Vec<ShaderField>,
}

impl GeneratedType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn packing(&self) -> PackingRule {
        self.packing
    }

    /// Static constants in declaration order
    pub fn statics(&self) -> &[StaticConstant] {
        &self.statics
    }

    /// Every classified field, with accessors resolved against the packed layout
    pub fn fields(&self) -> &[ShaderField] {
        &self.fields
    }

    /// Struct members after packing
    pub fn packed_fields(&self) -> &[ShaderField] {
        &self.packed_fields
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn has_statics(&self) -> bool {
        !self.statics.is_empty()
    }
}

/// Generate the shader type for one structure
pub fn generate(description: &StructureDescription) -> Result<GeneratedType, GenerationFailure> {
    let fail = |error| GenerationFailure::new(&description.full_name, error);

    let classified = classify(description).map_err(fail)?;

    let (fields, packed_fields) = match description.packing {
        PackingRule::Exact => (classified.fields.clone(), classified.fields),
        PackingRule::Aggressive => {
            let layout = pack(&classified.fields).map_err(fail)?;
            (layout.fields, layout.packed)
        }
    };

    tracing::debug!(
        structure = %description.full_name,
        packing = %description.packing,
        members = packed_fields.len(),
        "generated shader type"
    );

    Ok(GeneratedType {
        name: description.name.clone(),
        full_name: description.full_name.clone(),
        packing: description.packing,
        statics: classified.statics,
        fields,
        packed_fields,
    })
}

/// Generate every structure independently
///
/// A failure only affects its own entry.
pub fn generate_batch(
    descriptions: &[StructureDescription],
) -> Vec<Result<GeneratedType, GenerationFailure>> {
    descriptions.iter().map(generate).collect()
}
