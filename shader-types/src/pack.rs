//! Aggressive register packing
//!
//! Adjacent fields are merged greedily into 4-component registers. The merge
//! itself only tracks register membership and offsets; merged names, shared
//! accessors and swizzle offsets are projected onto the fields at the end.

use crate::classify::REGISTER_SIZE;
use crate::error::GenerateError;
use crate::field::{Accessor, PrimitiveKind, ShaderField, shader_type_name};

/// Fields after packing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedLayout {
    /// Struct members, one per register
    pub packed: Vec<ShaderField>,
    /// Input fields with accessors pointing into `packed`
    pub fields: Vec<ShaderField>,
}

/// Register under construction
#[derive(Debug, Clone)]
struct Register {
    kind: PrimitiveKind,
    rows: u32,
    cols: u32,
    name: String,
    /// Index of the field that opened the register
    first: usize,
    members: usize,
}

impl Register {
    fn open(index: usize, field: &ShaderField) -> Self {
        Self {
            kind: field.kind,
            rows: field.rows,
            cols: field.cols,
            name: field.name.clone(),
            first: index,
            members: 1,
        }
    }

    fn element_count(&self) -> u32 {
        self.rows * self.cols
    }

    fn decl_string(&self) -> String {
        format!("{} {}", shader_type_name(self.kind, self.rows, self.cols), self.name)
    }
}

/// Location of a field inside the packed layout
#[derive(Debug, Clone, Copy)]
struct Placement {
    register: usize,
    offset: u32,
}

enum Merge {
    /// Merged at the given component offset
    Merged(u32),
    Full,
}

/// Try to append `field` to `register`
fn merge(register: &mut Register, field: &ShaderField) -> Result<Merge, GenerateError> {
    if register.element_count() % REGISTER_SIZE == 0 {
        return Ok(Merge::Full);
    }

    if field.kind != register.kind {
        return Err(GenerateError::PackIncompatibleKinds {
            merged: register.decl_string(),
            candidate: field.decl_string(),
        });
    }

    if field.is_matrix() || register.cols > 1 {
        return Err(GenerateError::PackMatrixUnsupported {
            merged: register.decl_string(),
            candidate: field.decl_string(),
        });
    }

    if register.rows + field.rows > REGISTER_SIZE {
        return Err(GenerateError::PackRegisterOverflow {
            merged: register.decl_string(),
            candidate: field.decl_string(),
            field: field.name.clone(),
        });
    }

    let offset = register.element_count();
    register.rows += field.rows;
    register.name.push('_');
    register.name.push_str(&field.name);
    register.members += 1;

    Ok(Merge::Merged(offset))
}

/// Pack `fields` with the aggressive rule
///
/// Any merge error aborts the whole layout.
pub fn pack(fields: &[ShaderField]) -> Result<PackedLayout, GenerateError> {
    let Some(first) = fields.first() else {
        return Ok(PackedLayout::default());
    };

    let mut registers: Vec<Register> = Vec::new();
    let mut placements = vec![Placement {
        register: 0,
        offset: 0,
    }];
    let mut current = Register::open(0, first);

    for (index, field) in fields.iter().enumerate().skip(1) {
        match merge(&mut current, field)? {
            Merge::Merged(offset) => placements.push(Placement {
                register: registers.len(),
                offset,
            }),
            Merge::Full => {
                registers.push(current);
                current = Register::open(index, field);
                placements.push(Placement {
                    register: registers.len(),
                    offset: 0,
                });
            }
        }
    }
    registers.push(current);

    tracing::debug!(
        fields = fields.len(),
        registers = registers.len(),
        "packed fields"
    );

    Ok(project(fields, &registers, &placements))
}

/// Apply the merge state to the fields
fn project(fields: &[ShaderField], registers: &[Register], placements: &[Placement]) -> PackedLayout {
    let packed = registers
        .iter()
        .map(|register| {
            let opener = &fields[register.first];
            let shader_type = shader_type_name(register.kind, register.rows, register.cols);
            ShaderField {
                kind: register.kind,
                rows: register.rows,
                cols: register.cols,
                name: register.name.clone(),
                original_name: opener.original_name.clone(),
                comment: opener.comment.clone(),
                swizzle_offset: 0,
                packed: register.members > 1,
                accessor: Accessor {
                    name: register.name.clone(),
                    shader_type,
                },
            }
        })
        .collect();

    let fields = fields
        .iter()
        .zip(placements)
        .map(|(field, placement)| {
            let register = &registers[placement.register];
            let mut field = field.clone();
            field.accessor.name = register.name.clone();
            field.swizzle_offset = placement.offset;
            field.packed = register.members > 1;
            field
        })
        .collect();

    PackedLayout { packed, fields }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float(name: &str, rows: u32) -> ShaderField {
        ShaderField::new(PrimitiveKind::Float, name, rows, 1)
    }

    #[test]
    fn test_empty_input_packs_to_nothing() {
        let layout = pack(&[]).unwrap();
        assert!(layout.packed.is_empty());
        assert!(layout.fields.is_empty());
    }

    #[test]
    fn test_scalars_merge_into_one_register() {
        let layout = pack(&[float("a", 1), float("b", 1), float("c", 1)]).unwrap();

        assert_eq!(layout.packed.len(), 1);
        assert_eq!(layout.packed[0].decl_string(), "float3 a_b_c");
        assert!(layout.packed[0].packed);

        let offsets: Vec<u32> = layout.fields.iter().map(|f| f.swizzle_offset).collect();
        assert_eq!(offsets, [0, 1, 2]);
        assert!(layout.fields.iter().all(|f| f.accessor.name == "a_b_c" && f.packed));
        // Accessors keep the field's own type
        assert_eq!(layout.fields[1].accessor.shader_type, "float");
    }

    #[test]
    fn test_full_register_starts_new_one() {
        let layout = pack(&[float("a", 4), float("b", 1)]).unwrap();

        let decls: Vec<String> = layout.packed.iter().map(|f| f.decl_string()).collect();
        assert_eq!(decls, ["float4 a", "float b"]);
        assert_eq!(layout.fields[1].accessor.name, "b");
        assert!(!layout.fields[1].packed);
        assert_eq!(layout.fields[1].swizzle(), "");
    }

    #[test]
    fn test_register_fills_then_continues() {
        let layout = pack(&[
            float("a", 2),
            float("b", 2),
            float("c", 1),
            float("d", 3),
        ])
        .unwrap();

        let decls: Vec<String> = layout.packed.iter().map(|f| f.decl_string()).collect();
        assert_eq!(decls, ["float4 a_b", "float4 c_d"]);
        assert_eq!(layout.fields[3].swizzle(), ".yzw");
        assert_eq!(layout.fields[2].swizzle(), ".x");
    }

    #[test]
    fn test_matrix_alone_passes_through() {
        let layout = pack(&[
            ShaderField::new(PrimitiveKind::Float, "world", 4, 4),
            float("tint", 4),
        ])
        .unwrap();

        assert_eq!(layout.packed.len(), 2);
        assert_eq!(layout.packed[0].type_string(), "float4x4");
        assert!(!layout.fields[0].packed);
    }

    #[test]
    fn test_incompatible_kinds() {
        let error = pack(&[
            float("a", 1),
            ShaderField::new(PrimitiveKind::Int, "b", 1, 1),
        ])
        .unwrap_err();

        assert_eq!(
            error,
            GenerateError::PackIncompatibleKinds {
                merged: "float a".to_string(),
                candidate: "int b".to_string(),
            }
        );
    }

    #[test]
    fn test_matrix_merge_is_rejected() {
        let error = pack(&[
            float("a", 1),
            ShaderField::new(PrimitiveKind::Float, "m", 4, 4),
        ])
        .unwrap_err();

        assert!(matches!(error, GenerateError::PackMatrixUnsupported { .. }));
    }

    #[test]
    fn test_register_overflow_names_partial_merge() {
        let error = pack(&[float("a", 1), float("b", 1), float("c", 3)]).unwrap_err();

        assert_eq!(
            error,
            GenerateError::PackRegisterOverflow {
                merged: "float2 a_b".to_string(),
                candidate: "float3 c".to_string(),
                field: "c".to_string(),
            }
        );
    }

    #[test]
    fn test_error_late_in_list_aborts_everything() {
        let result = pack(&[
            float("a", 4),
            float("b", 4),
            float("c", 2),
            ShaderField::new(PrimitiveKind::UInt, "d", 1, 1),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_composite_comment_survives_packing() {
        let layout = pack(&[
            float("uv", 2).with_comment("x: u y: v"),
            float("scale", 2),
        ])
        .unwrap();

        assert_eq!(layout.packed[0].to_string(), "float4 uv_scale; // x: u y: v");
    }
}
