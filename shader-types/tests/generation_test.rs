//! End-to-end generation tests
//!
//! Builds structure descriptions by hand and checks the emitted HLSL.

use shader_types::{
    CompositeType, DeclaredField, FieldType, GenerateError, PackingRule, StructureDescription,
    Value, generate,
};

fn float_fields(names: &[(&str, u32)]) -> Vec<DeclaredField> {
    names
        .iter()
        .map(|&(name, rows)| {
            let ty = if rows == 1 {
                FieldType::float()
            } else {
                FieldType::FloatVector(rows)
            };
            DeclaredField::instance(name, ty)
        })
        .collect()
}

fn description(packing: PackingRule, fields: Vec<DeclaredField>) -> StructureDescription {
    StructureDescription {
        name: "Sample".to_string(),
        full_name: "tests::Sample".to_string(),
        packing,
        fields,
    }
}

fn accessor_returns(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("return "))
        .map(|expr| expr.trim_end_matches(';').to_string())
        .collect()
}

/// Static integers only: defines in declaration order, empty struct body
#[test]
fn test_static_constants_only() {
    let generated = generate(&description(
        PackingRule::Exact,
        vec![
            DeclaredField::constant("FOO", FieldType::int(), Value::Int(1)),
            DeclaredField::constant("BAR", FieldType::int(), Value::Int(2)),
        ],
    ))
    .unwrap();

    let text = generated.emit_defines();
    let defines: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("#define"))
        .collect();
    assert_eq!(defines, ["#define FOO (1)", "#define BAR (2)"]);

    assert!(generated.packed_fields().is_empty());
    assert!(generated.emit_type_decl().ends_with("struct Sample\n{\n};\n"));
}

/// Three floats merge into one float3 with per-component accessors
#[test]
fn test_three_floats_aggressive() {
    let generated = generate(&description(
        PackingRule::Aggressive,
        float_fields(&[("a", 1), ("b", 1), ("c", 1)]),
    ))
    .unwrap();

    assert_eq!(generated.packed_fields().len(), 1);
    assert_eq!(generated.packed_fields()[0].decl_string(), "float3 a_b_c");

    let accessors = generated.emit_accessors();
    assert!(accessors.contains("float GetA(Sample value)"));
    assert!(accessors.contains("float GetB(Sample value)"));
    assert!(accessors.contains("float GetC(Sample value)"));
    assert_eq!(
        accessor_returns(&accessors),
        ["value.a_b_c.x", "value.a_b_c.y", "value.a_b_c.z"]
    );
}

/// A scalar followed by a float2 shares one float3
#[test]
fn test_scalar_then_vector_aggressive() {
    let generated = generate(&description(
        PackingRule::Aggressive,
        float_fields(&[("a", 1), ("b", 2)]),
    ))
    .unwrap();

    let packed = &generated.packed_fields()[0];
    assert_eq!(packed.type_string(), "float3");
    assert_eq!((packed.rows, packed.cols), (3, 1));
    assert_eq!(packed.name, "a_b");

    let accessors = generated.emit_accessors();
    assert!(accessors.contains("float2 GetB(Sample value)"));
    assert_eq!(accessor_returns(&accessors), ["value.a_b.x", "value.a_b.yz"]);
}

/// A composite mixing float and int fails and names the field
#[test]
fn test_mixed_composite_fails() {
    let failure = generate(&description(
        PackingRule::Exact,
        vec![DeclaredField::instance(
            "blend",
            FieldType::Composite(CompositeType::new(
                "BlendParams",
                vec![
                    DeclaredField::instance("weight", FieldType::float()),
                    DeclaredField::instance("layer", FieldType::int()),
                ],
            )),
        )],
    ))
    .unwrap_err();

    assert_eq!(
        failure.errors,
        vec![GenerateError::CompositeMixedKinds {
            field: "blend".to_string(),
            ty: "BlendParams".to_string(),
        }]
    );
    let messages = failure.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Failed to generate shader type for tests::Sample: "));
    assert!(messages[0].contains("blend"));
}

/// A full float4 keeps its register; the next field starts a new one
#[test]
fn test_full_register_then_scalar() {
    let generated = generate(&description(
        PackingRule::Aggressive,
        float_fields(&[("a", 4), ("b", 1)]),
    ))
    .unwrap();

    let decls: Vec<String> = generated
        .packed_fields()
        .iter()
        .map(|f| f.decl_string())
        .collect();
    assert_eq!(decls, ["float4 a", "float b"]);
    assert_eq!(
        accessor_returns(&generated.emit_accessors()),
        ["value.a", "value.b"]
    );
}

#[test]
fn test_exact_never_changes_fields() {
    let generated = generate(&description(
        PackingRule::Exact,
        vec![
            DeclaredField::instance("a", FieldType::float()),
            DeclaredField::instance("n", FieldType::uint()),
            DeclaredField::instance("v", FieldType::FloatVector(2)),
            DeclaredField::instance("m", FieldType::FloatMatrix4x4),
            DeclaredField::instance("i", FieldType::int()),
        ],
    ))
    .unwrap();

    assert_eq!(generated.fields(), generated.packed_fields());
    for field in generated.fields() {
        assert_eq!(field.swizzle(), "");
        assert_eq!(field.accessor.name, field.original_name);
        assert!(!field.packed);
    }
}

#[test]
fn test_aggressive_conserves_components() {
    let layouts: [&[(&str, u32)]; 5] = [
        &[("a", 1), ("b", 1), ("c", 1), ("d", 1), ("e", 1)],
        &[("a", 3), ("b", 1), ("c", 2), ("d", 2)],
        &[("a", 4), ("b", 4), ("c", 1)],
        &[("a", 2), ("b", 1), ("c", 1), ("d", 3)],
        &[("a", 1)],
    ];

    for layout in layouts {
        let generated =
            generate(&description(PackingRule::Aggressive, float_fields(layout))).unwrap();

        let declared: u32 = generated.fields().iter().map(|f| f.element_count()).sum();
        let packed: u32 = generated
            .packed_fields()
            .iter()
            .map(|f| f.element_count())
            .sum();
        assert_eq!(declared, packed, "components lost for {:?}", layout);

        for field in generated.packed_fields() {
            assert!(field.element_count() <= 4);
            assert_eq!(field.cols, 1);
        }

        // Every accessor points at an existing member
        for field in generated.fields() {
            assert!(
                generated
                    .packed_fields()
                    .iter()
                    .any(|p| p.name == field.accessor.name)
            );
        }
    }
}

#[test]
fn test_composites_pack_with_neighbours() {
    let generated = generate(&description(
        PackingRule::Aggressive,
        vec![
            DeclaredField::instance(
                "uv",
                FieldType::Composite(CompositeType::new(
                    "Uv",
                    vec![
                        DeclaredField::instance("u", FieldType::float()),
                        DeclaredField::instance("v", FieldType::float()),
                    ],
                )),
            ),
            DeclaredField::instance("scale", FieldType::FloatVector(2)),
        ],
    ))
    .unwrap();

    assert!(
        generated
            .emit_type_decl()
            .contains("\tfloat4 uv_scale; // x: u y: v\n")
    );
    assert_eq!(
        accessor_returns(&generated.emit_accessors()),
        ["value.uv_scale.xy", "value.uv_scale.zw"]
    );
}

#[test]
fn test_generation_is_deterministic() {
    let source = description(
        PackingRule::Aggressive,
        vec![
            DeclaredField::constant("COUNT", FieldType::uint(), Value::UInt(16)),
            DeclaredField::constant("SCALE", FieldType::float(), Value::Float(1.5)),
            DeclaredField::instance("a", FieldType::FloatVector(3)),
            DeclaredField::instance("b", FieldType::float()),
            DeclaredField::instance("m", FieldType::FloatMatrix4x4),
        ],
    );

    let first = generate(&source).unwrap().emit();
    let second = generate(&source).unwrap().emit();
    assert_eq!(first, second);
    assert!(first.contains("#define SCALE (1.5)"));
}

#[test]
fn test_overflow_error_message() {
    let failure = generate(&description(
        PackingRule::Aggressive,
        float_fields(&[("a", 2), ("b", 3)]),
    ))
    .unwrap_err();

    assert_eq!(
        failure.messages(),
        vec![
            "Failed to generate shader type for tests::Sample: can't merge 'float2 a' and 'float3 b' because then b would cross register boundary.  Consider reordering the fields so that none of them cross four-component vector boundaries when packed."
                .to_string()
        ]
    );
}
