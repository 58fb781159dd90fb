//! HLSL header writer
//!
//! One header per source file, holding every generated struct of that file.

use anyhow::Result;
use std::fmt::Write as FmtWrite;

use shader_types::GeneratedType;

/// Include guard for a generated file name: `light.rs.hlsl` -> `LIGHT_RS_HLSL`
pub fn include_guard(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Render the header for one source file
///
/// Defines come first for every struct with statics, then all struct
/// declarations, then all accessors.
pub fn render_header(
    source_name: &str,
    output_name: &str,
    generated: &[GeneratedType],
) -> Result<String> {
    let mut output = String::new();
    let guard = include_guard(output_name);

    // Header comment
    writeln!(output, "//")?;
    writeln!(output, "// GENERATED FILE - DO NOT EDIT")?;
    writeln!(output, "// Source: {}", source_name)?;
    writeln!(output, "// Generator: tools/shader-type-gen")?;
    writeln!(output, "//")?;
    writeln!(output)?;

    // Include guard
    writeln!(output, "#ifndef {}", guard)?;
    writeln!(output, "#define {}", guard)?;

    for ty in generated.iter().filter(|ty| ty.has_statics()) {
        output.push_str(&ty.emit_defines());
    }

    for ty in generated.iter().filter(|ty| ty.has_fields()) {
        writeln!(output)?;
        output.push_str(&ty.emit_type_decl());
    }

    for ty in generated.iter().filter(|ty| ty.has_fields()) {
        writeln!(output)?;
        output.push_str(&ty.emit_accessors());
    }

    writeln!(output)?;
    writeln!(output, "#endif")?;

    Ok(output)
}
