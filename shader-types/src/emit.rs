//! Text emission
//!
//! Three blocks per structure: defines for static constants, the struct
//! declaration, and one accessor function per declared field. Output only
//! depends on the generated type, so repeated runs are byte-identical.

use crate::field::ShaderField;
use crate::generator::GeneratedType;

impl GeneratedType {
    /// `#define` block for static constants
    pub fn emit_defines(&self) -> String {
        let mut output = String::new();

        output.push_str("//\n");
        output.push_str(&format!("// {}:  static fields\n", self.full_name));
        output.push_str("//\n");
        for constant in &self.statics {
            output.push_str(&format!("#define {} ({})\n", constant.name, constant.value));
        }

        output
    }

    /// Struct declaration over the packed fields
    pub fn emit_type_decl(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("// Generated from {}\n", self.full_name));
        output.push_str(&format!("// PackingRules = {}\n", self.packing));
        output.push_str(&format!("struct {}\n", self.name));
        output.push_str("{\n");
        for field in &self.packed_fields {
            output.push_str(&format!("\t{}\n", field));
        }
        output.push_str("};\n");

        output
    }

    /// One `Get<Field>` function per declared field
    pub fn emit_accessors(&self) -> String {
        let mut output = String::new();

        output.push_str("//\n");
        output.push_str(&format!("// Accessors for {}\n", self.full_name));
        output.push_str("//\n");
        for field in &self.fields {
            output.push_str(&accessor(&self.name, field));
        }

        output
    }

    /// Defines, declaration and accessors as one document
    pub fn emit(&self) -> String {
        let mut output = self.emit_defines();
        output.push_str(&self.emit_type_decl());
        output.push_str(&self.emit_accessors());
        output
    }
}

fn accessor(struct_name: &str, field: &ShaderField) -> String {
    format!(
        "{} {}({} value)\n{{\n\treturn value.{}{};\n}}\n",
        field.type_string(),
        accessor_function_name(&field.original_name),
        struct_name,
        field.accessor.name,
        field.swizzle()
    )
}

/// `color` -> `GetColor`
pub fn accessor_function_name(field_name: &str) -> String {
    let mut chars = field_name.chars();
    match chars.next() {
        Some(first) => format!("Get{}{}", first.to_uppercase(), chars.as_str()),
        None => "Get".to_string(),
    }
}
