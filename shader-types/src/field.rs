//! Shader-side field records

use std::fmt;

/// Component swizzle letters, indexed by register offset
const SWIZZLE: &str = "xyzw";

/// Primitive component type of a shader field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Float,
    Int,
    UInt,
}

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Float => "float",
            PrimitiveKind::Int => "int",
            PrimitiveKind::UInt => "uint",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a shader type name: `float`, `float3`, `float4x4`, ...
pub fn shader_type_name(kind: PrimitiveKind, rows: u32, cols: u32) -> String {
    let mut text = kind.as_str().to_string();
    if rows > 1 {
        text.push_str(&rows.to_string());
        if cols > 1 {
            text.push('x');
            text.push_str(&cols.to_string());
        }
    }
    text
}

/// Where an accessor reads a field from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    /// Name of the struct member holding the value
    pub name: String,
    /// Shader type returned by the accessor
    pub shader_type: String,
}

/// A field of the generated shader struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderField {
    pub kind: PrimitiveKind,
    pub rows: u32,
    pub cols: u32,
    /// Member name; becomes `a_b_c` once merged
    pub name: String,
    /// Declared host field name
    pub original_name: String,
    pub comment: String,
    /// First component of this field inside its storage
    pub swizzle_offset: u32,
    pub packed: bool,
    pub accessor: Accessor,
}

impl ShaderField {
    pub fn new(kind: PrimitiveKind, name: impl Into<String>, rows: u32, cols: u32) -> Self {
        let name = name.into();
        Self {
            kind,
            rows,
            cols,
            accessor: Accessor {
                name: name.clone(),
                shader_type: shader_type_name(kind, rows, cols),
            },
            original_name: name.clone(),
            name,
            comment: String::new(),
            swizzle_offset: 0,
            packed: false,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn element_count(&self) -> u32 {
        self.rows * self.cols
    }

    pub fn is_matrix(&self) -> bool {
        self.cols > 1
    }

    pub fn type_string(&self) -> String {
        shader_type_name(self.kind, self.rows, self.cols)
    }

    /// `float3 a_b`
    pub fn decl_string(&self) -> String {
        format!("{} {}", self.type_string(), self.name)
    }

    /// Component selector used by this field's accessor, e.g. `.yz`
    ///
    /// Empty when the field still owns its storage or is matrix-shaped.
    pub fn swizzle(&self) -> String {
        if self.is_matrix() || self.accessor.name == self.original_name {
            return String::new();
        }
        let start = self.swizzle_offset as usize;
        let end = (start + self.element_count() as usize).min(SWIZZLE.len());
        match SWIZZLE.get(start..end) {
            Some(components) => format!(".{}", components),
            None => String::new(),
        }
    }
}

impl fmt::Display for ShaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.decl_string())?;
        if !self.comment.is_empty() {
            write!(f, " // {}", self.comment)?;
        }
        Ok(())
    }
}
