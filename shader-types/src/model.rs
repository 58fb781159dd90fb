//! Input description of a host structure
//!
//! A `StructureDescription` is plain data produced by a discovery pass (the
//! `shader-type-gen` tool parses Rust sources, tests build them by hand, and
//! JSON files can be deserialized directly). The generator never inspects
//! host types itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::field::PrimitiveKind;

/// Field packing policy for a generated struct
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackingRule {
    /// One shader field per declared field
    #[default]
    Exact,
    /// Merge adjacent fields into shared 4-component registers
    Aggressive,
}

impl fmt::Display for PackingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackingRule::Exact => write!(f, "Exact"),
            PackingRule::Aggressive => write!(f, "Aggressive"),
        }
    }
}

impl FromStr for PackingRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(PackingRule::Exact),
            "aggressive" => Ok(PackingRule::Aggressive),
            other => Err(format!(
                "unknown packing rule '{}' (expected 'exact' or 'aggressive')",
                other
            )),
        }
    }
}

/// A host structure to translate into a shader struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDescription {
    /// Display name, used as the shader struct name
    pub name: String,
    /// Fully-qualified host name, used in comments and error messages
    pub full_name: String,
    #[serde(default)]
    pub packing: PackingRule,
    /// Declared fields in declaration order, static and instance mixed
    #[serde(default)]
    pub fields: Vec<DeclaredField>,
}

impl StructureDescription {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>, packing: PackingRule) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            packing,
            fields: Vec::new(),
        }
    }

    /// Builder-style field append
    pub fn with_field(mut self, field: DeclaredField) -> Self {
        self.fields.push(field);
        self
    }
}

/// A declared field of a host structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredField {
    pub name: String,
    pub ty: FieldType,
    #[serde(default)]
    pub is_static: bool,
    /// Current value of a static field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl DeclaredField {
    /// Per-instance field
    pub fn instance(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            value: None,
        }
    }

    /// Static field holding `value`
    pub fn constant(name: impl Into<String>, ty: FieldType, value: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: true,
            value: Some(value),
        }
    }
}

/// Declared type of a host field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Scalar(ScalarType),
    /// Float vector with the given component count
    FloatVector(u32),
    FloatMatrix4x4,
    Composite(CompositeType),
    /// Any other type, identified by name
    Opaque(String),
}

impl FieldType {
    pub fn float() -> Self {
        FieldType::Scalar(ScalarType::F32)
    }

    pub fn int() -> Self {
        FieldType::Scalar(ScalarType::I32)
    }

    pub fn uint() -> Self {
        FieldType::Scalar(ScalarType::U32)
    }

    /// True for host primitives (the only types a composite may contain)
    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Scalar(_))
    }

    /// Shader kind for the scalar types the generator understands
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            FieldType::Scalar(scalar) => scalar.primitive_kind(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(scalar) => write!(f, "{}", scalar),
            FieldType::FloatVector(n) => write!(f, "[f32; {}]", n),
            FieldType::FloatMatrix4x4 => write!(f, "[[f32; 4]; 4]"),
            FieldType::Composite(composite) => write!(f, "{}", composite.name),
            FieldType::Opaque(name) => write!(f, "{}", name),
        }
    }
}

/// Host primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ScalarType {
    /// Parse a Rust primitive type name
    pub fn from_rust(name: &str) -> Option<Self> {
        let scalar = match name {
            "bool" => ScalarType::Bool,
            "i8" => ScalarType::I8,
            "i16" => ScalarType::I16,
            "i32" => ScalarType::I32,
            "i64" => ScalarType::I64,
            "u8" => ScalarType::U8,
            "u16" => ScalarType::U16,
            "u32" => ScalarType::U32,
            "u64" => ScalarType::U64,
            "f32" => ScalarType::F32,
            "f64" => ScalarType::F64,
            _ => return None,
        };
        Some(scalar)
    }

    pub fn primitive_kind(self) -> Option<PrimitiveKind> {
        match self {
            ScalarType::F32 => Some(PrimitiveKind::Float),
            ScalarType::I32 => Some(PrimitiveKind::Int),
            ScalarType::U32 => Some(PrimitiveKind::UInt),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Bool => "bool",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// A structured field type, flattened into one register when possible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeType {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<DeclaredField>,
}

impl CompositeType {
    pub fn new(name: impl Into<String>, fields: Vec<DeclaredField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// Value of a static field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Float(f32),
    Int(i32),
    UInt(u32),
}

impl Value {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Value::Float(_) => PrimitiveKind::Float,
            Value::Int(_) => PrimitiveKind::Int,
            Value::UInt(_) => PrimitiveKind::UInt,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_rule_parse() {
        assert_eq!("exact".parse::<PackingRule>(), Ok(PackingRule::Exact));
        assert_eq!("Aggressive".parse::<PackingRule>(), Ok(PackingRule::Aggressive));
        assert!("tight".parse::<PackingRule>().is_err());
        assert_eq!(PackingRule::default(), PackingRule::Exact);
    }

    #[test]
    fn test_scalar_kinds() {
        assert_eq!(ScalarType::from_rust("f32"), Some(ScalarType::F32));
        assert_eq!(ScalarType::from_rust("Vec3"), None);
        assert_eq!(FieldType::uint().primitive_kind(), Some(PrimitiveKind::UInt));
        assert_eq!(FieldType::Scalar(ScalarType::F64).primitive_kind(), None);
        assert!(FieldType::Scalar(ScalarType::Bool).is_primitive());
        assert!(!FieldType::FloatVector(3).is_primitive());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::UInt(7).to_string(), "7");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Float(2.0).to_string(), "2");
    }

    #[test]
    fn test_description_from_json() {
        let json = r#"{
            "name": "Light",
            "full_name": "lighting::Light",
            "packing": "aggressive",
            "fields": [
                { "name": "MAX_LIGHTS", "ty": { "scalar": "i32" }, "is_static": true, "value": { "int": 8 } },
                { "name": "color", "ty": { "float_vector": 3 } },
                { "name": "range", "ty": { "scalar": "f32" } }
            ]
        }"#;

        let description: StructureDescription = serde_json::from_str(json).unwrap();
        assert_eq!(description.packing, PackingRule::Aggressive);
        assert_eq!(description.fields.len(), 3);
        assert_eq!(description.fields[0].value, Some(Value::Int(8)));
        assert_eq!(description.fields[1].ty, FieldType::FloatVector(3));
        assert!(!description.fields[2].is_static);
    }
}
