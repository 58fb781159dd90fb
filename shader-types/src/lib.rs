//! Shader type generation
//!
//! Translates a host structure description into HLSL text:
//!
//! - a `#define` block for static constants
//! - a struct declaration, optionally packing adjacent fields into
//!   4-component registers (`PackingRule::Aggressive`)
//! - one accessor function per declared field that reads it back out of
//!   its (possibly shared) register
//!
//! # Example
//!
//! ```
//! use shader_types::{DeclaredField, FieldType, PackingRule, StructureDescription, generate};
//!
//! let description = StructureDescription::new("Params", "render::Params", PackingRule::Aggressive)
//!     .with_field(DeclaredField::instance("a", FieldType::float()))
//!     .with_field(DeclaredField::instance("b", FieldType::FloatVector(2)));
//!
//! let generated = generate(&description).unwrap();
//! assert!(generated.emit_type_decl().contains("float3 a_b;"));
//! assert!(generated.emit_accessors().contains("return value.a_b.yz;"));
//! ```

pub mod classify;
pub mod emit;
pub mod error;
pub mod field;
pub mod generator;
pub mod model;
pub mod pack;

pub use classify::StaticConstant;
pub use emit::accessor_function_name;
pub use error::{GenerateError, GenerationFailure};
pub use field::{Accessor, PrimitiveKind, ShaderField, shader_type_name};
pub use generator::{GeneratedType, generate, generate_batch};
pub use model::{
    CompositeType, DeclaredField, FieldType, PackingRule, ScalarType, StructureDescription, Value,
};
