//! Discovery of `#[generate_hlsl]` structs in Rust source using syn

use anyhow::{Context, Result};
use quote::ToTokens;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use syn::{Expr, Fields, ImplItem, Item, ItemImpl, ItemStruct, Lit, Type as SynType, UnOp};

use shader_types::{
    CompositeType, DeclaredField, FieldType, PackingRule, PrimitiveKind, ScalarType,
    StructureDescription, Value,
};

/// Attribute marking a struct for generation
pub const ATTRIBUTE: &str = "generate_hlsl";

/// A parsed source file
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub structs: Vec<ParsedStruct>,
}

impl ParsedFile {
    /// Structs carrying the generate attribute
    pub fn targets(&self) -> impl Iterator<Item = &ParsedStruct> {
        self.structs.iter().filter(|s| s.packing.is_some())
    }
}

/// A struct declaration, before field types are resolved across files
#[derive(Debug, Clone)]
pub struct ParsedStruct {
    pub name: String,
    pub full_name: String,
    /// Set when the struct carries the generate attribute
    pub packing: Option<PackingRule>,
    pub fields: Vec<ParsedField>,
    /// Associated `pub const` items, in declaration order
    pub constants: Vec<DeclaredField>,
}

#[derive(Debug, Clone)]
pub struct ParsedField {
    pub name: String,
    pub ty: ParsedType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedType {
    Known(FieldType),
    /// A plain type name that may refer to another scanned struct
    Named(String),
}

/// Struct declarations from every scanned file, used to resolve composite fields
#[derive(Debug, Default)]
pub struct TypeIndex {
    structs: HashMap<String, Vec<ParsedField>>,
}

impl TypeIndex {
    pub fn new(files: &[ParsedFile]) -> Self {
        let mut structs = HashMap::new();
        for parsed in files.iter().flat_map(|f| &f.structs) {
            if structs.contains_key(&parsed.name) {
                tracing::warn!(
                    "Struct name '{}' is declared more than once; using the first declaration",
                    parsed.name
                );
                continue;
            }
            structs.insert(parsed.name.clone(), parsed.fields.clone());
        }
        Self { structs }
    }

    /// Build the generator input for a target struct
    pub fn resolve(&self, parsed: &ParsedStruct) -> StructureDescription {
        let mut fields: Vec<DeclaredField> = parsed
            .fields
            .iter()
            .map(|field| DeclaredField::instance(&field.name, self.resolve_type(&field.ty)))
            .collect();
        fields.extend(parsed.constants.iter().cloned());

        StructureDescription {
            name: parsed.name.clone(),
            full_name: parsed.full_name.clone(),
            packing: parsed.packing.unwrap_or_default(),
            fields,
        }
    }

    fn resolve_type(&self, ty: &ParsedType) -> FieldType {
        match ty {
            ParsedType::Known(known) => known.clone(),
            ParsedType::Named(name) => match self.structs.get(name) {
                Some(subfields) => FieldType::Composite(CompositeType::new(
                    name,
                    subfields
                        .iter()
                        .map(|sub| DeclaredField::instance(&sub.name, shallow(&sub.ty)))
                        .collect(),
                )),
                None => FieldType::Opaque(name.clone()),
            },
        }
    }
}

/// Composites are resolved one level deep; nested names stay opaque
fn shallow(ty: &ParsedType) -> FieldType {
    match ty {
        ParsedType::Known(known) => known.clone(),
        ParsedType::Named(name) => FieldType::Opaque(name.clone()),
    }
}

/// Parse a Rust source file
///
/// `module_path` is the path of the file's module, starting with the crate name.
pub fn parse_file(
    path: impl AsRef<Path>,
    module_path: &[String],
    default_packing: PackingRule,
) -> Result<ParsedFile> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let structs = parse_source(&content, module_path, default_packing)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(ParsedFile {
        path: path.to_path_buf(),
        structs,
    })
}

/// Parse struct declarations from Rust source code
pub fn parse_source(
    source: &str,
    module_path: &[String],
    default_packing: PackingRule,
) -> Result<Vec<ParsedStruct>> {
    let file = syn::parse_file(source).context("Failed to parse Rust source")?;

    let mut structs = Vec::new();
    collect_items(&file.items, module_path, default_packing, &mut structs)?;
    Ok(structs)
}

/// Collect structs from one module level, recursing into inline modules
fn collect_items(
    items: &[Item],
    module_path: &[String],
    default_packing: PackingRule,
    structs: &mut Vec<ParsedStruct>,
) -> Result<()> {
    let mut local = Vec::new();
    let mut constants: HashMap<String, Vec<DeclaredField>> = HashMap::new();

    for item in items {
        match item {
            Item::Struct(item_struct) => {
                if let Some(parsed) = parse_struct(item_struct, module_path, default_packing)? {
                    local.push(structs.len());
                    structs.push(parsed);
                }
            }
            Item::Impl(item_impl) => {
                if let Some(name) = inherent_impl_target(item_impl) {
                    constants
                        .entry(name)
                        .or_default()
                        .extend(parse_impl_constants(item_impl));
                }
            }
            Item::Mod(item_mod) => {
                if let Some((_, content)) = &item_mod.content {
                    let mut nested = module_path.to_vec();
                    nested.push(item_mod.ident.to_string());
                    collect_items(content, &nested, default_packing, structs)?;
                }
            }
            _ => {}
        }
    }

    for index in local {
        if let Some(found) = constants.remove(&structs[index].name) {
            structs[index].constants = found;
        }
    }

    Ok(())
}

fn parse_struct(
    item_struct: &ItemStruct,
    module_path: &[String],
    default_packing: PackingRule,
) -> Result<Option<ParsedStruct>> {
    let name = item_struct.ident.to_string();
    let packing = packing_attribute(&item_struct.attrs, default_packing)
        .with_context(|| format!("Invalid #[{}] on struct {}", ATTRIBUTE, name))?;

    let fields = match &item_struct.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|field| {
                field.ident.as_ref().map(|ident| ParsedField {
                    name: ident.to_string(),
                    ty: map_type(&field.ty),
                })
            })
            .collect(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            if packing.is_some() {
                anyhow::bail!(
                    "#[{}] requires named fields, but {} is a tuple struct",
                    ATTRIBUTE,
                    name
                );
            }
            // Not usable as a composite either
            return Ok(None);
        }
    };

    let mut full_name = module_path.join("::");
    if !full_name.is_empty() {
        full_name.push_str("::");
    }
    full_name.push_str(&name);

    Ok(Some(ParsedStruct {
        name,
        full_name,
        packing,
        fields,
        constants: Vec::new(),
    }))
}

/// Read `#[generate_hlsl]` / `#[generate_hlsl(packing_rules = "aggressive")]`
fn packing_attribute(
    attrs: &[syn::Attribute],
    default_packing: PackingRule,
) -> Result<Option<PackingRule>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident(ATTRIBUTE)) else {
        return Ok(None);
    };

    let mut packing = default_packing;
    match &attr.meta {
        syn::Meta::Path(_) => {}
        syn::Meta::List(_) => {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("packing_rules") || meta.path.is_ident("packing") {
                    let rule: syn::LitStr = meta.value()?.parse()?;
                    packing = rule.value().parse().map_err(|e: String| meta.error(e))?;
                    Ok(())
                } else {
                    Err(meta.error("expected `packing_rules = \"exact\" | \"aggressive\"`"))
                }
            })?;
        }
        syn::Meta::NameValue(_) => {
            anyhow::bail!("expected #[{}] or #[{}(packing_rules = \"...\")]", ATTRIBUTE, ATTRIBUTE)
        }
    }

    Ok(Some(packing))
}

/// Self type name of an inherent `impl Name { ... }`
fn inherent_impl_target(item_impl: &ItemImpl) -> Option<String> {
    if item_impl.trait_.is_some() {
        return None;
    }
    match &*item_impl.self_ty {
        SynType::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}

/// `pub const` items of an impl block, as static fields
///
/// Only scalar-typed constants are shader constants. `Self`, `usize`, array
/// and other constants are Rust-side helpers and are skipped; an unsupported
/// scalar such as `u8` is still kept so generation reports it.
fn parse_impl_constants(item_impl: &ItemImpl) -> Vec<DeclaredField> {
    item_impl
        .items
        .iter()
        .filter_map(|item| match item {
            ImplItem::Const(constant) if matches!(constant.vis, syn::Visibility::Public(_)) => {
                let ty = shallow(&map_type(&constant.ty));
                if !matches!(ty, FieldType::Scalar(_)) {
                    tracing::debug!("Skipping non-scalar constant {}", constant.ident);
                    return None;
                }
                let value = parse_value(&constant.expr, &ty);
                Some(DeclaredField {
                    name: constant.ident.to_string(),
                    ty,
                    is_static: true,
                    value,
                })
            }
            _ => None,
        })
        .collect()
}

/// Evaluate a literal constant expression, e.g. `4`, `-1`, `0.5`
fn parse_value(expr: &Expr, ty: &FieldType) -> Option<Value> {
    let (negative, lit) = literal(expr)?;

    match lit {
        Lit::Float(float) => {
            let value = float.base10_parse::<f32>().ok()?;
            Some(Value::Float(if negative { -value } else { value }))
        }
        Lit::Int(int) => {
            let magnitude = int.base10_parse::<i64>().ok()?;
            let value = if negative { -magnitude } else { magnitude };
            match ty.primitive_kind() {
                Some(PrimitiveKind::Float) => Some(Value::Float(value as f32)),
                Some(PrimitiveKind::UInt) if value >= 0 => u32::try_from(value).ok().map(Value::UInt),
                _ => i32::try_from(value).ok().map(Value::Int),
            }
        }
        _ => None,
    }
}

fn literal(expr: &Expr) -> Option<(bool, &Lit)> {
    match expr {
        Expr::Lit(expr_lit) => Some((false, &expr_lit.lit)),
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match &*unary.expr {
            Expr::Lit(expr_lit) => Some((true, &expr_lit.lit)),
            _ => None,
        },
        Expr::Paren(paren) => literal(&paren.expr),
        _ => None,
    }
}

/// Map a Rust field type to the generator's type model
fn map_type(ty: &SynType) -> ParsedType {
    match ty {
        SynType::Path(type_path) if type_path.qself.is_none() => {
            let Some(segment) = type_path.path.segments.last() else {
                return opaque(ty);
            };
            if !segment.arguments.is_empty() {
                return opaque(ty);
            }

            let ident = segment.ident.to_string();
            match ident.as_str() {
                "Vec2" => ParsedType::Known(FieldType::FloatVector(2)),
                "Vec3" => ParsedType::Known(FieldType::FloatVector(3)),
                "Vec4" => ParsedType::Known(FieldType::FloatVector(4)),
                "Mat4" => ParsedType::Known(FieldType::FloatMatrix4x4),
                _ => match ScalarType::from_rust(&ident) {
                    Some(scalar) => ParsedType::Known(FieldType::Scalar(scalar)),
                    None => ParsedType::Named(ident),
                },
            }
        }
        SynType::Array(array) => {
            let Some(len) = array_len(&array.len) else {
                return opaque(ty);
            };
            if is_f32(&array.elem) {
                return ParsedType::Known(FieldType::FloatVector(len));
            }
            if let SynType::Array(inner) = &*array.elem {
                if is_f32(&inner.elem) && array_len(&inner.len) == Some(4) && len == 4 {
                    return ParsedType::Known(FieldType::FloatMatrix4x4);
                }
            }
            opaque(ty)
        }
        SynType::Paren(paren) => map_type(&paren.elem),
        SynType::Group(group) => map_type(&group.elem),
        _ => opaque(ty),
    }
}

fn is_f32(ty: &SynType) -> bool {
    matches!(ty, SynType::Path(type_path) if type_path.path.is_ident("f32"))
}

fn array_len(expr: &Expr) -> Option<u32> {
    match expr {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse().ok(),
        _ => None,
    }
}

fn opaque(ty: &SynType) -> ParsedType {
    ParsedType::Known(FieldType::Opaque(type_to_string(ty)))
}

/// Convert syn::Type to string representation
fn type_to_string(ty: &SynType) -> String {
    match ty {
        SynType::Path(type_path) if type_path.path.segments.len() == 1 => {
            type_path.path.segments[0].ident.to_string()
        }
        _ => ty.to_token_stream().to_string(),
    }
}
