//! Top-level declarations: `interface` for records, `type` alias otherwise.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::derive::{derive, resolve_alias};
use crate::error::SchemaError;
use crate::ir::{Primitive, SchemaKind, SchemaNode};
use crate::registry::TypeRegistry;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Wrapper type used for non-required fields when option types are enabled.
pub const OPTION_TYPE: &str = "Option";

#[derive(Debug, Clone, Copy, Default)]
pub struct DeclareOptions {
    /// Render non-required fields as `key: Option<T>` instead of `key?: T`.
    pub use_option_types: bool,
}

/// Render one exported schema. The name is registered as rendered before any
/// child is derived.
pub fn write(
    name: &str,
    node: &SchemaNode,
    registry: &mut TypeRegistry,
    options: &DeclareOptions,
) -> Result<String, SchemaError> {
    match &node.kind {
        SchemaKind::Object { keys } => {
            registry.register_rendered(name);
            let fields = keys
                .iter()
                .map(|(key, child)| field_line(key, child, registry, options))
                .collect::<Vec<_>>();
            if fields.is_empty() {
                return Ok(format!("export interface {name} {{}}\n"));
            }
            Ok(format!("export interface {name} {{\n{}}}\n", fields.concat()))
        }
        SchemaKind::Array { .. } | SchemaKind::Scalar(
            Primitive::String | Primitive::Number | Primitive::Boolean | Primitive::Date | Primitive::Any
        ) => {
            registry.register_rendered(name);
            let ty = resolve_alias(node, registry);
            Ok(format!("export type {name} = {ty};\n"))
        }
        SchemaKind::Alternatives { .. } | SchemaKind::Scalar(Primitive::Other(_)) => {
            Err(SchemaError::UnsupportedRootSchemaKind {
                name: name.to_string(),
                kind: node.kind.name().to_string(),
            })
        }
    }
}

fn field_line(
    key: &str,
    child: &SchemaNode,
    registry: &mut TypeRegistry,
    options: &DeclareOptions,
) -> String {
    let key = property_key(key);
    let ty = derive(child, registry);
    if child.is_required() {
        format!("  {key}: {ty};\n")
    } else if options.use_option_types {
        format!("  {key}: {OPTION_TYPE}<{ty}>;\n")
    } else {
        format!("  {key}?: {ty};\n")
    }
}

fn property_key(key: &str) -> String {
    if IDENTIFIER.is_match(key) {
        key.to_string()
    } else {
        serde_json::Value::from(key).to_string()
    }
}
