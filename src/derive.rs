//! Schema node → TypeScript type expression.
//!
//! `derive` is the recursive walk used for fields and elements; `resolve_alias`
//! renders the right-hand side of a top-level `type X = ...` declaration.
//! Both record auxiliary named types in the run's [`TypeRegistry`].

use std::fmt;

use indexmap::IndexSet;
use serde_json::Value;

use crate::ir::{Primitive, SchemaKind, SchemaNode};
use crate::registry::TypeRegistry;

/// Name registered for strings carrying a `guid` rule.
pub const UUID_TYPE: &str = "Uuid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    Literal(String),          // already rendered, quotes included
    Union(Vec<TypeExpr>),
    List(Box<TypeExpr>),      // T[]
    Array(Vec<TypeExpr>),     // Array<A | B>, heterogeneous items
}

impl TypeExpr {
    pub fn named(name: &str) -> Self { Self::Named(name.to_string()) }

    fn is_compound_union(&self) -> bool {
        matches!(self, Self::Union(arms) if arms.len() > 1)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(s) | Self::Literal(s) => f.write_str(s),
            Self::Union(arms) if arms.is_empty() => f.write_str("never"),
            Self::Union(arms) => write_joined(f, arms),
            Self::List(item) if item.is_compound_union() => write!(f, "({item})[]"),
            Self::List(item) => write!(f, "{item}[]"),
            Self::Array(items) => {
                f.write_str("Array<")?;
                write_joined(f, items)?;
                f.write_str(">")
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, arms: &[TypeExpr]) -> fmt::Result {
    for (i, arm) in arms.iter().enumerate() {
        if i > 0 { f.write_str(" | ")?; }
        write!(f, "{arm}")?;
    }
    Ok(())
}

// ------------------------------- Deriver ---------------------------------- //

/// Derive the type expression of a nested node.
///
/// First match wins: arrays, then named-type hints, then `guid` strings,
/// then alternatives, then the primitive table.
pub fn derive(node: &SchemaNode, registry: &mut TypeRegistry) -> TypeExpr {
    if let SchemaKind::Array { items } = &node.kind {
        return derive_array(items, registry);
    }
    if let Some(name) = &node.named_type_hint {
        let base = hinted_base(node, registry);
        registry.register(name, base);
        return TypeExpr::named(name);
    }
    derive_structural(node, registry)
}

/// Base of a hinted alias: the kind-mapped type, ignoring rules such as
/// `guid`. Alternatives keep their candidate union.
fn hinted_base(node: &SchemaNode, registry: &mut TypeRegistry) -> TypeExpr {
    match &node.kind {
        SchemaKind::Scalar(p) => TypeExpr::named(p.ts_name()),
        SchemaKind::Object { .. } => TypeExpr::named("object"),
        _ => derive_structural(node, registry),
    }
}

/// Everything after the hint check.
fn derive_structural(node: &SchemaNode, registry: &mut TypeRegistry) -> TypeExpr {
    match &node.kind {
        SchemaKind::Array { items } => derive_array(items, registry),
        SchemaKind::Scalar(Primitive::String) if is_guid(node) => {
            registry.register(UUID_TYPE, TypeExpr::named(Primitive::String.ts_name()));
            TypeExpr::named(UUID_TYPE)
        }
        SchemaKind::Alternatives { matches } => {
            TypeExpr::Union(matches.iter().map(|m| derive(m, registry)).collect())
        }
        SchemaKind::Object { .. } => TypeExpr::named("object"),
        SchemaKind::Scalar(p) => TypeExpr::named(p.ts_name()),
    }
}

fn derive_array(items: &[SchemaNode], registry: &mut TypeRegistry) -> TypeExpr {
    match items {
        [] => TypeExpr::List(Box::new(TypeExpr::named(Primitive::Any.ts_name()))),
        [only] => TypeExpr::List(Box::new(derive(only, registry))),
        all => TypeExpr::Array(all.iter().map(|i| derive(i, registry)).collect()),
    }
}

fn is_guid(node: &SchemaNode) -> bool {
    node.has_rule("guid") || node.has_rule("uuid")
}

// ---------------------------- Alias resolver ------------------------------ //

/// Right-hand side of a top-level alias: a literal union when the node is
/// restricted to a closed set, else its base type.
pub fn resolve_alias(node: &SchemaNode, registry: &mut TypeRegistry) -> TypeExpr {
    if node.allowed.is_empty() {
        return match &node.kind {
            SchemaKind::Array { items } => derive_array(items, registry),
            SchemaKind::Scalar(p) => TypeExpr::named(p.ts_name()),
            _ => derive_structural(node, registry),
        };
    }
    let quote = node.is_string();
    let literals: IndexSet<String> = node
        .allowed
        .iter()
        .map(|v| render_literal(v, quote))
        .collect();
    TypeExpr::Union(literals.into_iter().map(TypeExpr::Literal).collect())
}

fn render_literal(value: &Value, quote: bool) -> String {
    match value {
        Value::String(_) => value.to_string(),
        other if quote => Value::String(other.to_string()).to_string(),
        other => other.to_string(),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::SchemaNode as N;
    use indexmap::IndexMap;
    use serde_json::json;

    fn string() -> N { N::scalar(Primitive::String) }
    fn number() -> N { N::scalar(Primitive::Number) }
    fn array(items: Vec<N>) -> N { N::new(SchemaKind::Array { items }) }
    fn object() -> N { N::new(SchemaKind::Object { keys: IndexMap::new() }) }

    fn render(node: &N) -> (String, TypeRegistry) {
        let mut reg = TypeRegistry::new();
        let out = derive(node, &mut reg).to_string();
        (out, reg)
    }

    #[test]
    fn homogeneous_array_is_list() {
        assert_eq!(render(&array(vec![string()])).0, "string[]");
    }

    #[test]
    fn heterogeneous_array_enumerates_every_item() {
        let (out, _) = render(&array(vec![string(), number(), N::scalar(Primitive::Date)]));
        assert_eq!(out, "Array<string | number | Date>");
    }

    #[test]
    fn array_without_items_is_any_list() {
        assert_eq!(render(&array(vec![])).0, "any[]");
    }

    #[test]
    fn list_of_union_is_parenthesized() {
        let alt = N::new(SchemaKind::Alternatives { matches: vec![string(), number()] });
        assert_eq!(render(&array(vec![alt])).0, "(string | number)[]");
    }

    #[test]
    fn array_wins_over_hint() {
        let (out, reg) = render(&array(vec![string()]).named("Tags"));
        assert_eq!(out, "string[]");
        assert!(reg.is_empty());
    }

    #[test]
    fn hint_registers_named_type() {
        let (out, reg) = render(&number().named("Money"));
        assert_eq!(out, "Money");
        assert_eq!(reg.get("Money").unwrap().base, Some(TypeExpr::named("number")));
    }

    #[test]
    fn hinted_object_aliases_object() {
        let (out, reg) = render(&object().named("Address"));
        assert_eq!(out, "Address");
        assert_eq!(reg.get("Address").unwrap().base, Some(TypeExpr::named("object")));
    }

    #[test]
    fn guid_string_is_uuid_once() {
        let mut reg = TypeRegistry::new();
        let id = string().with_rule("guid");
        assert_eq!(derive(&id, &mut reg).to_string(), "Uuid");
        assert_eq!(derive(&array(vec![id.clone()]), &mut reg).to_string(), "Uuid[]");
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(UUID_TYPE).unwrap().base, Some(TypeExpr::named("string")));
    }

    #[test]
    fn hint_beats_guid() {
        let (out, reg) = render(&string().with_rule("guid").named("UserId"));
        assert_eq!(out, "UserId");
        assert_eq!(reg.get("UserId").unwrap().base, Some(TypeExpr::named("string")));
        assert!(reg.get(UUID_TYPE).is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn hinted_alternatives_alias_their_union() {
        let alt = N::new(SchemaKind::Alternatives { matches: vec![number(), string()] }).named("Amount");
        let (out, reg) = render(&alt);
        assert_eq!(out, "Amount");
        assert_eq!(reg.get("Amount").unwrap().base.as_ref().unwrap().to_string(), "number | string");
    }

    #[test]
    fn alternatives_keep_order_and_duplicates() {
        let alt = N::new(SchemaKind::Alternatives { matches: vec![number(), string(), number()] });
        assert_eq!(render(&alt).0, "number | string | number");
    }

    #[test]
    fn primitive_table() {
        assert_eq!(render(&N::scalar(Primitive::Date)).0, "Date");
        assert_eq!(render(&N::scalar(Primitive::Boolean)).0, "boolean");
        assert_eq!(render(&N::scalar(Primitive::Other("binary".into()))).0, "binary");
        assert_eq!(render(&object()).0, "object");
    }

    #[test]
    fn alias_dedupes_literals_in_order() {
        let mut reg = TypeRegistry::new();
        let status = string().with_allowed(vec![json!("a"), json!("a"), json!("b")]);
        assert_eq!(resolve_alias(&status, &mut reg).to_string(), r#""a" | "b""#);
    }

    #[test]
    fn alias_literals_bare_for_non_strings() {
        let mut reg = TypeRegistry::new();
        let level = number().with_allowed(vec![json!(3), json!(1), json!(3)]);
        assert_eq!(resolve_alias(&level, &mut reg).to_string(), "3 | 1");
    }

    #[test]
    fn alias_quotes_non_string_values_of_string_schema() {
        let mut reg = TypeRegistry::new();
        let code = string().with_allowed(vec![json!("x"), json!(1)]);
        assert_eq!(resolve_alias(&code, &mut reg).to_string(), r#""x" | "1""#);
    }

    #[test]
    fn alias_falls_back_to_base_kind() {
        let mut reg = TypeRegistry::new();
        assert_eq!(resolve_alias(&string().with_rule("guid"), &mut reg).to_string(), "string");
        assert_eq!(resolve_alias(&array(vec![string()]), &mut reg).to_string(), "string[]");
        assert!(reg.is_empty());
    }
}
