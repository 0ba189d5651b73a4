//! Loading serialized schema descriptions.
//!
//! The input is a JSON object of export name → the validation library's
//! `describe()` output. Both the current dialect (`keys`, `rules`, `allow`,
//! `matches[].schema`, `flags.only`) and the legacy one (`children`, `tests`,
//! `valids`, `alternatives`, `flags.allowOnly`) are accepted. `type:<Name>`
//! notes become [`SchemaNode::named_type_hint`] here, so nothing downstream
//! parses note text.
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::ir::{Presence, Primitive, SchemaKind, SchemaNode};

pub const SCHEMA_SUFFIX: &str = "Schema";
pub const FACTORY_SUFFIX: &str = "Factory";

static TYPE_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^type:\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*$").unwrap()
});

// ------------------------------ Raw format -------------------------------- //

#[derive(Debug, Deserialize)]
struct RawDescription {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    flags: RawFlags,
    #[serde(default, alias = "children")]
    keys: IndexMap<String, RawDescription>,
    #[serde(default)]
    items: Vec<RawDescription>,
    #[serde(default, alias = "alternatives")]
    matches: Vec<Value>, // classified by `match_candidate`
    #[serde(default)]
    notes: Vec<String>,
    #[serde(default, alias = "tests")]
    rules: Vec<RawRule>,
    #[serde(default, alias = "valids")]
    allow: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFlags {
    presence: Option<String>,
    #[serde(default)]
    only: bool,
    #[serde(default)]
    allow_only: bool, // legacy spelling of `only`
}

#[derive(Debug, Deserialize)]
struct RawRule {
    name: String,
}

/// Keys of a conditional match (`when`/`switch` forms); these have no static shape.
const CONDITIONAL_KEYS: [&str; 5] = ["ref", "is", "then", "otherwise", "switch"];

// ------------------------------- Lowering --------------------------------- //

fn lower(raw: RawDescription, path: &str) -> Result<SchemaNode, SchemaError> {
    let named_type_hint = type_hint(&raw.notes, path)?;
    let presence = match raw.flags.presence.as_deref() {
        Some("required") => Presence::Required,
        Some("forbidden") => Presence::Forbidden,
        _ => Presence::Optional,
    };
    let allowed = if raw.flags.only || raw.flags.allow_only {
        raw.allow.into_iter().filter_map(literal_value).collect()
    } else {
        Vec::new()
    };
    let rules = raw.rules.into_iter().map(|r| r.name).collect();

    let kind = match raw.kind.as_str() {
        "object" => {
            let mut keys = IndexMap::with_capacity(raw.keys.len());
            for (key, child) in raw.keys {
                let child = lower(child, &format!("{path}.{key}"))?;
                keys.insert(key, child);
            }
            SchemaKind::Object { keys }
        }
        "array" => {
            let items = raw
                .items
                .into_iter()
                .enumerate()
                .map(|(i, item)| lower(item, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()?;
            SchemaKind::Array { items }
        }
        "alternatives" => {
            let mut matches = Vec::with_capacity(raw.matches.len());
            for (i, m) in raw.matches.into_iter().enumerate() {
                let Some(candidate) = match_candidate(m) else {
                    tracing::warn!(node = path, index = i, "skipping conditional alternative");
                    continue;
                };
                let child_path = format!("{path}|{i}");
                let raw: RawDescription = crate::path_de::from_value_with_path(&child_path, candidate)
                    .map_err(|detail| SchemaError::Malformed { detail })?;
                matches.push(lower(raw, &child_path)?);
            }
            SchemaKind::Alternatives { matches }
        }
        other => SchemaKind::Scalar(Primitive::from_kind_name(other)),
    };

    Ok(SchemaNode { kind, named_type_hint, presence, allowed, rules })
}

/// The description inside one alternatives entry: `{ schema }` in the current
/// dialect, the bare description in the legacy one. `None` for conditionals.
fn match_candidate(entry: Value) -> Option<Value> {
    match entry {
        Value::Object(mut m) if m.contains_key("schema") => m.remove("schema"),
        Value::Object(m) if CONDITIONAL_KEYS.iter().any(|k| m.contains_key(*k)) => None,
        other => Some(other),
    }
}

/// Name from the first `type:` note. A `type:` note without a valid name is an
/// authoring error rather than a silently unnamed node.
fn type_hint(notes: &[String], path: &str) -> Result<Option<String>, SchemaError> {
    let Some(note) = notes.iter().find(|n| n.starts_with("type:")) else {
        return Ok(None);
    };
    match TYPE_NOTE.captures(note) {
        Some(caps) => Ok(Some(caps[1].to_string())),
        None => Err(SchemaError::MissingTypeAnnotation { node: path.to_string() }),
    }
}

/// Unwrap `{ value: x }` literals; drop flag markers such as `{ override: true }`.
fn literal_value(v: Value) -> Option<Value> {
    match v {
        Value::Object(mut m) if m.len() == 1 && m.contains_key("value") => m.remove("value"),
        Value::Object(m) if m.contains_key("override") || m.contains_key("special") => None,
        other => Some(other),
    }
}

// ------------------------------- Front API -------------------------------- //

/// Parse one description; `name` prefixes error paths.
pub fn parse_description(name: &str, value: Value) -> Result<SchemaNode, SchemaError> {
    let raw: RawDescription = crate::path_de::from_value_with_path(name, value)
        .map_err(|detail| SchemaError::Malformed { detail })?;
    lower(raw, name)
}

pub fn parse_document(src: &str) -> Result<Map<String, Value>, SchemaError> {
    let doc: Value = crate::path_de::from_str_with_path(src)
        .map_err(|detail| SchemaError::Malformed { detail })?;
    match doc {
        Value::Object(map) => Ok(map),
        _ => Err(SchemaError::NotAnObject),
    }
}

pub fn read_document(path: &Path) -> Result<Map<String, Value>, SchemaError> {
    let src = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&src)
}

/// Every entry is a schema, rendered under its export name.
pub fn schema_map(doc: Map<String, Value>) -> Result<IndexMap<String, SchemaNode>, SchemaError> {
    doc.into_iter()
        .map(|(name, value)| parse_description(&name, value).map(|node| (name, node)))
        .collect()
}

/// Exports selected by naming convention: `<Name>Schema` and `<Name>Factory`.
#[derive(Debug, Default)]
pub struct ModuleExports {
    pub schemas: IndexMap<String, SchemaNode>, // keyed by <Name>
    pub factories: IndexSet<String>,           // <Name>s that have a factory
}

impl ModuleExports {
    pub fn from_document(doc: Map<String, Value>) -> Result<Self, SchemaError> {
        let mut out = Self::default();
        for (export, value) in doc {
            if let Some(name) = export.strip_suffix(SCHEMA_SUFFIX).filter(|n| !n.is_empty()) {
                let node = parse_description(&export, value)?;
                out.schemas.insert(name.to_string(), node);
            } else if let Some(name) = export.strip_suffix(FACTORY_SUFFIX).filter(|n| !n.is_empty()) {
                out.factories.insert(name.to_string());
            } else {
                tracing::debug!(export = %export, "ignoring export outside the naming convention");
            }
        }
        if out.schemas.is_empty() {
            return Err(SchemaError::NoSchemas);
        }
        Ok(out)
    }

    pub fn has_factory(&self, name: &str) -> bool { self.factories.contains(name) }
}

// ------------------------------- Tests ------------------------------------ //
