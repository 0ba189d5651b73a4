// Strongly-typed schema tree. No serde_json::Value here except literal values.

use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    pub named_type_hint: Option<String>, // from a `type:<Name>` note
    pub presence: Presence,
    pub allowed: Vec<Value>,             // closed set only; empty means unrestricted
    pub rules: Vec<String>,              // rule names, e.g. `guid`
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Object { keys: IndexMap<String, SchemaNode> }, // declared order
    Array { items: Vec<SchemaNode> },
    Alternatives { matches: Vec<SchemaNode> },
    Scalar(Primitive),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Date,
    Any,
    Other(String), // unknown kind name, passed through verbatim
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    Required,
    #[default]
    Optional,
    Forbidden,
}

impl Primitive {
    pub fn from_kind_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "any" => Self::Any,
            other => Self::Other(other.to_string()),
        }
    }

    /// Nearest TypeScript name. Only `date` is remapped.
    pub fn ts_name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "Date",
            Self::Any => "any",
            Self::Other(name) => name,
        }
    }
}

impl SchemaKind {
    /// Kind name as the validation library reports it.
    pub fn name(&self) -> &str {
        match self {
            Self::Object { .. } => "object",
            Self::Array { .. } => "array",
            Self::Alternatives { .. } => "alternatives",
            Self::Scalar(Primitive::Date) => "date",
            Self::Scalar(p) => p.ts_name(),
        }
    }
}

impl SchemaNode {
    pub fn is_required(&self) -> bool { self.presence == Presence::Required }

    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r == name)
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, SchemaKind::Scalar(Primitive::String))
    }
}

// builder helpers for tests
#[cfg(test)]
impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            named_type_hint: None,
            presence: Presence::default(),
            allowed: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn scalar(p: Primitive) -> Self { Self::new(SchemaKind::Scalar(p)) }
    pub fn required(mut self) -> Self { self.presence = Presence::Required; self }
    pub fn named(mut self, name: &str) -> Self { self.named_type_hint = Some(name.to_string()); self }
    pub fn with_rule(mut self, name: &str) -> Self { self.rules.push(name.to_string()); self }
    pub fn with_allowed(mut self, values: Vec<Value>) -> Self { self.allowed = values; self }
}
