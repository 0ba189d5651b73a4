//! Types-file assembly for one generation run.
//!
//! `Codegen` owns the registry: schemas are emitted one by one, then
//! `into_string` places the discovered aliases (first-discovered first) ahead
//! of the top-level declarations.
use indexmap::IndexMap;

use crate::declare::{self, DeclareOptions, OPTION_TYPE};
use crate::error::SchemaError;
use crate::ir::SchemaNode;
use crate::registry::TypeRegistry;

pub const GENERATED_HEADER: &str = "// Generated by joi-ts-gen. Do not edit.\n";

pub struct Codegen {
    registry: TypeRegistry,
    options: DeclareOptions,
    option_import: Option<String>,
    declarations: Vec<String>,
}

impl Codegen {
    pub fn new(options: DeclareOptions) -> Self {
        Self {
            registry: TypeRegistry::new(),
            options,
            option_import: None,
            declarations: Vec::new(),
        }
    }

    /// Import the `Option` wrapper from `specifier` (only when option types are on).
    pub fn with_option_import(mut self, specifier: impl Into<String>) -> Self {
        if self.options.use_option_types {
            self.option_import = Some(specifier.into());
        }
        self
    }

    pub fn emit(&mut self, node: &SchemaNode, name: &str) -> Result<(), SchemaError> {
        tracing::debug!(schema = name, kind = node.kind.name(), "rendering declaration");
        let decl = declare::write(name, node, &mut self.registry, &self.options)?;
        self.declarations.push(decl);
        Ok(())
    }

    pub fn emit_all(&mut self, schemas: &IndexMap<String, SchemaNode>) -> Result<(), SchemaError> {
        for (name, node) in schemas {
            self.emit(node, name)?;
        }
        Ok(())
    }

    pub fn registry(&self) -> &TypeRegistry { &self.registry }

    pub fn into_string(self) -> String {
        let mut sections = vec![GENERATED_HEADER.to_string()];
        if let Some(specifier) = &self.option_import {
            sections.push(format!(
                "import type {{ {OPTION_TYPE} }} from {};\n",
                serde_json::Value::from(specifier.as_str())
            ));
        }
        let aliases = self
            .registry
            .pending()
            .map(|(name, base)| format!("export type {name} = {base};\n"))
            .collect::<String>();
        if !aliases.is_empty() {
            sections.push(aliases);
        }
        sections.extend(self.declarations);
        sections.join("\n")
    }
}

/// Render a whole schema map in one go.
pub fn render_types(
    schemas: &IndexMap<String, SchemaNode>,
    options: DeclareOptions,
) -> Result<String, SchemaError> {
    let mut cg = Codegen::new(options);
    cg.emit_all(schemas)?;
    Ok(cg.into_string())
}
