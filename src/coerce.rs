//! Utilities file: one coercion function per schema, plus a fixture builder
//! for schemas that ship a factory. Also picks the runtime-support template.
use std::path::{Component, Path};

use crate::codegen::GENERATED_HEADER;
use crate::describe::{FACTORY_SUFFIX, ModuleExports, SCHEMA_SUFFIX};

const RUNTIME_SUPPORT: &str = include_str!("../templates/runtime.ts");
const RUNTIME_SUPPORT_OPTION: &str = include_str!("../templates/runtime-option.ts");

/// Runtime-support file contents, copied verbatim.
pub fn runtime_support(use_option_types: bool) -> &'static str {
    if use_option_types { RUNTIME_SUPPORT_OPTION } else { RUNTIME_SUPPORT }
}

/// Import specifiers as seen from the utilities file.
#[derive(Debug, Clone)]
pub struct UtilsImports {
    pub runtime: String,
    pub types: String,
    pub module: String,
}

pub fn render_utils(exports: &ModuleExports, imports: &UtilsImports) -> String {
    let mut sections = vec![GENERATED_HEADER.to_string()];
    sections.push(format!(
        "import {{ coerce, CoercionOptions, DeepReadonly }} from {};\n\
         import * as types from {};\n\
         import * as schemas from {};\n",
        js_string(&imports.runtime),
        js_string(&imports.types),
        js_string(&imports.module),
    ));
    for name in exports.schemas.keys() {
        sections.push(coerce_function(name));
        if exports.has_factory(name) {
            sections.push(build_function(name));
        }
    }
    sections.join("\n")
}

fn coerce_function(name: &str) -> String {
    format!(
        "export function coerce{name}(value: unknown, options?: CoercionOptions): DeepReadonly<types.{name}> {{\n\
         \x20 return coerce<types.{name}>(schemas.{name}{SCHEMA_SUFFIX}, value, options);\n\
         }}\n"
    )
}

fn build_function(name: &str) -> String {
    let factory = format!("schemas.{name}{FACTORY_SUFFIX}");
    format!(
        "export function build{name}(\n\
         \x20 overrides?: Parameters<typeof {factory}.build>[0],\n\
         \x20 options?: CoercionOptions,\n\
         ): DeepReadonly<types.{name}> {{\n\
         \x20 return coerce{name}({factory}.build(overrides), options);\n\
         }}\n"
    )
}

fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

// ------------------------------ Import paths ------------------------------ //

/// Relative ES import specifier from the file `from` to the file `to`, with
/// `to`'s extension dropped (`./types`, `../schemas`).
pub fn import_specifier(from: &Path, to: &Path) -> String {
    let from_dir = lexical(from.parent().unwrap_or(Path::new("")));
    let mut target = lexical(to);
    if let (Some(last), Some(stem)) = (target.last_mut(), to.file_stem()) {
        *last = stem.to_string_lossy().into_owned();
    }

    let common = from_dir.iter().zip(&target).take_while(|(a, b)| a == b).count();
    let ups = from_dir.len() - common;
    let rest = target[common..].join("/");
    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}

/// Path segments with `.` dropped and `..` folded where possible. A root
/// segment is never folded away.
fn lexical(path: &Path) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir if out.last().is_some_and(|s| s != ".." && s != "/") => {
                out.pop();
            }
            // `/..` is `/`
            Component::ParentDir if out.last().is_some_and(|s| s == "/") => {}
            other => out.push(other.as_os_str().to_string_lossy().into_owned()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::parse_document;

    fn exports() -> ModuleExports {
        let doc = parse_document(r#"{
            "WidgetSchema": { "type": "object", "keys": {} },
            "WidgetFactory": {},
            "StatusSchema": { "type": "string" }
        }"#).unwrap();
        ModuleExports::from_document(doc).unwrap()
    }

    fn imports() -> UtilsImports {
        UtilsImports {
            runtime: "./runtime".into(),
            types: "./types".into(),
            module: "../schemas".into(),
        }
    }

    #[test]
    fn utils_file_layout() {
        let out = render_utils(&exports(), &imports());
        let expected = "\
// Generated by joi-ts-gen. Do not edit.

import { coerce, CoercionOptions, DeepReadonly } from \"./runtime\";
import * as types from \"./types\";
import * as schemas from \"../schemas\";

export function coerceWidget(value: unknown, options?: CoercionOptions): DeepReadonly<types.Widget> {
  return coerce<types.Widget>(schemas.WidgetSchema, value, options);
}

export function buildWidget(
  overrides?: Parameters<typeof schemas.WidgetFactory.build>[0],
  options?: CoercionOptions,
): DeepReadonly<types.Widget> {
  return coerceWidget(schemas.WidgetFactory.build(overrides), options);
}

export function coerceStatus(value: unknown, options?: CoercionOptions): DeepReadonly<types.Status> {
  return coerce<types.Status>(schemas.StatusSchema, value, options);
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn template_selection() {
        assert!(runtime_support(true).contains("export type Option<T>"));
        assert!(!runtime_support(false).contains("export type Option<T>"));
        for template in [runtime_support(true), runtime_support(false)] {
            assert!(template.contains("allowUnknown: true"));
            assert!(template.contains("stripUnknown: true"));
            assert!(template.contains("presence: \"optional\""));
            assert!(template.contains("convert: true"));
        }
    }

    #[test]
    fn specifiers_between_outputs() {
        let rel = |a: &str, b: &str| import_specifier(Path::new(a), Path::new(b));
        assert_eq!(rel("src/gen/utils.ts", "src/gen/types.ts"), "./types");
        assert_eq!(rel("src/gen/utils.ts", "src/schemas.json"), "../schemas");
        assert_eq!(rel("gen/utils.ts", "lib/runtime/index.ts"), "../lib/runtime/index");
        assert_eq!(rel("utils.ts", "./types.ts"), "./types");
        assert_eq!(rel("/p/out/utils.ts", "/p/./src/../schemas.ts"), "../schemas");
    }

    #[test]
    fn parent_of_root_stays_absolute() {
        assert_eq!(lexical(Path::new("/../x")), vec!["/", "x"]);
        assert_eq!(lexical(Path::new("../x")), vec!["..", "x"]);
        assert_eq!(import_specifier(Path::new("/a/utils.ts"), Path::new("/../a/types.ts")), "./types");
    }
}
