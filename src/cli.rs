//! CLI: `generate` (manifest-driven, three artifacts) and `types` (declarations only).
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::codegen::{Codegen, render_types};
use crate::coerce::{UtilsImports, import_specifier, render_utils, runtime_support};
use crate::declare::DeclareOptions;
use crate::describe::{self, ModuleExports};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// derive TypeScript declarations and coercion helpers from serialized validation schemas
#[derive(Parser, Debug)]
#[command(name = "joi-ts-gen", version)]
pub struct CommandLineInterface {
    /// debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate types, coercion utilities and runtime support from the manifest's `joiTsGenerator` section
    Generate(GenerateOut),
    /// emit type declarations only
    Types(TypesOut),
}

#[derive(Args, Debug)]
struct GenerateOut {
    /// project manifest holding the `joiTsGenerator` section
    #[arg(long, default_value = "package.json")]
    manifest: PathBuf,
}

#[derive(Args, Debug)]
struct TypesOut {
    /// JSON object of export name → schema description
    source: PathBuf,

    /// output .ts file
    dest: PathBuf,
}

/// Rendered artifact waiting to be written.
struct Artifact {
    path: PathBuf,
    contents: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        let artifacts = match &self.cmd {
            Command::Generate(target) => target.render()?,
            Command::Types(target) => target.render()?,
        };
        // everything rendered; only now touch the filesystem
        write_artifacts(&artifacts)
    }
}

impl GenerateOut {
    fn render(&self) -> Result<Vec<Artifact>> {
        let config = crate::config::load(&self.manifest)?;
        let doc = describe::read_document(&config.input)?;
        let exports = ModuleExports::from_document(doc)
            .with_context(|| format!("in {}", config.input.display()))?;

        let outputs = &config.outputs;
        let options = DeclareOptions { use_option_types: config.use_option_types };
        let mut cg = Codegen::new(options)
            .with_option_import(import_specifier(&outputs.types, &outputs.library));
        cg.emit_all(&exports.schemas)
            .with_context(|| format!("in {}", config.input.display()))?;
        tracing::debug!(
            schemas = exports.schemas.len(),
            named_types = cg.registry().len(),
            "rendered declarations"
        );
        let types_src = cg.into_string();

        let imports = UtilsImports {
            runtime: import_specifier(&outputs.utils, &outputs.library),
            types: import_specifier(&outputs.utils, &outputs.types),
            module: import_specifier(&outputs.utils, config.module_path()),
        };
        let utils_src = render_utils(&exports, &imports);

        Ok(vec![
            Artifact { path: outputs.types.clone(), contents: types_src },
            Artifact { path: outputs.utils.clone(), contents: utils_src },
            Artifact {
                path: outputs.library.clone(),
                contents: runtime_support(config.use_option_types).to_string(),
            },
        ])
    }
}

impl TypesOut {
    fn render(&self) -> Result<Vec<Artifact>> {
        let doc = describe::read_document(&self.source)?;
        let schemas = describe::schema_map(doc)
            .with_context(|| format!("in {}", self.source.display()))?;
        let types_src = render_types(&schemas, DeclareOptions::default())
            .with_context(|| format!("in {}", self.source.display()))?;
        Ok(vec![Artifact { path: self.dest.clone(), contents: types_src }])
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_artifacts(artifacts: &[Artifact]) -> Result<()> {
    for artifact in artifacts {
        write_file(&artifact.path, &artifact.contents)?;
        tracing::info!(path = %artifact.path.display(), bytes = artifact.contents.len(), "wrote");
    }
    Ok(())
}

fn write_file(out: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}
