//! The `joiTsGenerator` section of a project manifest (e.g. `package.json`).
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "joiTsGenerator")]
    section: Option<GeneratorConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Serialized schema descriptions of the input module.
    pub input: PathBuf,
    /// The module the utilities import schemas and factories from; defaults to `input`.
    #[serde(default)]
    pub module: Option<PathBuf>,
    pub outputs: Outputs,
    #[serde(default)]
    pub use_option_types: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Outputs {
    pub library: PathBuf,
    pub types: PathBuf,
    pub utils: PathBuf,
}

impl GeneratorConfig {
    pub fn module_path(&self) -> &Path {
        self.module.as_deref().unwrap_or(&self.input)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields: [(&'static str, &Path); 4] = [
            ("input", self.input.as_path()),
            ("outputs.library", self.outputs.library.as_path()),
            ("outputs.types", self.outputs.types.as_path()),
            ("outputs.utils", self.outputs.utils.as_path()),
        ];
        for (field, path) in fields {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyField { field });
            }
        }
        Ok(())
    }

    /// Re-root every relative path at `base`.
    fn resolve(mut self, base: &Path) -> Self {
        let join = |p: &mut PathBuf| *p = base.join(&*p);
        join(&mut self.input);
        if let Some(module) = self.module.as_mut() {
            join(module);
        }
        join(&mut self.outputs.library);
        join(&mut self.outputs.types);
        join(&mut self.outputs.utils);
        self
    }
}

/// Parse manifest text. Paths stay as written.
pub fn parse(src: &str, path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let manifest: Manifest = crate::path_de::from_str_with_path(src).map_err(|detail| {
        ConfigError::Malformed { path: path.to_path_buf(), detail }
    })?;
    let config = manifest.section.ok_or_else(|| ConfigError::MissingSection {
        path: path.to_path_buf(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Read the manifest and resolve paths relative to its directory.
pub fn load(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&src, path)?;
    let base = path.parent().unwrap_or(Path::new(""));
    tracing::debug!(manifest = %path.display(), ?config, "loaded generator config");
    Ok(config.resolve(base))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> &'static Path { Path::new("package.json") }

    #[test]
    fn full_section() {
        let config = parse(r#"{
            "name": "app",
            "joiTsGenerator": {
                "input": "src/schemas.json",
                "outputs": { "library": "gen/runtime.ts", "types": "gen/types.ts", "utils": "gen/utils.ts" },
                "useOptionTypes": true
            }
        }"#, manifest()).unwrap();
        assert_eq!(config.input, PathBuf::from("src/schemas.json"));
        assert_eq!(config.outputs.utils, PathBuf::from("gen/utils.ts"));
        assert!(config.use_option_types);
        assert_eq!(config.module_path(), Path::new("src/schemas.json"));
    }

    #[test]
    fn option_types_default_off() {
        let config = parse(r#"{ "joiTsGenerator": {
            "input": "s.json", "module": "src/s.ts",
            "outputs": { "library": "a.ts", "types": "b.ts", "utils": "c.ts" }
        } }"#, manifest()).unwrap();
        assert!(!config.use_option_types);
        assert_eq!(config.module_path(), Path::new("src/s.ts"));
    }

    #[test]
    fn missing_section() {
        let err = parse(r#"{ "name": "app" }"#, manifest()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection { .. }));
    }

    #[test]
    fn missing_required_field_names_its_path() {
        let err = parse(r#"{ "joiTsGenerator": {
            "input": "s.json",
            "outputs": { "library": "a.ts", "types": "b.ts" }
        } }"#, manifest()).unwrap_err();
        let ConfigError::Malformed { detail, .. } = err else { panic!("expected malformed") };
        assert!(detail.contains("joiTsGenerator.outputs"), "{detail}");
        assert!(detail.contains("utils"), "{detail}");
    }

    #[test]
    fn wrong_type_is_malformed() {
        let err = parse(r#"{ "joiTsGenerator": {
            "input": "s.json", "useOptionTypes": "yes",
            "outputs": { "library": "a.ts", "types": "b.ts", "utils": "c.ts" }
        } }"#, manifest()).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn empty_field_is_rejected() {
        let err = parse(r#"{ "joiTsGenerator": {
            "input": "s.json",
            "outputs": { "library": "", "types": "b.ts", "utils": "c.ts" }
        } }"#, manifest()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyField { field: "outputs.library" }));
    }

    #[test]
    fn load_resolves_against_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, r#"{ "joiTsGenerator": {
            "input": "src/schemas.json",
            "outputs": { "library": "gen/runtime.ts", "types": "gen/types.ts", "utils": "gen/utils.ts" }
        } }"#).unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.input, dir.path().join("src/schemas.json"));
        assert_eq!(config.outputs.types, dir.path().join("gen/types.ts"));
    }

    #[test]
    fn load_reports_unreadable_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
