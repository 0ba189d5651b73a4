//! Error taxonomy: configuration problems vs. schema-authoring problems.
//!
//! Both are fatal and surface before any output file is written.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed manifest {path}: {detail}")]
    Malformed { path: PathBuf, detail: String },
    #[error("manifest {path} has no `joiTsGenerator` section")]
    MissingSection { path: PathBuf },
    #[error("`joiTsGenerator.{field}` must not be empty")]
    EmptyField { field: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema descriptions {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed schema description: {detail}")]
    Malformed { detail: String },
    #[error("schema descriptions must be a JSON object of export name to description")]
    NotAnObject,
    #[error("`{node}` carries a `type:` note without a usable type name")]
    MissingTypeAnnotation { node: String },
    #[error("schema `{name}` has kind `{kind}`, which cannot be rendered as a top-level declaration")]
    UnsupportedRootSchemaKind { name: String, kind: String },
    #[error("no exports named `<Name>Schema` were found")]
    NoSchemas,
}
