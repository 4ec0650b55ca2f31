use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Dhis2Error {
    #[error("missing credential environment variable: {0}")]
    MissingCredential(&'static str),

    #[error("failed to read organisation unit file at {0}")]
    OrgUnitRead(Utf8PathBuf),

    #[error("organisation unit file {path} has no '{column}' column")]
    MissingIdColumn { path: Utf8PathBuf, column: String },

    #[error("malformed organisation unit row in {path}: {message}")]
    OrgUnitParse { path: Utf8PathBuf, message: String },

    #[error("failed to read indicator directory at {0}")]
    IndicatorDirRead(Utf8PathBuf),

    #[error("failed to parse indicator document {path}: {message}")]
    CatalogParse { path: Utf8PathBuf, message: String },

    #[error("cannot build analytics query: indicator list is empty")]
    EmptyIndicatorList,

    #[error("invalid analytics request: {0}")]
    InvalidRequest(String),

    #[error("failed to write output file {path}: {message}")]
    Persistence { path: Utf8PathBuf, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
