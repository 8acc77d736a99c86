use std::path::PathBuf;

use thiserror::Error;

use crate::Language;

/// The primary error type that can be produced by couchview.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported emit value kind: {0}")]
    UnsupportedEmitValueKind(String),
    #[error("{feature} is not implemented for {language} map functions")]
    UnsupportedBackendFeature {
        language: Language,
        feature: &'static str,
    },
    #[error("unknown view language: {0}")]
    UnknownLanguage(String),
    #[error("I/O error {0}: {1}")]
    Io(String, std::io::Error),
    #[error("failed to load data from file {0}: {1}")]
    LoadFromFile(PathBuf, Box<Error>),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("cannot determine file type of file: {0}")]
    CannotDetermineFileType(PathBuf),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("definition files iteration failed: {0}")]
    SourceIter(#[from] glob::GlobError),
    #[error("failed to parse definition file pattern \"{0}\": {1}")]
    SourceFilePattern(String, glob::PatternError),
    #[error("no such view \"{1}\" for model {0}")]
    NoSuchView(String, String),
    #[error("cannot evaluate {0} map functions locally")]
    CannotEvaluate(Language),
    #[error("JavaScript execution error while running \"{0}\": {1}")]
    JavaScript(String, String),
    #[error("unexpected return value from JavaScript function \"{0}\": {1}")]
    UnexpectedJavaScriptReturnValue(String, String),
}
