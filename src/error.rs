//! Typed errors for the judge engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from command-template instantiation.
///
/// Instantiation is deterministic and side-effect-free, so these only
/// depend on the template text and the context values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("empty command template")]
    EmptyTemplate,
    /// `__class__` was referenced before compilation produced a class name.
    #[error("placeholder __class__ has no value yet")]
    UnresolvedClassName,
    /// Templates are split on whitespace, so placeholder values must not
    /// contain any.
    #[error("template value contains whitespace: {0:?}")]
    WhitespaceValue(String),
}

/// Domain failures of the judge engine.
///
/// Setup errors abort a run before any judging happens; `Compile` and
/// `MissingArtifact` are fatal for the unit they belong to. Per-testcase
/// verdicts are not errors and live in [`crate::verdict::Verdict`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unsupported language: {0}")]
    UnknownLanguage(String),
    #[error("unknown validator: {0}")]
    UnknownValidator(String),
    #[error("invalid problem info: {0}")]
    InvalidProblem(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// A run command was requested before the unit was compiled.
    #[error("unit for {0} has not been compiled")]
    NotCompiled(String),
    /// Compiler exited non-zero. `log` holds the captured diagnostics.
    #[error("compile error: {file}")]
    Compile { file: String, log: String },
    /// A class-file language compiled cleanly but did not leave exactly
    /// one non-synthetic .class file behind.
    #[error("missing class file artifact in {}", dir.display())]
    MissingArtifact { dir: PathBuf },
}
