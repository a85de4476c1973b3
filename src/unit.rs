//! Compiled unit: a source file bound to a language and a problem,
//! staged in an exclusive working directory.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use crate::error::EngineError;
use crate::languages::LanguageSpec;
use crate::problem::ProblemInfo;
use crate::template::TemplateContext;

/// Diagnostics from a successful compile step.
#[derive(Debug)]
pub struct CompileOutcome {
    pub duration: Duration,
    /// Raw compiler stdout, forwarded verbatim to the caller.
    pub stdout: String,
    /// Raw compiler stderr, forwarded verbatim to the caller.
    pub stderr: String,
}

/// A submitted (or interactor) source file staged for judging.
///
/// The working directory is exclusive to this unit and is removed on
/// drop, on every exit path including compile failure.
#[derive(Debug)]
pub struct CompiledUnit {
    lang: Arc<LanguageSpec>,
    ctx: TemplateContext,
    problem: Arc<ProblemInfo>,
    dir: TempDir,
    compiled: bool,
}

impl CompiledUnit {
    /// Stage a source file in a fresh working directory.
    pub async fn create(
        lang: Arc<LanguageSpec>,
        problem: Arc<ProblemInfo>,
        source_name: &str,
        source: &[u8],
    ) -> Result<Self> {
        let ctx = TemplateContext::for_source(source_name).map_err(EngineError::from)?;
        let dir = tempfile::tempdir().context("failed to create working directory")?;
        tokio::fs::write(dir.path().join(source_name), source)
            .await
            .with_context(|| format!("failed to stage source file {}", source_name))?;
        Ok(Self {
            lang,
            ctx,
            problem,
            dir,
            compiled: false,
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn language(&self) -> &LanguageSpec {
        &self.lang
    }

    pub fn problem(&self) -> &ProblemInfo {
        &self.problem
    }

    pub fn time_limit(&self) -> Duration {
        self.problem.time_limit()
    }

    /// Absolute path of the staged source inside the working directory.
    pub fn artifact_path(&self) -> PathBuf {
        self.dir.path().join(self.ctx.file())
    }

    /// Run the language's compile command in the working directory.
    ///
    /// Must be called exactly once before any run. A non-zero compiler
    /// exit is a [`EngineError::Compile`] carrying the captured
    /// diagnostics; for class-file languages the build output is then
    /// scanned to resolve `__class__`.
    pub async fn compile(&mut self) -> Result<CompileOutcome> {
        if self.compiled {
            bail!("unit for {} is already compiled", self.ctx.file());
        }

        let argv = self
            .lang
            .compile
            .instantiate(&self.ctx)
            .map_err(EngineError::from)?;
        debug!(command = ?argv, "compiling {}", self.ctx.file());

        let started = Instant::now();
        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .current_dir(self.dir.path())
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to invoke compiler {:?}", argv[0]))?;
        let duration = started.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let log = if !stderr.is_empty() {
                stderr
            } else if !stdout.is_empty() {
                stdout
            } else {
                format!("compiler exited with {}", output.status)
            };
            return Err(EngineError::Compile {
                file: self.ctx.file().to_string(),
                log,
            }
            .into());
        }

        if self.lang.class_scan {
            let class = scan_class_file(self.dir.path()).await?;
            self.ctx.set_class_name(&class).map_err(EngineError::from)?;
        }

        self.compiled = true;
        debug!(
            elapsed_ms = duration.as_millis() as u64,
            "compiled {}",
            self.ctx.file()
        );
        Ok(CompileOutcome {
            duration,
            stdout,
            stderr,
        })
    }

    /// Instantiated run command. Fails until [`Self::compile`] has
    /// succeeded.
    pub fn run_command(&self) -> Result<Vec<String>, EngineError> {
        self.run_command_with_args(&[])
    }

    /// Instantiated run command with extra positional arguments appended.
    pub fn run_command_with_args(&self, extra: &[String]) -> Result<Vec<String>, EngineError> {
        if !self.compiled {
            return Err(EngineError::NotCompiled(self.ctx.file().to_string()));
        }
        Ok(self.lang.run.instantiate_with_args(&self.ctx, extra)?)
    }
}

/// Find the single non-synthetic `.class` file produced by a compile.
///
/// Synthetic companion classes (names containing '$') are skipped;
/// anything other than exactly one match is a missing artifact.
async fn scan_class_file(dir: &Path) -> Result<String> {
    let mut matches = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to scan {}", dir.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(stem) = name.strip_suffix(".class") {
            if !stem.contains('$') {
                matches.push(stem.to_string());
            }
        }
    }

    match matches.as_slice() {
        [single] => Ok(single.clone()),
        _ => Err(EngineError::MissingArtifact {
            dir: dir.to_path_buf(),
        }
        .into()),
    }
}
