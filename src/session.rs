//! Per-problem orchestration: load problem metadata, compile the
//! submission (and interactor, for interactive problems), judge every
//! test case in order, and produce a summary report.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::judge::run_case;
use crate::languages::LanguageRegistry;
use crate::problem::{JudgeType, ProblemInfo};
use crate::reactive::{run_reactive, Wiring};
use crate::unit::CompiledUnit;
use crate::validator::validator_for;
use crate::verdict::Verdict;

/// Problem metadata file inside a problem directory.
pub const INFO_FILE: &str = "info.json";
/// Base name of the interactor source for interactive problems.
pub const REACTIVE_SOURCE: &str = "reactive";

/// Caller-facing knobs for one judging session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Language key override; the source file extension is used when
    /// unset.
    pub language: Option<String>,
    /// Validator key ("diff", "float", "floatN").
    pub validator: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            language: None,
            validator: "diff".to_string(),
        }
    }
}

/// Verdict for one test case, named after its input file.
#[derive(Debug)]
pub struct CaseResult {
    pub name: String,
    pub verdict: Verdict,
}

/// Summary of a judging session.
#[derive(Debug)]
pub struct Report {
    pub problem_name: String,
    pub judged_at: DateTime<Local>,
    /// Language display name.
    pub language: String,
    pub compile_time: Duration,
    /// Submitted source length in bytes.
    pub source_len: usize,
    pub judge_type: JudgeType,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "problem:      {}", self.problem_name)?;
        writeln!(f, "judged at:    {}", self.judged_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "language:     {}", self.language)?;
        writeln!(f, "compile time: {} ms", self.compile_time.as_millis())?;
        writeln!(f, "code length:  {} bytes", self.source_len)?;
        write!(f, "judge type:   {}", self.judge_type.label())
    }
}

/// One paired test case.
#[derive(Debug)]
struct TestCase {
    name: String,
    input: PathBuf,
    expected: PathBuf,
}

/// Pair `test_in/*` with `test_out/*` by sorted file name.
async fn list_cases(problem_dir: &Path) -> Result<Vec<TestCase>> {
    let inputs = sorted_entries(&problem_dir.join("test_in")).await?;
    let outputs = sorted_entries(&problem_dir.join("test_out")).await?;
    if inputs.len() != outputs.len() {
        bail!(
            "test case mismatch: {} inputs vs {} expected outputs in {}",
            inputs.len(),
            outputs.len(),
            problem_dir.display()
        );
    }

    Ok(inputs
        .into_iter()
        .zip(outputs)
        .map(|(input, expected)| TestCase {
            name: input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            input,
            expected,
        })
        .collect())
}

async fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("missing test directory {}", dir.display()))?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Build and compile the interactor unit from `reactive.<ext>` in the
/// problem directory.
async fn prepare_interactor(
    registry: &LanguageRegistry,
    problem_dir: &Path,
    problem: &Arc<ProblemInfo>,
) -> Result<CompiledUnit> {
    let key = problem
        .reactive_lang
        .as_deref()
        .ok_or_else(|| EngineError::InvalidProblem("interactive problem without RLang".into()))?;
    let lang = registry
        .get(key)
        .ok_or_else(|| EngineError::UnknownLanguage(key.to_string()))?;

    let source_name = format!("{}.{}", REACTIVE_SOURCE, lang.key);
    let source_path = problem_dir.join(&source_name);
    let source = tokio::fs::read(&source_path)
        .await
        .with_context(|| format!("failed to read interactor source {}", source_path.display()))?;

    let mut unit = CompiledUnit::create(lang, problem.clone(), &source_name, &source).await?;
    let outcome = unit
        .compile()
        .await
        .with_context(|| format!("failed to compile interactor {}", source_name))?;
    if !outcome.stderr.is_empty() {
        warn!("interactor compiler diagnostics:\n{}", outcome.stderr.trim_end());
    }
    Ok(unit)
}

/// Judge one submission against every test case of a problem directory.
///
/// Setup failures (missing metadata or test assets, unknown language or
/// validator, compile errors) abort the run; per-case verdicts never do.
/// Test cases are judged strictly sequentially in sorted order.
pub async fn judge_problem(
    registry: &LanguageRegistry,
    problem_dir: &Path,
    source_path: &Path,
    opts: &SessionOptions,
) -> Result<(Vec<CaseResult>, Report)> {
    let info_path = problem_dir.join(INFO_FILE);
    let info_content = tokio::fs::read_to_string(&info_path)
        .await
        .with_context(|| format!("failed to read problem info {}", info_path.display()))?;
    let problem = Arc::new(ProblemInfo::parse(&info_content)?);

    let lang = match &opts.language {
        Some(key) => registry
            .get(key)
            .ok_or_else(|| EngineError::UnknownLanguage(key.clone()))?,
        None => registry
            .for_source(source_path)
            .ok_or_else(|| {
                EngineError::UnknownLanguage(source_path.to_string_lossy().into_owned())
            })?,
    };
    let validator = validator_for(&opts.validator)?;

    let cases = list_cases(problem_dir).await?;

    let source = tokio::fs::read(source_path)
        .await
        .with_context(|| format!("failed to read source file {}", source_path.display()))?;
    let source_name = source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("invalid source path {}", source_path.display()))?;

    let mut unit = CompiledUnit::create(lang.clone(), problem.clone(), &source_name, &source).await?;
    let outcome = unit.compile().await?;
    if !outcome.stderr.is_empty() {
        warn!("compiler diagnostics:\n{}", outcome.stderr.trim_end());
    }
    info!(
        language = %lang.display_name,
        compile_ms = outcome.duration.as_millis() as u64,
        "compiled {}",
        source_name
    );

    let report = Report {
        problem_name: problem.name.clone(),
        judged_at: Local::now(),
        language: lang.display_name.clone(),
        compile_time: outcome.duration,
        source_len: source.len(),
        judge_type: problem.judge_type,
    };

    let interactor = match Wiring::for_judge_type(problem.judge_type) {
        Some(_) => Some(prepare_interactor(registry, problem_dir, &problem).await?),
        None => None,
    };

    let mut results = Vec::with_capacity(cases.len());
    for case in &cases {
        let verdict = match Wiring::for_judge_type(problem.judge_type) {
            None => {
                let expected = tokio::fs::read(&case.expected).await.with_context(|| {
                    format!("failed to read expected output {}", case.expected.display())
                })?;
                run_case(&unit, &case.input, &expected, validator.as_ref()).await?
            }
            Some(wiring) => {
                let interactor = interactor
                    .as_ref()
                    .context("interactor unit missing for interactive problem")?;
                run_reactive(&unit, interactor, wiring, &case.input, &case.expected).await?
            }
        };
        info!(case = %case.name, verdict = %verdict.tag(), "judged");
        results.push(CaseResult {
            name: case.name.clone(),
            verdict,
        });
    }

    Ok((results, report))
}
