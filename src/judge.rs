//! Single-process judging: run a compiled unit against one test case.

use std::process::Stdio;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::unit::CompiledUnit;
use crate::validator::Validator;
use crate::verdict::Verdict;

/// Execute the unit's run command with the test input on stdin and
/// classify the result against the expected output.
///
/// Completion is raced against the problem's wall-clock time limit.
/// When the deadline fires first the wait is abandoned and the verdict
/// is TLE; the child process is left running, it is not killed.
/// Elapsed time is wall clock from launch, reported for AC and WA only.
pub async fn run_case(
    unit: &CompiledUnit,
    input_path: &Path,
    expected: &[u8],
    validator: &dyn Validator,
) -> Result<Verdict> {
    let argv = unit.run_command()?;
    let input = std::fs::File::open(input_path)
        .with_context(|| format!("failed to open test input {}", input_path.display()))?;
    debug!(command = ?argv, input = %input_path.display(), "judging test case");

    let started = Instant::now();
    let mut child = Command::new(&argv[0])
        .args(&argv[1..])
        .current_dir(unit.dir())
        .stdin(Stdio::from(input))
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("failed to spawn {:?}", argv[0]))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("child stdout was not captured"))?;
    let reader = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await.map(|_| buf)
    });

    tokio::select! {
        status = child.wait() => {
            let status = status.context("failed to wait for child process")?;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            if !status.success() {
                return Ok(Verdict::RuntimeError);
            }
            let actual = reader
                .await
                .context("stdout reader task failed")?
                .context("failed to read child stdout")?;
            if validator.validate(&actual, expected) {
                Ok(Verdict::Accepted { elapsed_ms })
            } else {
                Ok(Verdict::WrongAnswer { elapsed_ms })
            }
        }
        _ = tokio::time::sleep(unit.time_limit()) => {
            debug!("time limit reached, abandoning wait");
            Ok(Verdict::TimeLimitExceeded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::LanguageRegistry;
    use crate::problem::{JudgeType, ProblemInfo};
    use crate::validator::{ExactValidator, FloatValidator};
    use std::sync::Arc;

    async fn sh_unit(script: &str, time_limit_secs: u64) -> CompiledUnit {
        let registry = LanguageRegistry::builtin().unwrap();
        let problem = Arc::new(ProblemInfo {
            id: "1".to_string(),
            name: "test".to_string(),
            level: 1,
            time_limit_secs,
            mem_limit_mb: 256,
            judge_type: JudgeType::Normal,
            reactive_lang: None,
        });
        let mut unit = CompiledUnit::create(
            registry.get("sh").unwrap(),
            problem,
            "main.sh",
            script.as_bytes(),
        )
        .await
        .unwrap();
        unit.compile().await.unwrap();
        unit
    }

    async fn input_file(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("input.txt");
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_echo_stdin_accepted() {
        let unit = sh_unit("cat\n", 2).await;
        let dir = tempfile::tempdir().unwrap();
        let input = input_file(&dir, "42\n").await;
        let verdict = run_case(&unit, &input, b"42\n", &ExactValidator)
            .await
            .unwrap();
        assert!(verdict.is_accepted(), "got {}", verdict);
    }

    #[tokio::test]
    async fn test_wrong_output() {
        let unit = sh_unit("echo 41\n", 2).await;
        let dir = tempfile::tempdir().unwrap();
        let input = input_file(&dir, "").await;
        let verdict = run_case(&unit, &input, b"42\n", &ExactValidator)
            .await
            .unwrap();
        assert!(matches!(verdict, Verdict::WrongAnswer { .. }));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_runtime_error() {
        // RE wins even though empty-vs-empty output would validate.
        let unit = sh_unit("exit 1\n", 2).await;
        let dir = tempfile::tempdir().unwrap();
        let input = input_file(&dir, "").await;
        let verdict = run_case(&unit, &input, b"", &ExactValidator).await.unwrap();
        assert_eq!(verdict, Verdict::RuntimeError);
    }

    #[tokio::test]
    async fn test_deadline_yields_tle() {
        let unit = sh_unit("sleep 3\necho done\n", 1).await;
        let dir = tempfile::tempdir().unwrap();
        let input = input_file(&dir, "").await;
        let verdict = run_case(&unit, &input, b"done\n", &ExactValidator)
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::TimeLimitExceeded);
    }

    #[tokio::test]
    async fn test_float_validator_applies() {
        let unit = sh_unit("echo 1e6\n", 2).await;
        let dir = tempfile::tempdir().unwrap();
        let input = input_file(&dir, "").await;
        let validator = FloatValidator::new(0).unwrap();
        let verdict = run_case(&unit, &input, b"1000000\n", &validator)
            .await
            .unwrap();
        assert!(verdict.is_accepted());
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal() {
        let unit = sh_unit("cat\n", 2).await;
        let missing = Path::new("/nonexistent/input.txt");
        assert!(run_case(&unit, missing, b"", &ExactValidator).await.is_err());
    }
}
