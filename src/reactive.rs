//! Dual-process judging: a submission wired to a judge-provided
//! interactor, with the verdict taken from the pair's exit statuses.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use tokio::process::{Child, Command};
use tracing::debug;

use crate::problem::JudgeType;
use crate::unit::CompiledUnit;
use crate::verdict::Verdict;

/// How the two processes' standard streams are connected. The judge
/// sub-type only changes this wiring, not the spawn or wait logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wiring {
    /// Special judge: interactor stdout feeds the submission's stdin;
    /// the submission's stdout is discarded. The interactor learns the
    /// test case from its positional path arguments.
    OneWay,
    /// Reactive judge: submission stdout -> interactor stdin and
    /// interactor stdout -> submission stdin, composed as kernel pipes
    /// with no judge-visible buffer in between.
    FullDuplex,
}

impl Wiring {
    pub fn for_judge_type(judge_type: JudgeType) -> Option<Self> {
        match judge_type {
            JudgeType::Special => Some(Wiring::OneWay),
            JudgeType::Reactive => Some(Wiring::FullDuplex),
            JudgeType::Normal => None,
        }
    }
}

/// Turn the already-spawned interactor's piped handles into the
/// submission's (stdin, stdout) configuration.
fn connect(wiring: Wiring, interactor: &mut Child) -> Result<(Stdio, Stdio)> {
    let interactor_out = interactor
        .stdout
        .take()
        .ok_or_else(|| anyhow!("interactor stdout was not piped"))?;
    let sub_stdin = Stdio::from(
        interactor_out
            .into_owned_fd()
            .context("failed to detach interactor stdout")?,
    );

    let sub_stdout = match wiring {
        Wiring::FullDuplex => {
            let interactor_in = interactor
                .stdin
                .take()
                .ok_or_else(|| anyhow!("interactor stdin was not piped"))?;
            Stdio::from(
                interactor_in
                    .into_owned_fd()
                    .context("failed to detach interactor stdin")?,
            )
        }
        Wiring::OneWay => Stdio::null(),
    };

    Ok((sub_stdin, sub_stdout))
}

/// Judge a submission against an interactor.
///
/// The interactor is launched first, with the absolute paths of the
/// input file, the expected-output file and the submission's artifact
/// appended to its run command. Both processes share the judge's stderr.
/// Completion of the pair is raced against the submission's time limit;
/// on expiry the wait is abandoned and neither process is killed.
///
/// Verdict precedence: TLE, then submission non-zero (RE, the
/// interactor's status is not consulted), then interactor non-zero (WA),
/// else AC. A contestant crash is always reported as RE even when the
/// interactor would also have failed.
pub async fn run_reactive(
    submission: &CompiledUnit,
    interactor: &CompiledUnit,
    wiring: Wiring,
    input_path: &Path,
    expected_path: &Path,
) -> Result<Verdict> {
    let input_abs = std::fs::canonicalize(input_path)
        .with_context(|| format!("failed to resolve test input {}", input_path.display()))?;
    let expected_abs = std::fs::canonicalize(expected_path)
        .with_context(|| format!("failed to resolve expected output {}", expected_path.display()))?;

    let extra = vec![
        input_abs.display().to_string(),
        expected_abs.display().to_string(),
        submission.artifact_path().display().to_string(),
    ];
    let interactor_argv = interactor.run_command_with_args(&extra)?;
    let submission_argv = submission.run_command()?;
    debug!(interactor = ?interactor_argv, submission = ?submission_argv, ?wiring,
        "starting reactive judge");

    let started = Instant::now();

    let mut interactor_cmd = Command::new(&interactor_argv[0]);
    interactor_cmd
        .args(&interactor_argv[1..])
        .current_dir(interactor.dir())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    match wiring {
        Wiring::FullDuplex => interactor_cmd.stdin(Stdio::piped()),
        Wiring::OneWay => interactor_cmd.stdin(Stdio::null()),
    };
    let mut interactor_child = interactor_cmd
        .spawn()
        .with_context(|| format!("failed to spawn interactor {:?}", interactor_argv[0]))?;

    let (sub_stdin, sub_stdout) = connect(wiring, &mut interactor_child)?;
    let mut submission_child = Command::new(&submission_argv[0])
        .args(&submission_argv[1..])
        .current_dir(submission.dir())
        .stdin(sub_stdin)
        .stdout(sub_stdout)
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("failed to spawn submission {:?}", submission_argv[0]))?;

    // Submission first, then interactor; both statuses are in hand
    // before the verdict.
    let wait_pair = async {
        let submission_status = submission_child.wait().await;
        let interactor_status = interactor_child.wait().await;
        (submission_status, interactor_status)
    };

    tokio::select! {
        (submission_status, interactor_status) = wait_pair => {
            let submission_status =
                submission_status.context("failed to wait for submission")?;
            let interactor_status =
                interactor_status.context("failed to wait for interactor")?;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            if !submission_status.success() {
                Ok(Verdict::RuntimeError)
            } else if !interactor_status.success() {
                Ok(Verdict::WrongAnswer { elapsed_ms })
            } else {
                Ok(Verdict::Accepted { elapsed_ms })
            }
        }
        _ = tokio::time::sleep(submission.time_limit()) => {
            debug!("time limit reached, abandoning reactive pair");
            Ok(Verdict::TimeLimitExceeded)
        }
    }
}
