//! Per-testcase verdicts.

use std::fmt;

/// Classification of a submission's behavior on one test case.
///
/// Elapsed wall-clock time is carried only where it is reported:
/// accepted and wrong-answer runs. Timeouts and crashes do not report a
/// time, and a compile error precedes any run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { elapsed_ms: u64 },
    WrongAnswer { elapsed_ms: u64 },
    TimeLimitExceeded,
    RuntimeError,
    CompileError,
}

impl Verdict {
    /// Short judge tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Verdict::Accepted { .. } => "AC",
            Verdict::WrongAnswer { .. } => "WA",
            Verdict::TimeLimitExceeded => "TLE",
            Verdict::RuntimeError => "RE",
            Verdict::CompileError => "CE",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted { elapsed_ms } | Verdict::WrongAnswer { elapsed_ms } => {
                write!(f, "{}: {} ms", self.tag(), elapsed_ms)
            }
            _ => write!(f, "{}", self.tag()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(Verdict::Accepted { elapsed_ms: 1 }.tag(), "AC");
        assert_eq!(Verdict::WrongAnswer { elapsed_ms: 1 }.tag(), "WA");
        assert_eq!(Verdict::TimeLimitExceeded.tag(), "TLE");
        assert_eq!(Verdict::RuntimeError.tag(), "RE");
        assert_eq!(Verdict::CompileError.tag(), "CE");
    }

    #[test]
    fn test_display_reports_time_only_for_ac_and_wa() {
        assert_eq!(Verdict::Accepted { elapsed_ms: 12 }.to_string(), "AC: 12 ms");
        assert_eq!(
            Verdict::WrongAnswer { elapsed_ms: 340 }.to_string(),
            "WA: 340 ms"
        );
        assert_eq!(Verdict::TimeLimitExceeded.to_string(), "TLE");
        assert_eq!(Verdict::RuntimeError.to_string(), "RE");
    }

    #[test]
    fn test_is_accepted() {
        assert!(Verdict::Accepted { elapsed_ms: 0 }.is_accepted());
        assert!(!Verdict::TimeLimitExceeded.is_accepted());
    }
}
