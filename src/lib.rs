//! Local judge execution engine.
//!
//! Compiles a submitted source file for a chosen language, runs it once
//! per test case under a wall-clock deadline, and classifies each run as
//! accepted, wrong answer, timeout, runtime error or compile error.
//! Interactive ("reactive") problems are judged by wiring the submission
//! to a judge-provided interactor process instead of comparing against a
//! static expected-output file.

pub mod error;
pub mod judge;
pub mod languages;
pub mod problem;
pub mod reactive;
pub mod session;
pub mod template;
pub mod unit;
pub mod validator;
pub mod verdict;

pub use error::{EngineError, TemplateError};
pub use judge::run_case;
pub use languages::{LanguageRegistry, LanguageSpec};
pub use problem::{JudgeType, ProblemInfo};
pub use reactive::{run_reactive, Wiring};
pub use session::{judge_problem, CaseResult, Report, SessionOptions};
pub use template::{CommandTemplate, TemplateContext};
pub use unit::{CompileOutcome, CompiledUnit};
pub use validator::{validator_for, ExactValidator, FloatValidator, Validator};
pub use verdict::Verdict;
