//! Problem metadata loaded from `info.json`.
//!
//! Field names follow the wire format the testcase fetcher writes
//! (`No`, `Name`, `Level`, `Time`, `Mem`, `JudgeType`, `RLang`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// How a submission is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum JudgeType {
    /// Plain text diff against expected output.
    #[default]
    Normal,
    /// Custom one-way checker (interactor judges, submission listens).
    Special,
    /// Full-duplex interactive checker.
    Reactive,
}

impl JudgeType {
    pub fn label(&self) -> &'static str {
        match self {
            JudgeType::Normal => "normal",
            JudgeType::Special => "special",
            JudgeType::Reactive => "reactive",
        }
    }

    /// Whether judging needs a second, judge-provided interactor unit.
    pub fn is_interactive(&self) -> bool {
        matches!(self, JudgeType::Special | JudgeType::Reactive)
    }
}

impl From<JudgeType> for u8 {
    fn from(value: JudgeType) -> Self {
        match value {
            JudgeType::Normal => 0,
            JudgeType::Special => 1,
            JudgeType::Reactive => 2,
        }
    }
}

impl TryFrom<u8> for JudgeType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(JudgeType::Normal),
            1 => Ok(JudgeType::Special),
            2 => Ok(JudgeType::Reactive),
            other => Err(format!("unknown judge type: {}", other)),
        }
    }
}

/// Immutable problem metadata; owned by the caller and passed by
/// reference into judging operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemInfo {
    #[serde(rename = "No")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Level")]
    pub level: i64,
    /// Wall-clock time limit in seconds.
    #[serde(rename = "Time")]
    pub time_limit_secs: u64,
    /// Recorded but not enforced.
    #[serde(rename = "Mem")]
    pub mem_limit_mb: u64,
    #[serde(rename = "JudgeType", default)]
    pub judge_type: JudgeType,
    /// Interactor language key; required for interactive judge types.
    #[serde(rename = "RLang", default, skip_serializing_if = "Option::is_none")]
    pub reactive_lang: Option<String>,
}

impl ProblemInfo {
    /// Parse and validate an `info.json` document.
    pub fn parse(content: &str) -> Result<Self, EngineError> {
        let info: ProblemInfo = serde_json::from_str(content)
            .map_err(|e| EngineError::InvalidProblem(e.to_string()))?;
        info.validate()?;
        Ok(info)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.time_limit_secs == 0 {
            return Err(EngineError::InvalidProblem(
                "time limit must be positive".to_string(),
            ));
        }
        match (&self.judge_type, &self.reactive_lang) {
            (t, None) if t.is_interactive() => Err(EngineError::InvalidProblem(format!(
                "{} judge requires RLang",
                t.label()
            ))),
            (JudgeType::Normal, Some(_)) => Err(EngineError::InvalidProblem(
                "RLang is only valid for interactive judge types".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_info() -> ProblemInfo {
        ProblemInfo {
            id: "9000".to_string(),
            name: "Hello World!".to_string(),
            level: 1,
            time_limit_secs: 5,
            mem_limit_mb: 256,
            judge_type: JudgeType::Normal,
            reactive_lang: None,
        }
    }

    #[test]
    fn test_parse_wire_format() {
        let json = r#"{"No":"527","Name":"HELLO WORLD","Level":1,"Time":5,"Mem":256}"#;
        let info = ProblemInfo::parse(json).unwrap();
        assert_eq!(info.id, "527");
        assert_eq!(info.judge_type, JudgeType::Normal);
        assert_eq!(info.time_limit(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_reactive() {
        let json =
            r#"{"No":"5","Name":"数当て","Level":2,"Time":3,"Mem":256,"JudgeType":2,"RLang":"cpp"}"#;
        let info = ProblemInfo::parse(json).unwrap();
        assert_eq!(info.judge_type, JudgeType::Reactive);
        assert_eq!(info.reactive_lang.as_deref(), Some("cpp"));
    }

    #[test]
    fn test_zero_time_limit_rejected() {
        let mut info = base_info();
        info.time_limit_secs = 0;
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_interactive_requires_rlang() {
        let mut info = base_info();
        info.judge_type = JudgeType::Reactive;
        assert!(info.validate().is_err());
        info.reactive_lang = Some("cpp".to_string());
        assert!(info.validate().is_ok());
    }

    #[test]
    fn test_rlang_invalid_for_normal() {
        let mut info = base_info();
        info.reactive_lang = Some("cpp".to_string());
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_unknown_judge_type_rejected() {
        let json = r#"{"No":"1","Name":"x","Level":1,"Time":1,"Mem":1,"JudgeType":7}"#;
        assert!(ProblemInfo::parse(json).is_err());
    }

    #[test]
    fn test_judge_type_labels() {
        assert_eq!(JudgeType::Normal.label(), "normal");
        assert_eq!(JudgeType::Special.label(), "special");
        assert_eq!(JudgeType::Reactive.label(), "reactive");
        assert!(JudgeType::Special.is_interactive());
        assert!(!JudgeType::Normal.is_interactive());
    }
}
