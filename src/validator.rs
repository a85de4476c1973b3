//! Output validation policies.
//!
//! A [`Validator`] decides whether a program's captured stdout matches the
//! expected output. Two policies exist: exact line-by-line comparison and
//! whitespace-token numeric comparison with optional rounding. New
//! policies plug in by implementing the trait.

use crate::error::EngineError;

/// Comparison policy for actual vs expected output.
///
/// The comparison is order-preserving: `validate(a, b)` is not required
/// to equal `validate(b, a)`.
pub trait Validator: Send + Sync {
    fn validate(&self, actual: &[u8], expected: &[u8]) -> bool;
}

/// Exact line-by-line comparison.
///
/// Both byte streams are split on `\n`; they match iff every
/// corresponding line is byte-identical and both end at the same point.
/// Splitting absorbs a single final trailing newline, so "foo\n" matches
/// "foo". No decoding happens, so non-UTF-8 output is compared as-is.
#[derive(Debug, Default)]
pub struct ExactValidator;

/// Split a byte stream into lines, absorbing one final trailing newline.
fn split_lines(stream: &[u8]) -> Vec<&[u8]> {
    if stream.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<&[u8]> = stream.split(|&b| b == b'\n').collect();
    if stream.ends_with(b"\n") {
        lines.pop();
    }
    lines
}

impl Validator for ExactValidator {
    fn validate(&self, actual: &[u8], expected: &[u8]) -> bool {
        split_lines(actual) == split_lines(expected)
    }
}

/// Maximum number of decimal places [`FloatValidator`] accepts.
pub const MAX_FLOAT_PLACES: u32 = 15;

/// Whitespace-token numeric comparison.
///
/// Both streams are split into whitespace-delimited tokens; each pair is
/// parsed as f64 and compared after rounding both sides to `places`
/// decimal digits (half away from zero). `places == 0` compares the
/// parsed values without rounding. Token counts must match and any parse
/// failure is a mismatch.
#[derive(Debug)]
pub struct FloatValidator {
    places: u32,
}

impl FloatValidator {
    pub fn new(places: u32) -> Result<Self, EngineError> {
        if places > MAX_FLOAT_PLACES {
            return Err(EngineError::UnknownValidator(format!("float{}", places)));
        }
        Ok(Self { places })
    }

    pub fn places(&self) -> u32 {
        self.places
    }

    fn round(&self, value: f64) -> f64 {
        if self.places == 0 {
            return value;
        }
        let scale = 10f64.powi(self.places as i32);
        (value * scale).round() / scale
    }
}

impl Validator for FloatValidator {
    fn validate(&self, actual: &[u8], expected: &[u8]) -> bool {
        let actual = String::from_utf8_lossy(actual);
        let expected = String::from_utf8_lossy(expected);
        let mut a = actual.split_whitespace();
        let mut e = expected.split_whitespace();
        loop {
            match (a.next(), e.next()) {
                (Some(x), Some(y)) => {
                    let (x, y) = match (x.parse::<f64>(), y.parse::<f64>()) {
                        (Ok(x), Ok(y)) => (x, y),
                        _ => return false,
                    };
                    if self.round(x) != self.round(y) {
                        return false;
                    }
                }
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

/// Resolve a validator by key: "diff" (exact), "float" (numeric, no
/// rounding) or "floatN" (numeric, N decimal places, N in 0..=15).
pub fn validator_for(key: &str) -> Result<Box<dyn Validator>, EngineError> {
    match key {
        "diff" => Ok(Box::new(ExactValidator)),
        "float" => Ok(Box::new(FloatValidator::new(0)?)),
        _ => {
            if let Some(digits) = key.strip_prefix("float") {
                let places: u32 = digits
                    .parse()
                    .map_err(|_| EngineError::UnknownValidator(key.to_string()))?;
                return Ok(Box::new(FloatValidator::new(places)?));
            }
            Err(EngineError::UnknownValidator(key.to_string()))
        }
    }
}
