//! Engine diagnostic lines and evaluation smoothing.
//!
//! The engine writes one progress line per completed search iteration on
//! its diagnostic stream, for example
//!
//! ```text
//! [iter] depth:12 move:ea v:0.35 time:1.2s nodes:183k tt:31% pv:ea,ai
//! ```
//!
//! Only the `depth:`, `move:` and `v:` tokens are read; their position in
//! the line does not matter and other tokens are ignored.

use derive_getters::Getters;
use derive_more::Display;
use tracing::instrument;

const DEPTH_PREFIX: &str = "depth:";
const MOVE_PREFIX: &str = "move:";
const VALUE_PREFIX: &str = "v:";

/// One progress report from the engine.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct EngineReport {
    /// Search depth reached.
    depth: u32,
    /// Best move found at that depth, in engine notation.
    best_move: String,
    /// Raw evaluation value.
    value: f64,
}

/// Why a diagnostic line could not be read as a report.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ReportError {
    /// A required token is absent.
    #[display("Missing '{}' token", _0)]
    Missing(&'static str),

    /// A token is present but its value does not parse.
    #[display("Invalid value for '{}': {:?}", _0, _1)]
    Invalid(&'static str, String),
}

impl std::error::Error for ReportError {}

impl EngineReport {
    /// Parses one diagnostic line.
    #[instrument(level = "trace")]
    pub fn parse(line: &str) -> Result<Self, ReportError> {
        let mut depth = None;
        let mut best_move = None;
        let mut value = None;

        for token in line.split_whitespace() {
            if let Some(raw) = token.strip_prefix(DEPTH_PREFIX) {
                depth = Some(
                    raw.parse::<u32>()
                        .map_err(|_| ReportError::Invalid(DEPTH_PREFIX, raw.to_string()))?,
                );
            } else if let Some(raw) = token.strip_prefix(MOVE_PREFIX) {
                if raw.is_empty() {
                    return Err(ReportError::Invalid(MOVE_PREFIX, raw.to_string()));
                }
                best_move = Some(raw.to_string());
            } else if let Some(raw) = token.strip_prefix(VALUE_PREFIX) {
                let parsed = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| ReportError::Invalid(VALUE_PREFIX, raw.to_string()))?;
                value = Some(parsed);
            }
        }

        Ok(Self {
            depth: depth.ok_or(ReportError::Missing(DEPTH_PREFIX))?,
            best_move: best_move.ok_or(ReportError::Missing(MOVE_PREFIX))?,
            value: value.ok_or(ReportError::Missing(VALUE_PREFIX))?,
        })
    }
}

/// Running two-point average of clamped engine values.
///
/// The smoothed value is multiplied by the sign of the side to move at the
/// analysed position (+1 for X, -1 for O).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalSmoother {
    clamp: f64,
    sign: f64,
    previous: f64,
}

impl EvalSmoother {
    /// Creates a smoother with no history (previous value 0).
    pub fn new(clamp: f64, sign: f64) -> Self {
        Self {
            clamp,
            sign,
            previous: 0.0,
        }
    }

    /// Feeds one raw value and returns the smoothed, oriented evaluation.
    pub fn push(&mut self, raw: f64) -> f64 {
        let value = raw.clamp(-self.clamp, self.clamp);
        let smoothed = (value + self.previous) / 2.0 * self.sign;
        self.previous = value;
        smoothed
    }

    /// The last clamped value, oriented, with no averaging.
    pub fn settled(&self) -> f64 {
        self.previous * self.sign
    }
}
