// =============================================================================
// Shared types used across the signal engine
// =============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of the predicted short-horizon move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
        }
    }
}

/// Coarse strength label derived from the count of satisfied secondary
/// criteria.  Ordered so that `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Map a secondary-criteria score (0..=4) onto a tier.
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 3 => Self::High,
            2 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::Low
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// A finished directional call.
///
/// Only ever constructed by the decision engine; absence of a `Signal` is the
/// "no qualifying signal" outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub instrument_id: String,
    pub direction: Direction,
    pub confidence: Confidence,
    pub generated_at: DateTime<Utc>,
    /// Always strictly after `generated_at`.
    pub valid_until: DateTime<Utc>,
    /// Satisfied primary conditions, in evaluation order.
    pub rationale: Vec<String>,
    /// Support/resistance proximity note, if price sits near a level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_note: Option<String>,
}

impl Signal {
    /// Display form of the rationale: conditions joined with `" + "`, the
    /// level note appended after `" | "`.
    pub fn analysis(&self) -> String {
        let mut text = self.rationale.join(" + ");
        if let Some(note) = &self.level_note {
            text.push_str(" | ");
            text.push_str(note);
        }
        text
    }

    /// Seconds the call stays actionable.
    pub fn validity_secs(&self) -> i64 {
        (self.valid_until - self.generated_at).num_seconds()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Up => "UP (BUY)",
            Direction::Down => "DOWN (SELL)",
        };
        writeln!(f, "SIGNAL")?;
        writeln!(f, "Pair:        {}", self.instrument_id)?;
        writeln!(f, "Direction:   {direction}")?;
        writeln!(f, "Valid Until: {}", self.valid_until.format("%H:%M:%S UTC"))?;
        writeln!(f, "Confidence:  {}", self.confidence)?;
        write!(f, "Analysis:    {}", self.analysis())
    }
}
