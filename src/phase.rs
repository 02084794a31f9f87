//! Traffic-light phase timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signal aspect of a traffic light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalState {
    Dark,
    Red,
    Amber,
    Green,
    RedAmber,
    AmberFlashing,
    GreenFlashing,
    Unknown,
}

/// A measured or forecast signal state at a point in time.
///
/// Whether an entry was observed or predicted does not matter once the two
/// lists are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseObservation {
    pub time: DateTime<Utc>,
    pub state: SignalState,
}

impl PhaseObservation {
    pub fn new(time: DateTime<Utc>, state: SignalState) -> Self {
        Self { time, state }
    }
}

/// Phase a speed recommendation can be anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetPhase {
    /// Arrive while the light is still green.
    Green,
    /// Arrive as the red phase ends.
    Red,
}

impl TryFrom<SignalState> for TargetPhase {
    type Error = SignalState;

    fn try_from(state: SignalState) -> Result<Self, Self::Error> {
        match state {
            SignalState::Green => Ok(TargetPhase::Green),
            SignalState::Red => Ok(TargetPhase::Red),
            other => Err(other),
        }
    }
}

impl From<TargetPhase> for SignalState {
    fn from(target: TargetPhase) -> Self {
        match target {
            TargetPhase::Green => SignalState::Green,
            TargetPhase::Red => SignalState::Red,
        }
    }
}

/// Merge observations and predictions into one timeline, newest first.
pub fn merge_timeline(
    observations: Vec<PhaseObservation>,
    predictions: Vec<PhaseObservation>,
) -> Vec<PhaseObservation> {
    let mut timeline = observations;
    timeline.extend(predictions);
    timeline.sort_by(|a, b| b.time.cmp(&a.time));
    timeline
}
