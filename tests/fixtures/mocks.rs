//! Mock collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use glosa_core::error::SourceError;
use glosa_core::phase::{PhaseObservation, SignalState};
use glosa_core::traits::PhaseDataSource;

/// Fixed evaluation time for deterministic phase selection.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

/// Observation `secs` seconds after [`now`].
pub fn obs(secs: i64, state: SignalState) -> PhaseObservation {
    PhaseObservation::new(now() + Duration::seconds(secs), state)
}

/// Phase data keyed by data stream (observations) and light id (predictions).
#[derive(Default)]
pub struct MockPhases {
    pub observations: HashMap<String, Vec<PhaseObservation>>,
    pub predictions: HashMap<String, Vec<PhaseObservation>>,
    pub unavailable: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockPhases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observed(mut self, datastream_id: &str, observations: Vec<PhaseObservation>) -> Self {
        self.observations.insert(datastream_id.to_string(), observations);
        self
    }

    pub fn predicted(mut self, light_id: &str, predictions: Vec<PhaseObservation>) -> Self {
        self.predictions.insert(light_id.to_string(), predictions);
        self
    }

    pub fn offline() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PhaseDataSource for MockPhases {
    fn observations(&self, datastream_id: &str) -> Result<Vec<PhaseObservation>, SourceError> {
        self.calls.lock().unwrap().push(format!("observations:{}", datastream_id));
        if self.unavailable {
            return Err(SourceError::Unavailable("tld proxy offline".to_string()));
        }
        Ok(self.observations.get(datastream_id).cloned().unwrap_or_default())
    }

    fn prediction(
        &self,
        light_id: &str,
        recent: &[PhaseObservation],
    ) -> Result<Vec<PhaseObservation>, SourceError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("prediction:{}:{}", light_id, recent.len()));
        Ok(self.predictions.get(light_id).cloned().unwrap_or_default())
    }
}
