//! HTTP adapter for the traffic-light data services.
//!
//! Observations come from the real-time data proxy, forecasts from the
//! prediction service. Both speak the same JSON shape,
//! `[{"phenomenonTime": "<RFC 3339>", "result": <code>}]`, with the
//! protocol's numeric signal codes.

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SourceError;
use crate::phase::{PhaseObservation, SignalState};
use crate::traits::PhaseDataSource;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TldConfig {
    pub observations_url: String,
    pub prediction_url: String,
    /// Number of recent observations to request.
    pub n_values: usize,
    pub timeout_secs: u64,
}

impl Default for TldConfig {
    fn default() -> Self {
        Self {
            observations_url: "http://localhost:3000".to_string(),
            prediction_url: "http://localhost:5001".to_string(),
            n_values: 16,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TldClient {
    config: TldConfig,
    client: Client,
}

impl TldClient {
    pub fn new(config: TldConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Use a preconfigured HTTP client (proxy, TLS, timeouts).
    pub fn with_client(config: TldConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SourceError> {
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, url = %response.url(), "traffic-light data request failed");
            return Err(SourceError::Unavailable(format!(
                "{} answered {}",
                response.url(),
                status
            )));
        }
        Ok(response.json()?)
    }
}

impl PhaseDataSource for TldClient {
    fn observations(&self, datastream_id: &str) -> Result<Vec<PhaseObservation>, SourceError> {
        let url = format!(
            "{}/tld/{}?nvalues={}",
            self.config.observations_url, datastream_id, self.config.n_values
        );

        let body: Vec<WireObservation> = self.fetch(self.client.get(url))?;
        Ok(body.into_iter().map(PhaseObservation::from).collect())
    }

    fn prediction(
        &self,
        light_id: &str,
        recent: &[PhaseObservation],
    ) -> Result<Vec<PhaseObservation>, SourceError> {
        let url = format!("{}/tlp-prediction/{}", self.config.prediction_url, light_id);
        let payload: Vec<WireObservation> = recent.iter().map(WireObservation::from).collect();

        let body: Vec<WireObservation> = self.fetch(self.client.post(url).json(&payload))?;
        Ok(body.into_iter().map(PhaseObservation::from).collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireObservation {
    phenomenon_time: DateTime<Utc>,
    #[serde(default = "missing_code")]
    result: i64,
}

fn missing_code() -> i64 {
    -1
}

impl From<WireObservation> for PhaseObservation {
    fn from(wire: WireObservation) -> Self {
        PhaseObservation::new(wire.phenomenon_time, state_from_code(wire.result))
    }
}

impl From<&PhaseObservation> for WireObservation {
    fn from(observation: &PhaseObservation) -> Self {
        WireObservation {
            phenomenon_time: observation.time,
            result: state_code(observation.state),
        }
    }
}

// 0=dark, 1=red, 2=amber, 3=green, 4=red-amber, 5=amber-flashing,
// 6=green-flashing, 9=unknown
fn state_from_code(code: i64) -> SignalState {
    match code {
        0 => SignalState::Dark,
        1 => SignalState::Red,
        2 => SignalState::Amber,
        3 => SignalState::Green,
        4 => SignalState::RedAmber,
        5 => SignalState::AmberFlashing,
        6 => SignalState::GreenFlashing,
        9 => SignalState::Unknown,
        other => {
            warn!(code = other, "unexpected signal code");
            SignalState::Unknown
        }
    }
}

fn state_code(state: SignalState) -> i64 {
    match state {
        SignalState::Dark => 0,
        SignalState::Red => 1,
        SignalState::Amber => 2,
        SignalState::Green => 3,
        SignalState::RedAmber => 4,
        SignalState::AmberFlashing => 5,
        SignalState::GreenFlashing => 6,
        SignalState::Unknown => 9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table() {
        for code in [0, 1, 2, 3, 4, 5, 6, 9] {
            assert_eq!(state_code(state_from_code(code)), code);
        }
        assert_eq!(state_from_code(7), SignalState::Unknown);
        assert_eq!(state_from_code(-1), SignalState::Unknown);
    }

    #[test]
    fn test_decode_wire_observations() {
        let json = r#"[
            {"phenomenonTime": "2024-05-01T10:00:00+02:00", "result": 3},
            {"phenomenonTime": "2024-05-01T08:00:05Z", "result": 1},
            {"phenomenonTime": "2024-05-01T08:00:09Z"}
        ]"#;
        let wire: Vec<WireObservation> = serde_json::from_str(json).unwrap();
        let observations: Vec<PhaseObservation> = wire.into_iter().map(PhaseObservation::from).collect();

        assert_eq!(observations[0].state, SignalState::Green);
        assert_eq!(observations[0].time.to_rfc3339(), "2024-05-01T08:00:00+00:00");
        assert_eq!(observations[1].state, SignalState::Red);
        assert_eq!(observations[2].state, SignalState::Unknown);
    }

    #[test]
    fn test_encode_uses_codes() {
        let observation = PhaseObservation::new(
            "2024-05-01T08:00:00Z".parse().unwrap(),
            SignalState::RedAmber,
        );
        let value = serde_json::to_value(WireObservation::from(&observation)).unwrap();
        assert_eq!(value["result"], 4);
        assert!(value["phenomenonTime"].as_str().unwrap().starts_with("2024-05-01T08:00:00"));
    }

    #[test]
    fn test_default_config() {
        let config = TldConfig::default();
        assert_eq!(config.n_values, 16);
        assert_eq!(config.observations_url, "http://localhost:3000");
    }
}
