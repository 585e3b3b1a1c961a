//! FRED API integration: observations for one series over a date range.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Settings;
use crate::domain::Observation;
use crate::error::{EtlError, UpstreamError};

/// Anything that can produce observations for a series.
///
/// The batch only talks to this trait, so tests can swap the HTTP client for a stub.
pub trait ObservationSource {
    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>, UpstreamError>;
}

pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn new(settings: &Settings) -> Result<Self, EtlError> {
        let client = Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .map_err(|e| EtlError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.fred_base_url.clone(),
        })
    }
}

impl ObservationSource for FredClient {
    /// One GET per call; both bounds are inclusive.
    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>, UpstreamError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();

        // Request errors echo the URL, which carries the API key.
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ])
            .send()
            .map_err(|e| UpstreamError::Transport(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| UpstreamError::Transport(e.without_url()))?;

        let received = body.observations.len();
        let observations = parse_observations(body.observations)?;
        debug!(
            series_id,
            received,
            kept = observations.len(),
            "parsed FRED observations"
        );
        Ok(observations)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    #[serde(default)]
    value: Option<String>,
}

/// Parse provider records, dropping those without a usable value.
fn parse_observations(records: Vec<RawObservation>) -> Result<Vec<Observation>, UpstreamError> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d")
            .map_err(|e| UpstreamError::Payload(format!("Invalid FRED date '{}': {e}", record.date)))?;
        let Some(value) = record.value.as_deref().and_then(parse_value) else {
            continue;
        };
        out.push(Observation::new(date, value));
    }
    Ok(out)
}

/// FRED marks missing values with `"."`; anything non-numeric is treated the same way.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw(date: &str, value: Option<&str>) -> RawObservation {
        RawObservation {
            date: date.to_string(),
            value: value.map(str::to_string),
        }
    }

    /// Mock server hosted on its own runtime; the blocking client runs on the test thread.
    fn start_server(response: ResponseTemplate) -> (tokio::runtime::Runtime, MockServer) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/fred/series/observations"))
                .and(query_param("series_id", "UNRATE"))
                .and(query_param("api_key", "test-key"))
                .and(query_param("file_type", "json"))
                .and(query_param("observation_start", "2024-01-01"))
                .and(query_param("observation_end", "2024-03-31"))
                .respond_with(response)
                .mount(&server)
                .await;
            server
        });
        (runtime, server)
    }

    fn client_for(server: &MockServer) -> FredClient {
        let settings = Settings {
            api_key: "test-key".to_string(),
            database_url: "postgres://unused".to_string(),
            fred_base_url: format!("{}/fred/series/observations", server.uri()),
            http_timeout: Duration::from_secs(5),
        };
        FredClient::new(&settings).unwrap()
    }

    #[test]
    fn parse_value_handles_sentinels() {
        assert_eq!(parse_value("3.7"), Some(3.7));
        assert_eq!(parse_value(" 12 "), Some(12.0));
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("n/a"), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn parse_observations_drops_absent_values() {
        let records = vec![
            raw("2024-01-01", Some("3.7")),
            raw("2024-02-01", Some(".")),
            raw("2024-03-01", None),
            raw("2024-04-01", Some("3.9")),
        ];
        let out = parse_observations(records).unwrap();
        assert_eq!(
            out,
            vec![
                Observation::new(date(2024, 1, 1), 3.7),
                Observation::new(date(2024, 4, 1), 3.9),
            ]
        );
    }

    #[test]
    fn parse_observations_rejects_bad_dates() {
        let err = parse_observations(vec![raw("01/02/2024", Some("1.0"))]).unwrap_err();
        assert!(matches!(err, UpstreamError::Payload(_)));
    }

    #[test]
    fn fetch_sends_range_query_and_parses_body() {
        let body = json!({
            "realtime_start": "2024-06-01",
            "observations": [
                {"realtime_start": "2024-06-01", "date": "2024-01-01", "value": "3.7"},
                {"realtime_start": "2024-06-01", "date": "2024-02-01", "value": "."},
                {"realtime_start": "2024-06-01", "date": "2024-03-01", "value": "3.8"}
            ]
        });
        let (_runtime, server) = start_server(ResponseTemplate::new(200).set_body_json(body));

        let out = client_for(&server)
            .fetch("UNRATE", date(2024, 1, 1), date(2024, 3, 31))
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Observation::new(date(2024, 1, 1), 3.7));
        assert_eq!(out[1], Observation::new(date(2024, 3, 1), 3.8));
    }

    #[test]
    fn fetch_reports_status_and_body_on_failure() {
        let (_runtime, server) = start_server(
            ResponseTemplate::new(400).set_body_string("Bad Request. The value for variable api_key is not registered."),
        );

        let err = client_for(&server)
            .fetch("UNRATE", date(2024, 1, 1), date(2024, 3, 31))
            .unwrap_err();

        match err {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("api_key is not registered"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn fetch_with_empty_observations_is_ok() {
        let (_runtime, server) =
            start_server(ResponseTemplate::new(200).set_body_json(json!({ "observations": [] })));

        let out = client_for(&server)
            .fetch("UNRATE", date(2024, 1, 1), date(2024, 3, 31))
            .unwrap();
        assert!(out.is_empty());
    }
}
