//! End-to-end run against a recorded Synoptic response for KLNK on 2023-01-10.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use weather_digest_core::{
    Config, DailyDigestJob, Dispatcher, JobOutcome, Messenger, SendError, WeatherProvider,
    aggregate::aggregate, format::format_message, provider::SynopticProvider,
};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/klnk_2023-01-10.json");

#[derive(Debug, Clone, Default)]
struct Outbox {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail_second: bool,
}

#[async_trait]
impl Messenger for Outbox {
    async fn send_message(&self, to: &str, body: &str) -> Result<(), SendError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), body.to_string()));

        if self.fail_second && sent.len() == 2 {
            return Err(SendError::Rejected {
                status: reqwest::StatusCode::BAD_REQUEST,
                message: "invalid number".into(),
            });
        }
        Ok(())
    }
}

fn reference() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2023-01-11T12:00:00Z").unwrap().with_timezone(&Utc)
}

async fn synoptic_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("stid", "klnk"))
        .and(query_param("start", "202301100600"))
        .and(query_param("end", "202301110559"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
        .mount(&server)
        .await;

    server
}

fn config_for(server: &MockServer, recipients: &[&str]) -> Config {
    let mut cfg = Config::default();
    cfg.synoptic.api_token = Some("fixture-token".into());
    cfg.synoptic.base_url = server.uri();
    cfg.recipients = recipients.iter().map(|r| r.to_string()).collect();
    cfg
}

fn fixture_celsius() -> Vec<f64> {
    let json: serde_json::Value = serde_json::from_str(FIXTURE).unwrap();
    json["STATION"][0]["OBSERVATIONS"]["air_temp_set_1"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[test]
fn fixture_aggregates_to_known_extremes() {
    let celsius = fixture_celsius();
    assert_eq!(celsius.len(), 280);
    assert_eq!(celsius[0], -3.0);

    let stats = aggregate(&celsius).unwrap();
    assert_eq!(stats.low, 23.0);
    assert!((stats.high - 55.4).abs() < 1e-9);
    assert!(stats.low < stats.average && stats.average < stats.high);
}

#[tokio::test]
async fn provider_summarises_fixture_day() {
    let server = synoptic_server().await;
    let provider = SynopticProvider::new(&config_for(&server, &[])).unwrap();

    let summary = provider.previous_day_weather(reference()).await.unwrap();

    assert_eq!(summary.date.to_string(), "2023-01-10");
    assert_eq!(summary.low, 23.0);
    assert!((summary.high - 55.4).abs() < 1e-9);
    assert!(summary.low < summary.average && summary.average < summary.high);

    let message = format_message(&summary);
    assert!(message.contains("Weather for Jan 10 2023:"));
    assert!(message.contains("High: 56°"));
    assert!(message.contains("Low: 23°"));
    assert!(message.contains("Avg: 37°"));
}

#[tokio::test]
async fn full_run_keeps_going_after_a_failed_send() {
    let server = synoptic_server().await;
    let cfg = config_for(&server, &["4025551234", "4025555678"]);

    let outbox = Outbox { fail_second: true, ..Outbox::default() };
    let job = DailyDigestJob::new(
        Box::new(SynopticProvider::new(&cfg).unwrap()),
        Dispatcher::new(Box::new(outbox.clone()), cfg.country_code.clone()),
        cfg.recipients.clone(),
    );

    let outcome = job.run(reference(), &CancellationToken::new()).await.unwrap();

    let sent = outbox.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "+14025551234");
    assert_eq!(sent[1].0, "+14025555678");

    match outcome {
        JobOutcome::Dispatched { report, message, .. } => {
            assert_eq!(report.succeeded(), 1);
            assert_eq!(report.failed(), 1);
            assert_eq!(sent[0].1, message);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn dry_run_from_config_needs_no_twilio() {
    let server = synoptic_server().await;
    let cfg = config_for(&server, &["4025551234"]);

    let job = DailyDigestJob::from_config(&cfg, true).unwrap();
    let outcome = job.run(reference(), &CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, JobOutcome::Dispatched { ref report, .. } if report.all_delivered()));
}
