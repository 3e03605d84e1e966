#![allow(clippy::unwrap_used)]
// Integration tests for `GraphqlClient` using wiremock.

use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flarestat_api::{DashboardVariables, Error, GraphqlClient, RollingVariables, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GraphqlClient) {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}/client/v4/graphql", server.uri())).unwrap();
    let token = SecretString::from("test-token".to_string());
    let client = GraphqlClient::from_token(
        endpoint,
        &token,
        &TransportConfig::with_timeout(Duration::from_secs(2)),
    )
    .unwrap();
    (server, client)
}

fn rolling_vars() -> RollingVariables {
    let start = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
    RollingVariables {
        zone_tag: "zone-abc".into(),
        month_start: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
        today_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        today_start: start,
        today_end: start + chrono::Duration::days(1),
        week_start: start - chrono::Duration::days(6),
        month_start_dt: start - chrono::Duration::days(29),
    }
}

const GRAPHQL_PATH: &str = "/client/v4/graphql";

// ── Request shape ───────────────────────────────────────────────────

#[tokio::test]
async fn test_rolling_query_sends_bearer_and_variables() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "variables": {
                "zoneTag": "zone-abc",
                "monthStart": "2024-05-17",
                "todayDate": "2024-06-15",
                "weekStart": "2024-06-09T00:00:00Z",
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "viewer": { "zones": [{ "httpRequests1dGroups": [] }] } },
            "errors": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.rolling_analytics(&rolling_vars()).await.unwrap();

    assert!(!resp.has_errors());
    assert!(resp.first_zone().unwrap().get("httpRequests1dGroups").is_some());
}

#[tokio::test]
async fn test_dashboard_query_posts_top_limit() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_partial_json(json!({ "variables": { "topLimit": 5 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "viewer": { "zones": [{}] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
    let vars = DashboardVariables {
        zone_tag: "zone-abc".into(),
        today_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        today_start: start,
        today_end: start + chrono::Duration::days(1),
        top_limit: 5,
    };
    client.dashboard_totals(&vars).await.unwrap();
}

// ── Envelope handling ───────────────────────────────────────────────

#[tokio::test]
async fn test_errors_with_data_are_returned_together() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "viewer": { "zones": [{ "countryToday": [] }] } },
            "errors": [{
                "message": "zone does not have access to rumPageloadEventsAdaptiveGroups",
                "path": ["viewer", "zones", 0, "webToday"]
            }]
        })))
        .mount(&server)
        .await;

    let resp = client.rolling_analytics(&rolling_vars()).await.unwrap();

    assert!(resp.has_errors());
    assert!(resp.error_summary().contains("webToday"));
    assert!(resp.first_zone().is_some());
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.rolling_analytics(&rolling_vars()).await;
    let err = result.unwrap_err();
    assert!(err.is_auth_failure(), "expected auth failure, got: {err:?}");
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_server_error_is_transient_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client.rolling_analytics(&rolling_vars()).await.unwrap_err();
    assert!(
        matches!(err, Error::Http { status: 502, ref message } if message == "bad gateway"),
        "unexpected error: {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
        .mount(&server)
        .await;

    let err = client.rolling_analytics(&rolling_vars()).await.unwrap_err();
    assert!(matches!(err, Error::RateLimited { retry_after_secs: 17 }));
}

#[tokio::test]
async fn test_non_json_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.rolling_analytics(&rolling_vars()).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&server.uri()).unwrap();
    let token = SecretString::from("t".to_string());
    let client = GraphqlClient::from_token(
        endpoint,
        &token,
        &TransportConfig::with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": null }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.rolling_analytics(&rolling_vars()).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_timeout_reports_configured_seconds() {
    let server = MockServer::start().await;
    let client = GraphqlClient::from_token(
        Url::parse(&server.uri()).unwrap(),
        &SecretString::from("t".to_string()),
        &TransportConfig::with_timeout(Duration::from_secs(1)),
    )
    .unwrap();

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": null }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client.rolling_analytics(&rolling_vars()).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_secs: Some(1) }), "got: {err:?}");
    assert_eq!(err.to_string(), "Request timed out after 1s");
}

#[tokio::test]
async fn test_wrapped_client_timeout_omits_unknown_seconds() {
    let server = MockServer::start().await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let client = GraphqlClient::from_reqwest(Url::parse(&server.uri()).unwrap(), http);

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": null }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.rolling_analytics(&rolling_vars()).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_secs: None }), "got: {err:?}");
    assert_eq!(err.to_string(), "Request timed out");
}
