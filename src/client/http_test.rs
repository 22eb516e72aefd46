// ABOUTME: Tests for DashboardClient against a mockito server.
// ABOUTME: Covers headers, status handling, decoding and deploy pass-through.

use mockito::Matcher;
use serde_json::json;

use super::*;
use crate::app::Version;
use crate::error::FetchError;

#[tokio::test]
async fn test_fetch_app_parses_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_header("accept", "application/json")
        .match_header("cache-control", "no-cache")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"title": "Cloud Run: Managed", "version": "3", "theme": {"font": "Lato"}}"#)
        .create_async()
        .await;

    let client = DashboardClient::new(&ClientConfig::new(server.url())).unwrap();
    let app = client.fetch_app(&format!("{}/", server.url())).await.unwrap();

    mock.assert_async().await;
    assert_eq!(app.title.as_deref(), Some("Cloud Run: Managed"));
    assert_eq!(app.version, Some(Version::from("3")));
    assert!(app.id.is_none());
    assert_eq!(app.extra["theme"]["font"], "Lato");
}

#[tokio::test]
async fn test_fetch_app_status_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(503)
        .create_async()
        .await;

    let client = DashboardClient::new(&ClientConfig::new(server.url())).unwrap();
    let err = client
        .fetch_app(&format!("{}/", server.url()))
        .await
        .unwrap_err();

    match err {
        FetchError::Status { status, reason } => {
            assert_eq!(status, 503);
            assert_eq!(reason, "Service Unavailable");
        }
        other => panic!("Expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_app_invalid_json() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let client = DashboardClient::new(&ClientConfig::new(server.url())).unwrap();
    let err = client
        .fetch_app(&format!("{}/", server.url()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_deploy_posts_payload() {
    let mut server = mockito::Server::new_async().await;
    let payload = json!({"version": "4", "apps": ["run", "gke"]});
    let mock = server
        .mock("POST", "/deploy")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(payload.clone()))
        .with_status(202)
        .with_body(r#"{"build": "b-123"}"#)
        .create_async()
        .await;

    let client = DashboardClient::new(&ClientConfig::new(server.url())).unwrap();
    let response = client.deploy(&payload).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.status().as_u16(), 202);
    assert_eq!(response.text().await.unwrap(), r#"{"build": "b-123"}"#);
}

#[tokio::test]
async fn test_deploy_returns_failure_status_unmodified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/deploy")
        .with_status(500)
        .create_async()
        .await;

    let client = DashboardClient::new(&ClientConfig::new(server.url())).unwrap();
    let response = client.deploy(&json!({})).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
}

#[test]
fn test_deploy_url_trims_slash() {
    let client = DashboardClient::with_client(reqwest::Client::new(), "http://dash.local/");
    assert_eq!(client.deploy_url(), "http://dash.local/deploy");
}

#[test]
fn test_client_config_defaults() {
    let config: ClientConfig = serde_json::from_value(json!({"base_url": "http://x"})).unwrap();
    assert_eq!(config.timeout_secs, 30);
    assert!(config.user_agent.starts_with("frameboard/"));
}
