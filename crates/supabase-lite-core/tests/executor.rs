//! Retrying executor behaviour over real HTTP.

use std::time::Duration;

use reqwest::Method;
use supabase_lite_core::{
    decode_response, HttpExecutor, HttpRequest, RetryPolicy, SupabaseClient, SupabaseConfig,
    SupabaseError,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn executor(max_retries: u32) -> HttpExecutor {
    HttpExecutor::new(RetryPolicy::new(max_retries, 5), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_returns_final_status_without_judging_it() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/thing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .expect(1)
        .mount(&server)
        .await;

    let request = HttpRequest::new(Method::GET, format!("{}/thing", server.uri()));
    let resp = executor(3).execute(&request).await.unwrap();
    assert_eq!(resp.status, 404);
    assert_eq!(resp.text(), "nope");
}

#[tokio::test]
async fn test_retries_each_transient_status() {
    for status in [429u16, 503, 504] {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .expect(2)
            .mount(&server)
            .await;

        let request = HttpRequest::new(Method::GET, server.uri());
        let err = executor(2).execute(&request).await.unwrap_err();
        assert!(matches!(
            err,
            SupabaseError::MaxRetriesExceeded { attempts: 2, last_status: Some(s) } if s == status
        ));
    }
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let request = HttpRequest::new(Method::GET, format!("http://{}/", addr));
    let err = executor(3).execute(&request).await.unwrap_err();
    assert!(matches!(err, SupabaseError::Network(_)));
}

#[tokio::test]
async fn test_per_attempt_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let executor =
        HttpExecutor::new(RetryPolicy::new(3, 5), Duration::from_millis(50)).unwrap();
    let request = HttpRequest::new(Method::GET, server.uri());
    let err = executor.execute(&request).await.unwrap_err();
    match err {
        SupabaseError::Network(e) => assert!(e.is_timeout()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_client_attaches_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/1")
                .set_body_string(r#"[{"id":1}]"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = SupabaseConfig::new(server.uri(), "anon-key").access_token("user-token");
    let client = SupabaseClient::new(config).unwrap();
    let request = client.request(Method::GET, "/rest/v1/users").unwrap();
    let resp = decode_response(client.send(request).await.unwrap()).unwrap();

    assert_eq!(resp.count(), Some(1));
    assert_eq!(resp.rows().len(), 1);
}
