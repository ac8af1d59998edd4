//! The facade crate wired end to end against one mock project.

use std::time::Duration;

use serde_json::json;
use supabase_lite::prelude::*;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SupabaseClient {
    SupabaseClient::new(
        SupabaseConfig::new(server.uri(), "anon-key")
            .max_retries(2)
            .retry_interval_ms(10)
            .timeout(Duration::from_secs(5)),
    )
    .unwrap()
}

#[tokio::test]
async fn query_auth_and_storage_share_one_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/todos"))
        .and(query_param("done", "eq.false"))
        .and(header("apikey", "anon-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-1/2")
                .set_body_json(json!([{"id": 1, "title": "write"}, {"id": 2, "title": "ship"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_json(json!({"email": "ada@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-jwt",
            "refresh_token": "refresh",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": {"id": "u1", "email": "ada@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/object/avatars/u1.png"))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47]))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);

    let query = client.from("todos").select("id,title").eq("done", false);
    let todos = client.postgrest().execute(query).await.unwrap();
    assert_eq!(todos.count(), Some(2));
    assert_eq!(todos.rows().len(), 2);
    assert_eq!(
        todos.first().and_then(|r| r.get("title")).and_then(|t| t.as_str()),
        Some("write")
    );

    let session = client
        .auth()
        .sign_in_with_password("ada@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(session.user.id, "u1");

    let user_client = client.with_access_token(session.access_token.clone());
    let bytes = user_client
        .storage()
        .from("avatars")
        .download("u1.png")
        .await
        .unwrap();
    assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
}

#[tokio::test]
async fn service_errors_convert_into_supabase_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_code": "invalid_credentials",
            "msg": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/storage/v1/object/avatars/missing.png"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);

    let err: SupabaseError = client
        .auth()
        .sign_in_with_password("ada@example.com", "wrong")
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, SupabaseError::Auth(ref m) if m.contains("Invalid login credentials")));

    let err: SupabaseError = client
        .storage()
        .from("avatars")
        .download("missing.png")
        .await
        .unwrap_err()
        .into();
    assert!(matches!(
        err,
        SupabaseError::MaxRetriesExceeded {
            attempts: 2,
            last_status: Some(503)
        }
    ));

    let err: SupabaseError = client
        .realtime()
        .unwrap()
        .subscribe("room", |_| {})
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, SupabaseError::Realtime(_)));
}
