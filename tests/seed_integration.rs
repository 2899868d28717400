//! Integration tests for the seed plan against a mock backend.

use pbseed_core::api::{ApiClient, ReadinessPolicy};
use pbseed_core::auth::export_auth_cookie;
use pbseed_core::config::SuperuserCredentials;
use pbseed_core::seed::{FIXTURES, SeedError, run_seed};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const TOKEN: &str = "tok_seed_test";

fn credentials() -> SuperuserCredentials {
    SuperuserCredentials::new("admin@example.com", "secret123456")
}

fn policy() -> ReadinessPolicy {
    ReadinessPolicy::with_max_attempts(3)
}

fn superuser_record_json() -> serde_json::Value {
    json!({
        "id": "su_1",
        "collectionId": "pbc_superusers",
        "collectionName": "_superusers",
        "email": "admin@example.com",
        "verified": true
    })
}

fn post_json(slug: &str) -> serde_json::Value {
    json!({
        "id": format!("rec_{slug}"),
        "slug": slug,
        "title": "t",
        "body": "b",
        "published": true
    })
}

/// Echoes the created record back with a generated id, the way the backend
/// answers a create request.
struct EchoCreatedRecord;

impl Respond for EchoCreatedRecord {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut body: serde_json::Value =
            serde_json::from_slice(&request.body).expect("create body must be JSON");
        let slug = body["slug"].as_str().unwrap_or("unknown").to_string();
        body["id"] = json!(format!("rec_{slug}"));
        ResponseTemplate::new(200).set_body_json(body)
    }
}

async fn mount_health_ok(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": 200, "message": "API is healthy." })),
        )
        .mount(mock_server)
        .await;
}

async fn mount_password_auth(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/collections/_superusers/records/auth-with-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": TOKEN,
            "record": superuser_record_json()
        })))
        .mount(mock_server)
        .await;
}

async fn mount_full_list(mock_server: &MockServer, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/api/collections/posts/records"))
        .and(query_param("perPage", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": items,
            "page": 1,
            "perPage": 200
        })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_fresh_seed_creates_collection_and_all_fixtures() {
    let mock_server = MockServer::start().await;
    mount_health_ok(&mock_server).await;
    mount_password_auth(&mock_server).await;

    // The demo collection does not exist yet.
    Mock::given(method("GET"))
        .and(path("/api/collections/posts"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "status": 404, "message": "Missing collection context." })),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pbc_posts",
            "name": "posts",
            "type": "base"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Every natural-key lookup comes back empty.
    Mock::given(method("GET"))
        .and(path("/api/collections/posts/records"))
        .and(query_param("perPage", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [],
            "page": 1,
            "perPage": 1
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/collections/posts/records"))
        .respond_with(EchoCreatedRecord)
        .expect(FIXTURES.len() as u64)
        .mount(&mock_server)
        .await;

    mount_full_list(
        &mock_server,
        FIXTURES.iter().map(|fixture| post_json(fixture.slug)).collect(),
    )
    .await;

    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let outcome = run_seed(&client, Some(&credentials()), None, &policy())
        .await
        .unwrap();

    assert_eq!(outcome.created, FIXTURES.len());
    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.verified, FIXTURES.len());
}

#[tokio::test]
async fn test_seed_rerun_creates_nothing() {
    let mock_server = MockServer::start().await;
    mount_health_ok(&mock_server).await;
    mount_password_auth(&mock_server).await;

    // Collection and records already exist.
    Mock::given(method("GET"))
        .and(path("/api/collections/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pbc_posts",
            "name": "posts",
            "type": "base"
        })))
        .mount(&mock_server)
        .await;

    for fixture in FIXTURES {
        Mock::given(method("GET"))
            .and(path("/api/collections/posts/records"))
            .and(query_param("perPage", "1"))
            .and(query_param("filter", fixture.filter()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [post_json(fixture.slug)],
                "page": 1,
                "perPage": 1
            })))
            .mount(&mock_server)
            .await;
    }

    // No create call may happen on a re-run.
    Mock::given(method("POST"))
        .and(path("/api/collections/posts/records"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    mount_full_list(
        &mock_server,
        FIXTURES.iter().map(|fixture| post_json(fixture.slug)).collect(),
    )
    .await;

    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let outcome = run_seed(&client, Some(&credentials()), None, &policy())
        .await
        .unwrap();

    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.skipped, FIXTURES.len());
    assert_eq!(outcome.verified, FIXTURES.len());
}

#[tokio::test]
async fn test_seed_fails_validation_when_a_record_is_missing() {
    let mock_server = MockServer::start().await;
    mount_health_ok(&mock_server).await;
    mount_password_auth(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/collections/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pbc_posts",
            "name": "posts",
            "type": "base"
        })))
        .mount(&mock_server)
        .await;

    for fixture in FIXTURES {
        Mock::given(method("GET"))
            .and(path("/api/collections/posts/records"))
            .and(query_param("perPage", "1"))
            .and(query_param("filter", fixture.filter()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [post_json(fixture.slug)],
                "page": 1,
                "perPage": 1
            })))
            .mount(&mock_server)
            .await;
    }

    // Read-back is missing the first fixture.
    mount_full_list(
        &mock_server,
        FIXTURES
            .iter()
            .skip(1)
            .map(|fixture| post_json(fixture.slug))
            .collect(),
    )
    .await;

    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let result = run_seed(&client, Some(&credentials()), None, &policy()).await;

    match result {
        Err(SeedError::Validation { reason }) => {
            assert!(reason.contains(FIXTURES[0].slug), "reason: {reason}");
        }
        other => panic!("expected validation failure, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_seed_without_credentials_fails_before_any_write() {
    let mock_server = MockServer::start().await;
    mount_health_ok(&mock_server).await;

    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let result = run_seed(&client, None, None, &policy()).await;
    assert!(matches!(result, Err(SeedError::MissingCredentials)));
}

#[tokio::test]
async fn test_seed_resumes_from_valid_auth_cookie() {
    let mock_server = MockServer::start().await;
    mount_health_ok(&mock_server).await;

    // Cookie resume hydrates the superuser record by id; password auth must
    // never be called.
    Mock::given(method("POST"))
        .and(path("/api/collections/_superusers/records/auth-with-password"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/collections/_superusers/records/su_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(superuser_record_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/collections/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pbc_posts",
            "name": "posts",
            "type": "base"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/collections/posts/records"))
        .and(query_param("perPage", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [post_json("any")],
            "page": 1,
            "perPage": 1
        })))
        .mount(&mock_server)
        .await;

    mount_full_list(
        &mock_server,
        FIXTURES.iter().map(|fixture| post_json(fixture.slug)).collect(),
    )
    .await;

    let cookie = export_auth_cookie(TOKEN, "su_1");
    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let outcome = run_seed(&client, None, Some(&cookie), &policy())
        .await
        .unwrap();

    assert_eq!(outcome.skipped, FIXTURES.len());
    assert_eq!(client.auth_token().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn test_seed_falls_back_to_password_on_stale_cookie() {
    let mock_server = MockServer::start().await;
    mount_health_ok(&mock_server).await;

    // The cookie's record id is gone; the backend answers 404.
    Mock::given(method("GET"))
        .and(path("/api/collections/_superusers/records/su_gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "status": 404, "message": "Not found." })),
        )
        .mount(&mock_server)
        .await;

    mount_password_auth(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/collections/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pbc_posts",
            "name": "posts",
            "type": "base"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/collections/posts/records"))
        .and(query_param("perPage", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [post_json("any")],
            "page": 1,
            "perPage": 1
        })))
        .mount(&mock_server)
        .await;

    mount_full_list(
        &mock_server,
        FIXTURES.iter().map(|fixture| post_json(fixture.slug)).collect(),
    )
    .await;

    let cookie = export_auth_cookie("tok_stale", "su_gone");
    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let outcome = run_seed(&client, Some(&credentials()), Some(&cookie), &policy())
        .await
        .unwrap();

    assert_eq!(outcome.skipped, FIXTURES.len());
    // The stale cookie token was discarded in favor of the password auth token.
    assert_eq!(client.auth_token().as_deref(), Some(TOKEN));
}
