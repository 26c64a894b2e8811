mod common;

use axum::http::StatusCode;
use serde_json::json;

use analytics_backend::cache::keys;
use analytics_backend::cache::store::CacheStore;

use common::harness;

#[tokio::test]
async fn register_requires_name_and_owner_email() {
    let h = harness();
    let (status, body) = h
        .post_json("/api/auth/register", None, json!({ "name": "only a name" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name and ownerEmail required");
}

#[tokio::test]
async fn register_issues_id_and_api_key() {
    let h = harness();
    let (app_id, api_key) = h.register("My Web App").await;
    assert!(!app_id.is_empty());
    assert!(!api_key.is_empty());
    assert_ne!(app_id, api_key);
}

#[tokio::test]
async fn api_key_lookup_round_trips_the_issued_key() {
    let h = harness();
    let (app_id, api_key) = h.register("round trip").await;

    // Registration primes the cache, so the first lookup is a cache hit.
    let (status, body) = h
        .get(&format!("/api/auth/api-key?appId={}", app_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKey"], api_key.as_str());
    assert_eq!(body["source"], "redis");

    // Drop the cache entry; the lookup falls through to the identity store
    // and repopulates.
    h.state
        .cache
        .delete(&keys::app_id_key(&app_id))
        .await
        .unwrap();
    let (status, body) = h
        .get(&format!("/api/auth/api-key?appId={}", app_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKey"], api_key.as_str());
    assert_eq!(body["source"], "db");

    let (status, body) = h
        .get(&format!("/api/auth/api-key?appId={}", app_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "redis");
}

#[tokio::test]
async fn api_key_lookup_validates_input_and_unknown_apps() {
    let h = harness();
    let (status, _) = h.get("/api/auth/api-key", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h.get("/api/auth/api-key?appId=no-such-app", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn revoke_requires_an_identifier() {
    let h = harness();
    let (status, body) = h.post_json("/api/auth/revoke", None, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "apiKey or appId required");
}

#[tokio::test]
async fn revoke_works_by_api_key_or_app_id() {
    let h = harness();

    let (_, api_key) = h.register("revoke by key").await;
    let (status, body) = h
        .post_json("/api/auth/revoke", None, json!({ "apiKey": api_key }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apiKey"], api_key.as_str());

    let (app_id, api_key) = h.register("revoke by id").await;
    let (status, body) = h
        .post_json("/api/auth/revoke", None, json!({ "appId": app_id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appId"], app_id.as_str());
    assert_eq!(body["apiKey"], api_key.as_str());
}

#[tokio::test]
async fn revoking_twice_is_a_definitive_no_op() {
    let h = harness();
    let (_, api_key) = h.register("double revoke").await;

    let (status, _) = h
        .post_json("/api/auth/revoke", None, json!({ "apiKey": api_key }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h
        .post_json("/api/auth/revoke", None, json!({ "apiKey": api_key }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn revoke_rejects_mismatched_identifiers() {
    let h = harness();
    let (_, api_key_a) = h.register("app a").await;
    let (app_id_b, _) = h.register("app b").await;

    let (status, _) = h
        .post_json(
            "/api/auth/revoke",
            None,
            json!({ "apiKey": api_key_a, "appId": app_id_b }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn revoked_apps_disappear_from_key_lookup() {
    let h = harness();
    let (app_id, api_key) = h.register("gone after revoke").await;

    h.post_json("/api/auth/revoke", None, json!({ "apiKey": api_key }))
        .await;

    let (status, _) = h
        .get(&format!("/api/auth/api-key?appId={}", app_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
