//! Integration tests: auth, follow/unfollow, listings, mutual, internal routes.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use follow_api::server::{self, AppState};
use follow_core::FollowGraph;
use follow_peers::{MockAuthenticator, MockContent, MockProfiles};
use follow_store::InMemoryEdgeStore;
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;

struct Users {
    alice: String,
    bob: String,
    carol: String,
}

fn users() -> Users {
    Users {
        alice: uuid::Uuid::new_v4().to_string(),
        bob: uuid::Uuid::new_v4().to_string(),
        carol: uuid::Uuid::new_v4().to_string(),
    }
}

fn state_with(u: &Users, auth: MockAuthenticator) -> Arc<AppState> {
    let profiles = MockProfiles::new()
        .with_user(&u.alice, "alice")
        .with_user(&u.bob, "bob")
        .with_user(&u.carol, "carol");
    let content = MockContent::new()
        .with_posts(&u.bob, &["bob's latest", "bob's older"])
        .failing(&u.carol);
    let graph = FollowGraph::new(InMemoryEdgeStore::new(), profiles, content);
    Arc::new(AppState {
        relationships: Arc::new(graph),
        authenticator: Arc::new(auth),
    })
}

fn test_state(u: &Users) -> Arc<AppState> {
    state_with(
        u,
        MockAuthenticator::new()
            .with_token("tok-alice", &u.alice)
            .with_token("tok-bob", &u.bob)
            .with_token("tok-carol", &u.carol),
    )
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    let j = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, j)
}

fn follow_req(token: &str, target: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/follow/user")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "targetUserId": target }).to_string()))
        .unwrap()
}

fn unfollow_req(token: &str, target: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/follow/user?targetUserId={target}"))
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn get_req(token: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn internal_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn follow_count_unfollow_scenario() {
    let u = users();
    let state = test_state(&u);
    let app = server::router(Arc::clone(&state));
    let internal = server::internal_router(state);

    let (status, j) = send(&app, follow_req("tok-alice", &u.bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["code"], 200);
    assert_eq!(j["data"]["followingId"], u.bob.as_str());
    assert_eq!(j["data"]["followerId"], u.alice.as_str());
    assert!(j["data"].get("following_id").is_none());

    let counts = internal_get(&format!("/internal/follow/{}/counts", u.bob));
    let (status, j) = send(&internal, counts).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["data"]["followersCount"], 1);
    assert_eq!(j["data"]["followingCount"], 0);

    let (status, j) = send(&app, follow_req("tok-alice", &u.bob)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(j["code"], 409);

    let (status, _) = send(&app, unfollow_req("tok-alice", &u.bob)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, j) = send(&app, unfollow_req("tok-alice", &u.bob)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(j["message"], "not following this user");
}

#[tokio::test]
async fn validation_errors_are_client_errors() {
    let u = users();
    let app = server::router(test_state(&u));

    let (status, _) = send(&app, follow_req("tok-alice", &u.alice)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, follow_req("tok-alice", "too-short")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/follow/user")
        .header("authorization", "Bearer tok-alice")
        .header("content-type", "application/json")
        .body(Body::from("{\"nope\": 1}"))
        .unwrap();
    let (status, j) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(j["code"], 400);

    let req = Request::builder()
        .method("DELETE")
        .uri("/api/v1/follow/user")
        .header("authorization", "Bearer tok-alice")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn authentication_short_circuits() {
    let u = users();
    let app = server::router(test_state(&u));

    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/follow/my-follows")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/follow/my-follows")
        .header("authorization", "Token tok-alice")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, j) = send(&app, follow_req("forged", &u.bob)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(j["message"], "invalid or expired token");

    let down = server::router(state_with(&u, MockAuthenticator::new().unavailable()));
    let (status, _) = send(&down, follow_req("tok-alice", &u.bob)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let res = app
        .clone()
        .oneshot(internal_get("/health"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn follows_and_fans_are_enriched_newest_first() {
    let u = users();
    let app = server::router(test_state(&u));
    send(&app, follow_req("tok-alice", &u.bob)).await;
    send(&app, follow_req("tok-alice", &u.carol)).await;
    send(&app, follow_req("tok-bob", &u.alice)).await;

    let (status, j) = send(&app, get_req("tok-alice", "/api/v1/follow/my-follows")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["data"]["totalCount"], 2);
    let follows = j["data"]["follows"].as_array().unwrap();
    assert_eq!(follows.len(), 2);
    assert_eq!(follows[0]["targetUser"]["username"], "carol");
    assert!(follows[0]["latestPostContent"].is_null());
    assert_eq!(follows[1]["targetUser"]["username"], "bob");
    assert_eq!(follows[1]["latestPostContent"], "bob's latest");
    assert!(follows[1]["timestamp"].is_string());

    let (status, j) = send(
        &app,
        get_req("tok-alice", "/api/v1/follow/my-follows?limit=1&offset=1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let follows = j["data"]["follows"].as_array().unwrap();
    assert_eq!(follows.len(), 1);
    assert_eq!(follows[0]["targetUser"]["username"], "bob");

    let (status, j) = send(
        &app,
        get_req("tok-alice", "/api/v1/follow/my-fans?limit=abc&offset=-4"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["data"]["totalCount"], 1);
    assert_eq!(j["data"]["fans"][0]["targetUser"]["username"], "bob");
}

#[tokio::test]
async fn mutual_lists_reciprocal_follows_only() {
    let u = users();
    let app = server::router(test_state(&u));
    send(&app, follow_req("tok-alice", &u.bob)).await;
    send(&app, follow_req("tok-bob", &u.alice)).await;
    send(&app, follow_req("tok-alice", &u.carol)).await;

    let (status, j) = send(&app, get_req("tok-alice", "/api/v1/follow/mutual")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["data"]["totalCount"], 1);
    let mutual = j["data"]["mutual"].as_array().unwrap();
    assert_eq!(mutual.len(), 1);
    assert_eq!(mutual[0]["targetUser"]["id"], u.bob.as_str());

    let (_, j) = send(&app, get_req("tok-carol", "/api/v1/follow/mutual")).await;
    assert_eq!(j["data"]["totalCount"], 0);
}

#[tokio::test]
async fn internal_following_ids_export() {
    let u = users();
    let state = test_state(&u);
    let app = server::router(Arc::clone(&state));
    let internal = server::internal_router(state);
    send(&app, follow_req("tok-alice", &u.bob)).await;
    send(&app, follow_req("tok-alice", &u.carol)).await;

    let (status, j) = send(
        &internal,
        internal_get(&format!("/internal/follow/{}/following-ids", u.alice)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let mut ids: Vec<String> = j["data"]["followingUserIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    ids.sort();
    let mut expected = vec![u.bob.clone(), u.carol.clone()];
    expected.sort();
    assert_eq!(ids, expected);

    let (status, _) = send(&internal, internal_get("/internal/follow/bogus/counts")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
