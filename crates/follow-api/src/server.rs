//! Axum server and routes.

use crate::auth::AuthUser;
use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use follow_types::{
    Authenticator, BaseResponse, FansData, FollowCounts, FollowEdge, FollowUserRequest,
    FollowingIds, FollowsData, MutualData, PageRequest, Relationships,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub relationships: Arc<dyn Relationships + Send + Sync>,
    pub authenticator: Arc<dyn Authenticator + Send + Sync>,
}

/// Public request/response surface; every route except `/health` requires a bearer token.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/v1/follow/user",
            post(handle_follow).delete(handle_unfollow),
        )
        .route("/api/v1/follow/my-follows", get(handle_my_follows))
        .route("/api/v1/follow/my-fans", get(handle_my_fans))
        .route("/api/v1/follow/mutual", get(handle_mutual))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Service-to-service surface: counts and bulk id export, no enrichment.
pub fn internal_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/internal/follow/:user_id/counts", get(handle_counts))
        .route(
            "/internal/follow/:user_id/following-ids",
            get(handle_following_ids),
        )
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn page_from_query(q: &HashMap<String, String>) -> PageRequest {
    PageRequest::from_query(
        q.get("limit").map(String::as_str),
        q.get("offset").map(String::as_str),
    )
}

async fn handle_follow(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    body: Result<Json<FollowUserRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<FollowEdge>>, ApiError> {
    let Json(req) =
        body.map_err(|e| ApiError::BadRequest(format!("invalid request body: {}", e.body_text())))?;
    let edge = state
        .relationships
        .follow(&caller, &req.target_user_id)
        .await?;
    Ok(Json(BaseResponse::ok("Followed", edge)))
}

async fn handle_unfollow(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<BaseResponse<()>>, ApiError> {
    let target = q
        .get("targetUserId")
        .ok_or_else(|| ApiError::BadRequest("targetUserId is required".to_string()))?;
    state.relationships.unfollow(&caller, target).await?;
    Ok(Json(BaseResponse {
        code: 200,
        message: "Unfollowed".to_string(),
        data: None,
    }))
}

async fn handle_my_follows(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<BaseResponse<FollowsData>>, ApiError> {
    let page = state
        .relationships
        .list_following(&caller, page_from_query(&q))
        .await?;
    Ok(Json(BaseResponse::ok(
        "Success",
        FollowsData {
            follows: page.items,
            total_count: page.total_count,
        },
    )))
}

async fn handle_my_fans(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<BaseResponse<FansData>>, ApiError> {
    let page = state
        .relationships
        .list_followers(&caller, page_from_query(&q))
        .await?;
    Ok(Json(BaseResponse::ok(
        "Success",
        FansData {
            fans: page.items,
            total_count: page.total_count,
        },
    )))
}

async fn handle_mutual(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<BaseResponse<MutualData>>, ApiError> {
    let page = state
        .relationships
        .list_mutual(&caller, page_from_query(&q))
        .await?;
    Ok(Json(BaseResponse::ok(
        "Success",
        MutualData {
            mutual: page.items,
            total_count: page.total_count,
        },
    )))
}

async fn handle_counts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<BaseResponse<FollowCounts>>, ApiError> {
    let counts = state.relationships.counts(&user_id).await?;
    Ok(Json(BaseResponse::ok("Success", counts)))
}

async fn handle_following_ids(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<BaseResponse<FollowingIds>>, ApiError> {
    let ids = state.relationships.following_ids(&user_id).await?;
    Ok(Json(BaseResponse::ok(
        "Success",
        FollowingIds {
            following_user_ids: ids,
        },
    )))
}

async fn handle_health() -> &'static str {
    "ok"
}
