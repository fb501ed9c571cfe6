//! Job submission endpoints.
//!
//! A warmup task needs:
//! - `branch_tag` - the branch tag used to separate runs
//! - `image_tag` - the image tag to warm the environment with
//! - `compose_type` - the docker compose file variant to use
//!
//! A run task needs `branch_tag` and `compose_type` only.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router, middleware};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::auth::require_bearer;
use crate::error::ApiError;
use crate::validate;
use perfq_core::{JobPayload, JobType};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/warmers", post(create_warmer))
        .route("/runners", post(create_runner))
        .layer(middleware::from_fn_with_state(state, require_bearer))
}

#[derive(Debug, Deserialize)]
pub struct CreateWarmerRequest {
    #[serde(default)]
    pub branch_tag: String,
    #[serde(default)]
    pub image_tag: String,
    #[serde(default)]
    pub compose_type: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRunnerRequest {
    #[serde(default)]
    pub branch_tag: String,
    #[serde(default)]
    pub compose_type: String,
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub success: bool,
    pub job_id: Uuid,
}

async fn create_warmer(
    State(state): State<AppState>,
    Json(req): Json<CreateWarmerRequest>,
) -> Result<Json<CreateJobResponse>, ApiError> {
    let mut errors = Vec::new();
    validate::branch_tag(&req.branch_tag, &mut errors);
    validate::image_tag(&req.image_tag, &mut errors);
    validate::compose_type(&req.compose_type, &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let job = JobPayload {
        job_id: Uuid::now_v7(),
        job_type: JobType::Warmup,
        branch_tag: req.branch_tag,
        image_tag: Some(req.image_tag),
        compose_type: req.compose_type,
    };
    submit(&state, job).await
}

async fn create_runner(
    State(state): State<AppState>,
    Json(req): Json<CreateRunnerRequest>,
) -> Result<Json<CreateJobResponse>, ApiError> {
    let mut errors = Vec::new();
    validate::branch_tag(&req.branch_tag, &mut errors);
    validate::compose_type(&req.compose_type, &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let job = JobPayload {
        job_id: Uuid::now_v7(),
        job_type: JobType::Run,
        branch_tag: req.branch_tag,
        image_tag: None,
        compose_type: req.compose_type,
    };
    submit(&state, job).await
}

async fn submit(state: &AppState, job: JobPayload) -> Result<Json<CreateJobResponse>, ApiError> {
    let job_id = job.job_id;
    let weight = state.settings.priority.weight_for(job.job_type);
    let ack = state
        .queue
        .push(weight, job, state.settings.default_expire_seconds)
        .await?;

    info!(key = %ack.key, score = ack.score, job_id = %job_id, "Queued job");

    Ok(Json(CreateJobResponse {
        success: true,
        job_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use perfq_config::QueueSettings;
    use perfq_queue::JobQueue;
    use perfq_store::MemoryStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    const TOKEN: &str = "test-token";

    fn app() -> (axum::Router, Arc<JobQueue>) {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(JobQueue::new(store, 1));
        let state = AppState::new(queue.clone(), QueueSettings::default(), TOKEN.to_string());
        (routes::router(state), queue)
    }

    fn post(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let builder = match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        };
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_create_warmer_queues_job() {
        let (app, queue) = app();

        let response = app
            .oneshot(post(
                "/warmers",
                Some(TOKEN),
                r#"{"branch_tag":"feature-1","image_tag":"abc123","compose_type":"default"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let job = queue.fetch().await.unwrap();
        assert_eq!(job.job_type, JobType::Warmup);
        assert_eq!(job.branch_tag, "feature-1");
        assert_eq!(job.image_tag.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_create_runner_queues_job() {
        let (app, queue) = app();

        let response = app
            .oneshot(post(
                "/runners",
                Some(TOKEN),
                r#"{"branch_tag":"feature-2","compose_type":"default"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let job = queue.fetch().await.unwrap();
        assert_eq!(job.job_type, JobType::Run);
        assert_eq!(job.image_tag, None);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (app, _) = app();

        let response = app
            .oneshot(post(
                "/warmers",
                None,
                r#"{"branch_tag":"x","image_tag":"y","compose_type":"default"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_token_is_unauthorized() {
        let (app, _) = app();

        let response = app
            .oneshot(post(
                "/warmers",
                Some("other-token"),
                r#"{"branch_tag":"x","image_tag":"y","compose_type":"default"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_fields_are_rejected() {
        let (app, queue) = app();

        let response = app
            .oneshot(post(
                "/warmers",
                Some(TOKEN),
                r#"{"branch_tag":"","image_tag":"ok","compose_type":"exotic"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        // Nothing reached the queue.
        assert!(queue.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let (app, _) = app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
