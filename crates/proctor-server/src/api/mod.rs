//! HTTP API.
//!
//! Every JSON response uses the same envelope:
//! `{"status": "success" | "error", "data"?: ..., "message"?: ...}`.

mod catalog;
mod countdown;
mod enrollments;
mod exams;
mod preferences;
mod recommendations;
mod users;

use std::sync::Arc;

use axum::extract::FromRequest;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use proctor_store::{Database, Exam, User, UserRepository};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::services::users::resolve_user;

/// Published after every successful exam write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamChange {
    pub exam_id: Uuid,
    pub course_id: Uuid,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub config: Arc<ServerConfig>,
    pub exam_changes: broadcast::Sender<ExamChange>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let (exam_changes, _) = broadcast::channel(64);
        Self {
            db: Arc::new(Mutex::new(db)),
            config: Arc::new(config),
            exam_changes,
        }
    }

    /// Refresh callback handed to the scheduling service.
    pub fn exam_refresh(&self) -> impl FnOnce(&Exam) {
        let tx = self.exam_changes.clone();
        move |exam: &Exam| {
            // Err only means nobody is listening right now.
            let _ = tx.send(ExamChange {
                exam_id: exam.id,
                course_id: exam.course_id,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        status: "success",
        data: Some(data),
        message: None,
    })
}

pub fn success_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<Envelope<T>> {
    Json(Envelope {
        status: "success",
        data: Some(data),
        message: Some(message.into()),
    })
}

pub fn success_message(message: impl Into<String>) -> Json<Envelope<()>> {
    Json(Envelope {
        status: "success",
        data: None,
        message: Some(message.into()),
    })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, success(data))
}

// ---------------------------------------------------------------------------
// Extractors and helpers
// ---------------------------------------------------------------------------

/// `axum::Json` whose rejections use the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path ids that do not parse cannot match anything.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{what} not found")))
}

/// Resolve a `:user_id` path segment and check the caller may act on it.
pub fn authorize_user<S: UserRepository>(store: &S, auth: &AuthContext, key: &str) -> Result<User, ApiError> {
    let user = resolve_user(store, key)?;
    auth.ensure_self_or_admin(&user)?;
    Ok(user)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn fallback() -> ApiError {
    ApiError::not_found("Route not found")
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = match config.cors_origin.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Invalid CORS_ORIGIN, allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        // exams
        .route("/exams", get(exams::list).post(exams::create))
        .route("/exams/conflicts", post(exams::preview_conflicts))
        .route("/exams/course/:id", get(exams::list_for_course))
        .route("/exams/user/:user_id", get(exams::list_for_user))
        .route("/exams/user/:user_id/schedule", get(exams::schedule))
        .route("/exams/user/:user_id/calendar.ics", get(exams::calendar))
        .route("/exams/user/:user_id/countdown", get(countdown::stream))
        .route("/exams/:id", get(exams::get).put(exams::update).delete(exams::remove))
        .route("/exams/:id/reschedule", post(exams::reschedule))
        // enrollments
        .route("/enrollments/available-courses", get(enrollments::available_courses))
        .route(
            "/enrollments/user/:user_id",
            get(enrollments::list_for_user).post(enrollments::enroll),
        )
        .route("/enrollments/:id", delete(enrollments::unenroll))
        // recommendations
        .route("/recommendations", post(recommendations::create))
        .route("/recommendations/user/:user_id", get(recommendations::list_for_user))
        .route(
            "/recommendations/user/:user_id/course/:course_id",
            get(recommendations::list_for_user_course),
        )
        .route("/recommendations/generate/:user_id", post(recommendations::generate))
        .route("/recommendations/:id", delete(recommendations::remove))
        .route("/recommendations/:id/complete", patch(recommendations::complete))
        // learning preferences
        .route(
            "/learning-preferences/user/:user_id",
            get(preferences::list_for_user).post(preferences::upsert),
        )
        .route("/learning-preferences/:id", delete(preferences::remove))
        // catalog
        .route("/courses", get(catalog::list_courses).post(catalog::create_course))
        .route("/courses/:id", get(catalog::get_course))
        .route("/rooms", get(catalog::list_rooms).post(catalog::create_room))
        .route("/rooms/:id", get(catalog::get_room))
        .route(
            "/study-resources",
            get(catalog::list_resources).post(catalog::create_resource),
        )
        .route("/study-resources/course/:id", get(catalog::list_resources_for_course))
        .route(
            "/study-resources/:id",
            get(catalog::get_resource)
                .put(catalog::update_resource)
                .delete(catalog::delete_resource),
        )
        // users
        .route("/users", get(users::list))
        .route("/users/me", get(users::me))
        .route("/users/:user_id", get(users::get))
        .route("/users/:user_id/role", patch(users::set_role))
        .fallback(fallback)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_health() {
        let h = Harness::new();
        let (status, body) = h.send("GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_uses_envelope() {
        let h = Harness::new();
        let (status, body) = h.send("GET", "/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"status": "error", "message": "Route not found"}));
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let h = Harness::new();
        let (status, body) = h.send("GET", "/users/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let h = Harness::new();
        let admin = h.admin.clone();
        let (status, bytes) = h
            .send_raw("POST", "/courses", Some(&admin), Some("{not json".into()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_gateway_secret_enforced() {
        let config = crate::config::ServerConfig {
            gateway_secret: Some("s3cret".into()),
            ..Default::default()
        };
        let h = Harness::with_config(config);
        let student = h.student.clone();
        let (status, _) = h.send("GET", "/users/me", Some(&student), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
