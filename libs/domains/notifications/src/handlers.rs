use axum::{
    Json, Router,
    extract::{OriginalUri, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{ValidatedJson, ValidationRejection};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

use crate::models::{EmailRequest, EmailResponse, HealthResponse, Link, WelcomeEmailRequest};
use crate::service::NotificationService;

/// OpenAPI documentation for the notifications API
#[derive(OpenApi)]
#[openapi(
    paths(send_custom_email, send_welcome_email, health_check),
    components(schemas(EmailRequest, WelcomeEmailRequest, EmailResponse, HealthResponse, Link)),
    tags(
        (name = "Notification Management", description = "APIs for sending notifications and checking service health")
    )
)]
pub struct ApiDoc;

/// `POST /email`, `POST /welcome`, `GET /health`
pub fn router(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/email", post(send_custom_email))
        .route("/welcome", post(send_welcome_email))
        .route("/health", get(health_check))
        .with_state(service)
}

/// Base path of the router as mounted, derived from the request path.
fn base_path(uri: &OriginalUri) -> &str {
    let path = uri.path().trim_end_matches('/');
    path.rsplit_once('/').map(|(base, _)| base).unwrap_or("")
}

fn rejected(rejection: ValidationRejection) -> (StatusCode, Json<EmailResponse>) {
    let message = rejection.summary();
    info!(reason = %message, "Rejected notification request");
    (
        StatusCode::BAD_REQUEST,
        Json(EmailResponse::new(false, message, None)),
    )
}

/// Send custom email
#[utoipa::path(
    post,
    path = "/email",
    tag = "Notification Management",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Email sent", body = EmailResponse),
        (status = 400, description = "Validation or delivery failure", body = EmailResponse)
    )
)]
async fn send_custom_email(
    State(service): State<Arc<NotificationService>>,
    uri: OriginalUri,
    payload: Result<ValidatedJson<EmailRequest>, ValidationRejection>,
) -> impl IntoResponse {
    let ValidatedJson(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };
    let base = base_path(&uri);

    info!(to = %request.to_email, subject = %request.subject, "Sending custom email");

    match service
        .send_custom_email(&request.to_email, &request.subject, &request.message)
        .await
    {
        Ok(_) => {
            let response = EmailResponse::new(
                true,
                format!("Email sent successfully to: {}", request.to_email),
                Some(request.to_email),
            )
            .with_link("health-check", format!("{base}/health"))
            .with_link("send-welcome-email", format!("{base}/welcome"));
            (StatusCode::OK, Json(response))
        }
        Err(e) => {
            error!(to = %request.to_email, error = %e, "Failed to send email");
            let response = EmailResponse::new(
                false,
                format!("Failed to send email: {}", e.detail()),
                Some(request.to_email),
            )
            .with_link("health-check", format!("{base}/health"));
            (StatusCode::BAD_REQUEST, Json(response))
        }
    }
}

/// Send welcome email
#[utoipa::path(
    post,
    path = "/welcome",
    tag = "Notification Management",
    request_body = WelcomeEmailRequest,
    responses(
        (status = 200, description = "Welcome email sent", body = EmailResponse),
        (status = 400, description = "Validation or delivery failure", body = EmailResponse)
    )
)]
async fn send_welcome_email(
    State(service): State<Arc<NotificationService>>,
    uri: OriginalUri,
    payload: Result<ValidatedJson<WelcomeEmailRequest>, ValidationRejection>,
) -> impl IntoResponse {
    let ValidatedJson(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };
    let base = base_path(&uri);

    info!(to = %request.to_email, "Sending welcome email");

    match service
        .send_user_created_email(&request.to_email, &request.user_name)
        .await
    {
        Ok(_) => {
            let response = EmailResponse::new(
                true,
                format!("Welcome email sent successfully to: {}", request.to_email),
                Some(request.to_email),
            )
            .with_link("health-check", format!("{base}/health"))
            .with_link("send-custom-email", format!("{base}/email"));
            (StatusCode::OK, Json(response))
        }
        Err(e) => {
            error!(to = %request.to_email, error = %e, "Failed to send welcome email");
            let response = EmailResponse::new(
                false,
                format!("Failed to send welcome email: {}", e.detail()),
                Some(request.to_email),
            )
            .with_link("health-check", format!("{base}/health"));
            (StatusCode::BAD_REQUEST, Json(response))
        }
    }
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Notification Management",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
async fn health_check(uri: OriginalUri) -> Json<HealthResponse> {
    let base = base_path(&uri);

    Json(
        HealthResponse::running()
            .with_link("self", format!("{base}/health"))
            .with_link("send-custom-email", format!("{base}/email"))
            .with_link("send-welcome-email", format!("{base}/welcome")),
    )
}
