use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use domain_notifications::{
    InMemoryTransport, NotificationConfig, NotificationService, composer::WELCOME_SUBJECT, router,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app(transport: &InMemoryTransport) -> Router {
    let config = NotificationConfig::new("no-reply@example.com", "https://site.test");
    let service = NotificationService::new(&config, Arc::new(transport.clone()));
    Router::new().nest("/api/notifications", router(Arc::new(service)))
}

async fn post(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_custom_email_success() {
    let transport = InMemoryTransport::new();
    let (status, body) = post(
        app(&transport),
        "/api/notifications/email",
        json!({"toEmail": "a@b.com", "subject": "Invoice", "message": "Ready"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Email sent successfully to: a@b.com");
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(
        body["_links"]["health-check"]["href"],
        "/api/notifications/health"
    );
    assert_eq!(
        body["_links"]["send-welcome-email"]["href"],
        "/api/notifications/welcome"
    );

    let sent = transport.last().unwrap();
    assert_eq!(sent.to, "a@b.com");
    assert_eq!(sent.subject, "Invoice");
    assert!(sent.body.contains("Ready"));
}

#[tokio::test]
async fn test_custom_email_transport_failure() {
    let transport = InMemoryTransport::failing("SMTP server unavailable");
    let (status, body) = post(
        app(&transport),
        "/api/notifications/email",
        json!({"toEmail": "a@b.com", "subject": "Invoice", "message": "Ready"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Failed to send email: SMTP server unavailable"
    );
    assert_eq!(body["email"], "a@b.com");
    assert!(body["_links"]["health-check"].is_object());
    assert!(body["_links"].get("send-welcome-email").is_none());
}

#[tokio::test]
async fn test_custom_email_validation_failure() {
    let transport = InMemoryTransport::new();
    let (status, body) = post(
        app(&transport),
        "/api/notifications/email",
        json!({"toEmail": "not-an-email", "subject": "Invoice", "message": "Ready"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "toEmail: Email should be valid");
    assert!(body["email"].is_null());
    assert!(body.get("_links").is_none());
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn test_first_field_error_is_reported() {
    let transport = InMemoryTransport::new();
    let (status, body) = post(
        app(&transport),
        "/api/notifications/email",
        json!({"toEmail": "a@b.com", "subject": "", "message": ""}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "message: Message is mandatory");
}

async fn custom_email_message(body: Value) -> (StatusCode, String, usize) {
    let transport = InMemoryTransport::new();
    let (status, body) = post(app(&transport), "/api/notifications/email", body).await;
    let message = body["message"].as_str().unwrap_or_default().to_string();
    (status, message, transport.sent_count())
}

#[tokio::test]
async fn test_blank_recipient_is_mandatory() {
    let (status, message, sent) = custom_email_message(
        json!({"toEmail": "  ", "subject": "Invoice", "message": "Ready"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "toEmail: Email recipient is mandatory");
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn test_missing_recipient_is_mandatory() {
    let (status, message, _) =
        custom_email_message(json!({"subject": "Invoice", "message": "Ready"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "toEmail: Email recipient is mandatory");
}

#[tokio::test]
async fn test_blank_subject_is_mandatory() {
    let (status, message, sent) = custom_email_message(
        json!({"toEmail": "a@b.com", "subject": "", "message": "Ready"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "subject: Subject is mandatory");
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn test_blank_message_is_mandatory() {
    let (status, message, _) = custom_email_message(
        json!({"toEmail": "a@b.com", "subject": "Invoice", "message": "   "}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "message: Message is mandatory");
}

#[tokio::test]
async fn test_subject_length_boundary() {
    let (status, _, sent) = custom_email_message(
        json!({"toEmail": "a@b.com", "subject": "s".repeat(200), "message": "Ready"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent, 1);

    let (status, message, sent) = custom_email_message(
        json!({"toEmail": "a@b.com", "subject": "s".repeat(201), "message": "Ready"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "subject: Subject must be between 1 and 200 characters");
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn test_message_length_boundary() {
    let (status, _, sent) = custom_email_message(
        json!({"toEmail": "a@b.com", "subject": "Invoice", "message": "m".repeat(2000)}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent, 1);

    let (status, message, sent) = custom_email_message(
        json!({"toEmail": "a@b.com", "subject": "Invoice", "message": "m".repeat(2001)}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        message,
        "message: Message must be between 1 and 2000 characters"
    );
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let transport = InMemoryTransport::new();
    let request = Request::post("/api/notifications/email")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(app(&transport), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["email"].is_null());
}

#[tokio::test]
async fn test_welcome_email_success() {
    let transport = InMemoryTransport::new();
    let (status, body) = post(
        app(&transport),
        "/api/notifications/welcome",
        json!({"toEmail": "a@b.com", "userName": "Ann"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome email sent successfully to: a@b.com");
    assert_eq!(
        body["_links"]["send-custom-email"]["href"],
        "/api/notifications/email"
    );

    let sent = transport.last().unwrap();
    assert_eq!(sent.subject, WELCOME_SUBJECT);
    assert!(sent.body.contains("Ann"));
}

#[tokio::test]
async fn test_welcome_email_requires_user_name() {
    let transport = InMemoryTransport::new();
    let (status, body) = post(
        app(&transport),
        "/api/notifications/welcome",
        json!({"toEmail": "a@b.com", "userName": "   "}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "userName: User name is mandatory");
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn test_welcome_email_blank_recipient_is_mandatory() {
    let transport = InMemoryTransport::new();
    let (status, body) = post(
        app(&transport),
        "/api/notifications/welcome",
        json!({"toEmail": "", "userName": "Ann"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "toEmail: Email recipient is mandatory");
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test]
async fn test_welcome_email_transport_failure() {
    let transport = InMemoryTransport::failing("Connection refused");
    let (status, body) = post(
        app(&transport),
        "/api/notifications/welcome",
        json!({"toEmail": "a@b.com", "userName": "Ann"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Failed to send welcome email: Connection refused"
    );
}

#[tokio::test]
async fn test_health() {
    let transport = InMemoryTransport::new();
    let request = Request::get("/api/notifications/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(&transport), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Notification Service is running");
    assert_eq!(body["service"], "OK");
    assert!(body["timestamp"].as_i64().unwrap() > 0);
    assert_eq!(body["_links"]["self"]["href"], "/api/notifications/health");
    assert_eq!(
        body["_links"]["send-custom-email"]["href"],
        "/api/notifications/email"
    );
}
