//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notification Service API",
        version = "0.1.0",
        description = "Sends user lifecycle and custom emails"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/notifications", api = domain_notifications::ApiDoc)
    ),
    tags(
        (name = "Notification Management", description = "APIs for sending notifications and checking service health")
    )
)]
pub struct ApiDoc;
