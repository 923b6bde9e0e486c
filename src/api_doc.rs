use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{NewNoteRequest, Note};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "notes-api",
        version = "1.0.0",
        description = "A small REST API for short text notes backed by Google Cloud Spanner"
    ),
    paths(
        handlers::health::health_handler,
        handlers::list::list_handler,
        handlers::get::get_handler,
        handlers::create::create_handler,
        handlers::delete::delete_handler
    ),
    components(
        schemas(
            Note,
            NewNoteRequest,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "notes", description = "Note operations")
    )
)]
pub struct ApiDoc;
