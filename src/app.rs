use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::error::unknown_endpoint;
use crate::handlers::{create_handler, delete_handler, get_handler, health_handler, list_handler};
use crate::routes;
use crate::state::AppState;

/// Assemble the full HTTP surface
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(routes::HEALTH, get(health_handler))
        .route(routes::NOTES, get(list_handler).post(create_handler))
        .route(routes::NOTE_ITEM, get(get_handler).delete(delete_handler))
        .merge(SwaggerUi::new(routes::SWAGGER_UI).url(routes::OPENAPI_JSON, ApiDoc::openapi()))
        .fallback(unknown_endpoint)
        .method_not_allowed_fallback(unknown_endpoint)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorResponse;
    use crate::store::NoteStore;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let app = router(AppState::new(NoteStore::in_memory()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/notez")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error_response.error, "unknown endpoint");
    }

    #[tokio::test]
    async fn test_unsupported_method_on_known_path() {
        let app = router(AppState::new(NoteStore::in_memory()));

        for (method, uri) in [
            ("PUT", "/api/notes/5a3d5da59070081a82a3445c"),
            ("PATCH", "/api/notes"),
        ] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .header("content-type", "application/json")
                        .body(Body::from(r#"{"important": true}"#))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);

            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let error_response: ErrorResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(error_response.error, "unknown endpoint");
        }
    }

    #[tokio::test]
    async fn test_openapi_json_is_served() {
        let app = router(AppState::new(NoteStore::in_memory()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
