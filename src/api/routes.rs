use crate::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// OpenAPI document for the tutor API
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::home,
        crate::api::handlers::ask::ask,
        crate::api::handlers::sessions::get_session_memory,
    ),
    components(schemas(
        crate::types::AskRequest,
        crate::types::AskResponse,
        crate::types::ErrorResponse,
        crate::types::SessionMemoryView,
    )),
    tags(
        (name = "tutor", description = "Kid-friendly question answering"),
        (name = "sessions", description = "Conversation memory"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn create_router(max_body_bytes: usize) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(crate::api::handlers::health::home))
        .route("/ask", post(crate::api::handlers::ask::ask))
        .route(
            "/sessions/{session_id}/memory",
            get(crate::api::handlers::sessions::get_session_memory),
        );

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(DefaultBodyLimit::max(max_body_bytes)),
    )
}
