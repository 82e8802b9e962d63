//! Axum router construction.
//!
//! Builds the full application router with the API routes, middleware
//! layers, and static serving of the media root.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::context::AppContext;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::videos::list_videos,
        routes::videos::get_video,
        routes::videos::upload_video,
        routes::videos::delete_video,
        routes::stream::hls_file,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::videos::VideoListResponse,
        routes::videos::VideoUploadResponse,
        routes::videos::UploadVideoForm,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit =
        usize::try_from(ctx.config.server.max_upload_bytes).unwrap_or(usize::MAX);

    let api = Router::new()
        .route(
            "/videos",
            get(routes::videos::list_videos).post(routes::videos::upload_video),
        )
        .route(
            "/videos/{id}",
            get(routes::videos::get_video).delete(routes::videos::delete_video),
        )
        .route(
            "/videos/{id}/{resolution}/{file}",
            get(routes::stream::hls_file),
        );

    let media_root = ctx.config.media.root.clone();
    let media_prefix = ctx.config.media.url_prefix.trim_end_matches('/').to_string();

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api", api);

    // Uploaded originals and generated thumbnails are plain files under the
    // media root.
    tracing::info!("Serving media from {:?} at {}/", media_root, media_prefix);
    let app = if media_prefix.is_empty() {
        app.fallback_service(ServeDir::new(media_root))
    } else {
        app.nest_service(&media_prefix, ServeDir::new(media_root))
    };

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
