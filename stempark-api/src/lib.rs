use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod products;
pub mod state;

pub use state::{AppState, MediaServing};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let media = ServeDir::new(&state.media.root_dir);
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    let router = Router::new()
        .route("/health", get(health))
        .merge(products::routes());

    // Media served at the site root sits behind the API routes
    let router = match state.media.public_prefix.trim_matches('/') {
        "" => router.fallback_service(media),
        prefix => router.nest_service(&format!("/{}", prefix), media),
    };

    router
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
