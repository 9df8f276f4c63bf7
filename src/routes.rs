use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::models::AppState;

// Embed the default stylesheet in the binary
pub const DEFAULT_STYLESHEET: &str = include_str!("../static/styles.css");

/// `/static/styles.css` comes from memory; any other asset is read from `./static`.
fn static_router(stylesheet: String) -> Router<AppState> {
    Router::new()
        .route(
            "/styles.css",
            get(move || {
                let css = stylesheet.clone();
                async move { ([(CONTENT_TYPE, "text/css")], css) }
            }),
        )
        .fallback_service(ServeDir::new("static"))
        .layer(
            ServiceBuilder::new().layer(SetResponseHeaderLayer::if_not_present(
                CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=31536000, immutable"),
            )),
        )
}

pub fn build_router(state: AppState) -> Router {
    // Custom stylesheet wins over the embedded one
    let stylesheet_content = state
        .custom_css
        .clone()
        .unwrap_or_else(|| DEFAULT_STYLESHEET.to_string());

    Router::new()
        .route("/", get(handlers::users::users_list))
        .route(
            "/novo-usuario",
            get(handlers::users::user_new_get).post(handlers::users::user_new_post),
        )
        .route(
            "/editar-usuario/:id",
            get(handlers::users::user_edit_get).post(handlers::users::user_edit_post),
        )
        .route("/validar", post(handlers::validation::validate_field_post))
        .nest("/static", static_router(stylesheet_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
