mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub use errors::HttpError;
pub use state::{HttpState, TOKEN_HEADER, generate_api_token};

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/usage", post(handlers::usage))
        .route("/total_cost", post(handlers::total_cost))
        .route("/cost_by_model", post(handlers::cost_by_model))
        .route("/cost_by_provider", post(handlers::cost_by_provider))
        .route("/report", post(handlers::report))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_token,
        ));

    Router::new()
        .route("/", get(handlers::report_page))
        .route("/report", get(handlers::report_page))
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
}
