use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        .nest("/webservice", webservice_routes(app_state.clone()))
        .with_state(app_state)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn webservice_routes(app_state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Function discovery is public
    let registry_routes = Router::new()
        .route("/functions", get(handlers::webservice::list_functions))
        .route("/functions/{name}", get(handlers::webservice::get_function));

    // Function calls require a web-service token
    let rest_routes = Router::new()
        .route(
            "/rest/local_user_count_api_count",
            get(handlers::webservice::count_active_users_query)
                .post(handlers::webservice::count_active_users_body),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state,
            middlewares::auth::auth_middleware,
        ));

    registry_routes.merge(rest_routes)
}
