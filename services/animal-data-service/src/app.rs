use axum::{
    http::{header, Method},
    routing::{get, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::handlers::{healthz, method_not_allowed, read_animal, readyz, store_animal};
use crate::state::{AppState, EndpointState};

pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route(&config.animal_data_path, animal_endpoint(state.animal_data))
        .route(&config.latest_animal_path, animal_endpoint(state.latest_animal))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// OPTIONS never reaches the endpoint: the CORS layer answers it.
fn animal_endpoint(state: EndpointState) -> MethodRouter {
    get(read_animal)
        .head(method_not_allowed)
        .post(store_animal)
        .fallback(method_not_allowed)
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
