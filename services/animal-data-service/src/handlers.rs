use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::models::AnimalQuery;
use crate::service::{self, ServiceError};
use crate::state::EndpointState;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

pub async fn store_animal(State(state): State<EndpointState>, body: Bytes) -> impl IntoResponse {
    match service::store_animal(&state, &body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => (err.status, Json(err.body)).into_response(),
    }
}

pub async fn read_animal(
    State(state): State<EndpointState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> impl IntoResponse {
    // The latest-only endpoint ignores every query parameter.
    if !state.store.retains_history() {
        let response = service::read_latest(&state).await;
        return (StatusCode::OK, Json(response)).into_response();
    }

    match query {
        Ok(Query(pairs)) => {
            let query = AnimalQuery::from_pairs(pairs);
            let response = service::read_animal(&state, &query).await;
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(rejection) => {
            tracing::error!(error = %rejection, "animal data query failed");
            let err = ServiceError::internal(rejection.body_text());
            (err.status, Json(err.body)).into_response()
        }
    }
}

pub async fn method_not_allowed(method: Method) -> impl IntoResponse {
    tracing::warn!(%method, "unsupported method on animal data endpoint");
    let err = ServiceError::method_not_allowed();
    (err.status, Json(err.body))
}
