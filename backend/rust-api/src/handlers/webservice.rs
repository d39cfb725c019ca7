use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::{
    extractors::{AppJson, AppQuery},
    metrics::record_user_count,
    middlewares::auth::JwtClaims,
    models::{
        user_count::{CountRequest, CountResult},
        webservice::{FunctionDescriptor, ServiceDescriptor},
    },
    services::{user_count_service::UserCountError, AppState},
};

pub(crate) async fn count_active_users_query(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    AppQuery(request): AppQuery<CountRequest>,
) -> Result<Json<CountResult>, ApiError> {
    count_active_users(&state, &claims, request).await
}

pub(crate) async fn count_active_users_body(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    AppJson(request): AppJson<CountRequest>,
) -> Result<Json<CountResult>, ApiError> {
    count_active_users(&state, &claims, request).await
}

async fn count_active_users(
    state: &AppState,
    claims: &JwtClaims,
    request: CountRequest,
) -> Result<Json<CountResult>, ApiError> {
    tracing::info!(
        user_id = %claims.sub,
        duration = request.duration,
        duration_unit = %request.duration_unit,
        "Active user count requested"
    );

    match state
        .user_counter()
        .count(request.duration, &request.duration_unit)
        .await
    {
        Ok(result) => {
            record_user_count("ok");
            Ok(Json(result))
        }
        Err(err @ UserCountError::InvalidArgument { .. }) => {
            record_user_count("invalid");
            tracing::warn!("{}", err);
            Err(ApiError::invalid_parameter(err.to_string()))
        }
        Err(UserCountError::Store(err)) => {
            record_user_count("error");
            tracing::error!("Active user count failed: {:#}", err);
            Err(ApiError::internal("Failed to count active users"))
        }
    }
}

pub(crate) async fn list_functions(State(state): State<Arc<AppState>>) -> Json<FunctionsResponse> {
    Json(FunctionsResponse {
        functions: state.registry.functions().to_vec(),
        services: state.registry.services().to_vec(),
    })
}

pub(crate) async fn get_function(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<FunctionDescriptor>, ApiError> {
    state
        .registry
        .function(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Function {} does not exist", name)))
}

#[derive(Debug, Serialize)]
pub(crate) struct FunctionsResponse {
    functions: Vec<FunctionDescriptor>,
    services: Vec<ServiceDescriptor>,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    InvalidParameter(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn invalid_parameter(message: impl Into<String>) -> Self {
        ApiError::InvalidParameter(message.into())
    }

    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, exception, errorcode, message) = match self {
            ApiError::InvalidParameter(message) => (
                StatusCode::BAD_REQUEST,
                "invalid_parameter_exception",
                "invalidparameter",
                message,
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                "dml_missing_record_exception",
                "invalidrecord",
                message,
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "dml_read_exception",
                "dmlreadexception",
                message,
            ),
        };

        (
            status,
            Json(json!({
                "exception": exception,
                "errorcode": errorcode,
                "message": message,
            })),
        )
            .into_response()
    }
}
