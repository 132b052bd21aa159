//! Handler functions for calculation records and the stateless arithmetic
//! endpoints.

use crate::api::common::{ApiResponse, HttpError, service_error_to_http};
use crate::database::models::{
    Calculation, CreateCalculationRequest, ListQuery, UpdateCalculationRequest, User,
};
use crate::errors::ServiceError;
use crate::services::calculation_service::CalculationService;
use crate::services::evaluator::{Operation, evaluate};
use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[axum::debug_handler]
pub async fn browse(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Calculation>>>, HttpError> {
    let service = CalculationService::new(&pool);

    match service.list(&user, &query).await {
        Ok(calculations) => Ok(ResponseJson(ApiResponse::ok(calculations))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn add(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateCalculationRequest>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Calculation>>), HttpError> {
    let service = CalculationService::new(&pool);

    match service.create(&user, payload).await {
        Ok(calculation) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(calculation, "Calculation created")),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn read(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Calculation>>, HttpError> {
    let service = CalculationService::new(&pool);

    match service.get(&user, id).await {
        Ok(calculation) => Ok(ResponseJson(ApiResponse::ok(calculation))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn replace(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateCalculationRequest>,
) -> Result<ResponseJson<ApiResponse<Calculation>>, HttpError> {
    let service = CalculationService::new(&pool);

    match service.replace(&user, id, payload).await {
        Ok(calculation) => Ok(ResponseJson(ApiResponse::success(
            calculation,
            "Calculation updated",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn edit(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCalculationRequest>,
) -> Result<ResponseJson<ApiResponse<Calculation>>, HttpError> {
    let service = CalculationService::new(&pool);

    match service.patch(&user, id, payload).await {
        Ok(calculation) => Ok(ResponseJson(ApiResponse::success(
            calculation,
            "Calculation updated",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

#[axum::debug_handler]
pub async fn remove(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let service = CalculationService::new(&pool);

    match service.delete(&user, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Operands of the two-argument arithmetic endpoints (`?a=..&b=..`).
#[derive(Debug, Deserialize)]
pub struct ArithmeticQuery {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArithmeticResult {
    pub operation: String,
    pub a: f64,
    pub b: f64,
    pub result: f64,
}

fn arithmetic(
    name: &str,
    operation: Operation,
    query: ArithmeticQuery,
) -> Result<ResponseJson<ArithmeticResult>, HttpError> {
    let result = evaluate(operation, &[query.a, query.b])
        .map_err(|error| service_error_to_http(ServiceError::bad_request(error.to_string())))?;

    Ok(ResponseJson(ArithmeticResult {
        operation: name.to_string(),
        a: query.a,
        b: query.b,
        result,
    }))
}

pub async fn add_numbers(
    Query(query): Query<ArithmeticQuery>,
) -> Result<ResponseJson<ArithmeticResult>, HttpError> {
    arithmetic("add", Operation::Add, query)
}

pub async fn subtract_numbers(
    Query(query): Query<ArithmeticQuery>,
) -> Result<ResponseJson<ArithmeticResult>, HttpError> {
    arithmetic("subtract", Operation::Sub, query)
}

pub async fn multiply_numbers(
    Query(query): Query<ArithmeticQuery>,
) -> Result<ResponseJson<ArithmeticResult>, HttpError> {
    arithmetic("multiply", Operation::Mul, query)
}

pub async fn divide_numbers(
    Query(query): Query<ArithmeticQuery>,
) -> Result<ResponseJson<ArithmeticResult>, HttpError> {
    arithmetic("divide", Operation::Div, query)
}
