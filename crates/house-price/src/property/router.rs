use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{Property, PropertyCategory, PropertyId};
use super::repository::{PredictionRepository, PropertyRepository, RepositoryError};
use super::service::{PropertyService, PropertyServiceError};
use crate::prediction::{PredictionError, PredictionId};

type SharedService<P, R> = Arc<PropertyService<P, R>>;

/// Router builder exposing property CRUD and prediction endpoints.
pub fn property_router<P, R>(service: SharedService<P, R>) -> Router
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties",
            get(list_handler::<P, R>).post(create_handler::<P, R>),
        )
        .route("/api/v1/properties/stats", get(stats_handler::<P, R>))
        .route(
            "/api/v1/properties/:property_id",
            get(fetch_handler::<P, R>)
                .put(update_handler::<P, R>)
                .delete(delete_handler::<P, R>),
        )
        .route(
            "/api/v1/properties/:property_id/predictions",
            get(prediction_history_handler::<P, R>).post(predict_handler::<P, R>),
        )
        .route(
            "/api/v1/properties/:property_id/predictions/cached",
            get(cached_predictions_handler::<P, R>),
        )
        .route(
            "/api/v1/predictions/cache",
            delete(clear_cache_handler::<P, R>),
        )
        .route(
            "/api/v1/predictions/:prediction_id/actual",
            put(record_actual_handler::<P, R>),
        )
        .route("/api/v1/predictions/engine", get(engine_handler::<P, R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub(crate) category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordActualPrice {
    pub(crate) actual_price: f64,
}

fn error_response(err: PropertyServiceError) -> Response {
    let status = match &err {
        PropertyServiceError::Validation(validation) => {
            let payload = json!({
                "error": validation.to_string(),
                "issues": validation.issues,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
        PropertyServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PropertyServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        PropertyServiceError::Prediction(PredictionError::Timeout { .. }) => {
            StatusCode::GATEWAY_TIMEOUT
        }
        PropertyServiceError::Prediction(PredictionError::Closed) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        PropertyServiceError::Prediction(PredictionError::Failure { .. }) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn create_handler<P, R>(
    State(service): State<SharedService<P, R>>,
    axum::Json(property): axum::Json<Property>,
) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    match service.add_property(property) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(service.view(stored))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<P, R>(
    State(service): State<SharedService<P, R>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    let listed = match query.category.as_deref() {
        Some(raw) => match raw.parse::<PropertyCategory>() {
            Ok(category) => service.properties_by_category(category),
            Err(err) => {
                let payload = json!({ "error": err.to_string() });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        },
        None => service.list_properties(),
    };

    match listed {
        Ok(properties) => {
            let views: Vec<_> = properties
                .into_iter()
                .map(|property| service.view(property))
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn stats_handler<P, R>(State(service): State<SharedService<P, R>>) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    match service.price_statistics() {
        Ok(statistics) => (StatusCode::OK, axum::Json(statistics)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn fetch_handler<P, R>(
    State(service): State<SharedService<P, R>>,
    Path(property_id): Path<u64>,
) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    match service.get_property(PropertyId(property_id)) {
        Ok(property) => (StatusCode::OK, axum::Json(service.view(property))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<P, R>(
    State(service): State<SharedService<P, R>>,
    Path(property_id): Path<u64>,
    axum::Json(property): axum::Json<Property>,
) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    match service.update_property(PropertyId(property_id), property) {
        Ok(updated) => (StatusCode::OK, axum::Json(service.view(updated))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<P, R>(
    State(service): State<SharedService<P, R>>,
    Path(property_id): Path<u64>,
) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    match service.delete_property(PropertyId(property_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn predict_handler<P, R>(
    State(service): State<SharedService<P, R>>,
    Path(property_id): Path<u64>,
) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    let worker = service.clone();
    let joined =
        tokio::task::spawn_blocking(move || worker.predict(PropertyId(property_id))).await;

    match joined {
        Ok(Ok(results)) => (StatusCode::OK, axum::Json(results)).into_response(),
        Ok(Err(err)) => error_response(err),
        Err(join_error) => {
            error!(%join_error, property_id, "prediction worker aborted");
            let payload = json!({ "error": "prediction worker aborted" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn prediction_history_handler<P, R>(
    State(service): State<SharedService<P, R>>,
    Path(property_id): Path<u64>,
) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    match service.prediction_results(PropertyId(property_id)) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn cached_predictions_handler<P, R>(
    State(service): State<SharedService<P, R>>,
    Path(property_id): Path<u64>,
) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    let cached = service.cached_predictions(PropertyId(property_id));
    (StatusCode::OK, axum::Json(cached)).into_response()
}

pub(crate) async fn clear_cache_handler<P, R>(State(service): State<SharedService<P, R>>) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    service.clear_prediction_cache();
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) async fn record_actual_handler<P, R>(
    State(service): State<SharedService<P, R>>,
    Path(prediction_id): Path<u64>,
    axum::Json(body): axum::Json<RecordActualPrice>,
) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    match service.record_actual_price(PredictionId(prediction_id), body.actual_price) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn engine_handler<P, R>(State(service): State<SharedService<P, R>>) -> Response
where
    P: PropertyRepository + 'static,
    R: PredictionRepository + 'static,
{
    let engine = service.engine();
    let payload = json!({
        "state": engine.state().label(),
        "workers": engine.config().worker_threads,
        "cached_predictions": engine.cached_len(),
        "queued_tasks": engine.queued_tasks(),
        "reference_year": engine.reference_year(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
