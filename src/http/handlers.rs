//! Request handlers.
//!
//! Handlers translate between DTOs and the service layer; every business
//! decision happens below them. The wall clock is read once per request and
//! passed down, keeping everything underneath deterministic.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Local, NaiveDateTime};

use crate::db::services;
use crate::models::{PropertyDeleteOutcome, PropertyId, TourId, TourStatus};

use super::dto::{
    CreatePropertyRequest, CreateTourRequest, HealthResponse, ListToursQuery, PropertyDto,
    PropertyListResponse, TourDto, TourListResponse, UpdateTourRequest,
};
use super::error::{ApiResult, AppError};
use super::state::AppState;

fn request_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = services::health_check(state.repository.as_ref())
        .await
        .unwrap_or(false);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            repository: healthy,
        }),
    )
}

pub async fn create_tour(
    State(state): State<AppState>,
    Json(request): Json<CreateTourRequest>,
) -> ApiResult<(StatusCode, Json<TourDto>)> {
    let new_tour = request.validate().map_err(AppError::BadRequest)?;
    let attempt = services::schedule_tour(
        state.repository.as_ref(),
        &state.policy,
        new_tour,
        request_now(),
    )
    .await?;
    let tour = attempt.map_err(AppError::from)?;
    Ok((StatusCode::CREATED, Json(TourDto::from(tour))))
}

pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<ListToursQuery>,
) -> ApiResult<Json<TourListResponse>> {
    let filter = query.into_filter().map_err(AppError::BadRequest)?;
    let tours = services::list_tours(state.repository.as_ref(), filter).await?;
    Ok(Json(TourListResponse::from_tours(tours)))
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TourDto>> {
    let tour = services::get_tour(state.repository.as_ref(), TourId(id)).await?;
    Ok(Json(TourDto::from(tour)))
}

pub async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTourRequest>,
) -> ApiResult<Json<TourDto>> {
    let update = request.validate().map_err(AppError::BadRequest)?;
    let attempt = services::reschedule_tour(
        state.repository.as_ref(),
        &state.policy,
        TourId(id),
        update,
        request_now(),
    )
    .await?;
    let tour = attempt.map_err(AppError::from)?;
    Ok(Json(TourDto::from(tour)))
}

pub async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    services::delete_tour(state.repository.as_ref(), TourId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn transition_tour(
    state: AppState,
    id: i64,
    new_status: TourStatus,
) -> ApiResult<Json<TourDto>> {
    let attempt = services::update_tour_status(
        state.repository.as_ref(),
        TourId(id),
        new_status,
        request_now(),
    )
    .await?;
    let tour = attempt.map_err(AppError::from)?;
    Ok(Json(TourDto::from(tour)))
}

pub async fn cancel_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TourDto>> {
    transition_tour(state, id, TourStatus::Cancelled).await
}

pub async fn complete_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TourDto>> {
    transition_tour(state, id, TourStatus::Completed).await
}

pub async fn no_show_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TourDto>> {
    transition_tour(state, id, TourStatus::NoShow).await
}

pub async fn create_property(
    State(state): State<AppState>,
    Json(request): Json<CreatePropertyRequest>,
) -> ApiResult<(StatusCode, Json<PropertyDto>)> {
    let new_property = request.validate().map_err(AppError::BadRequest)?;
    let property =
        services::create_property(state.repository.as_ref(), new_property, request_now())
            .await?;
    Ok((StatusCode::CREATED, Json(PropertyDto::from(property))))
}

pub async fn list_properties(
    State(state): State<AppState>,
) -> ApiResult<Json<PropertyListResponse>> {
    let properties = services::list_properties(state.repository.as_ref()).await?;
    Ok(Json(PropertyListResponse::from_properties(properties)))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PropertyDto>> {
    let property = services::get_property(state.repository.as_ref(), PropertyId(id)).await?;
    Ok(Json(PropertyDto::from(property)))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PropertyDto>> {
    let outcome =
        services::delete_property(state.repository.as_ref(), PropertyId(id), request_now())
            .await?;
    match outcome {
        PropertyDeleteOutcome::Deleted(property) => Ok(Json(PropertyDto::from(property))),
        PropertyDeleteOutcome::Blocked { active_tours } => {
            Err(AppError::PropertyDeleteBlocked { active_tours })
        }
    }
}
