//! Workflow instance endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::middleware::Caller;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, AssignRequest, CreateInstanceBody, InstanceListResponse, InstanceResponse, Json,
    ListInstancesQuery, SetPendingItemsRequest, TransitionRequest,
};
use crate::infrastructure::services::AssignTarget;

use super::parse_kind;

/// GET /api/pipelines/{kind}/instances
pub async fn list_instances(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(kind): Path<String>,
    Query(query): Query<ListInstancesQuery>,
) -> Result<Json<InstanceListResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let (filter, pagination) = query.into_filter()?;

    let page = state
        .instance_service
        .list(kind, filter, pagination, caller.as_ref())
        .await?;

    Ok(Json(InstanceListResponse::from_page(&page, pagination)))
}

/// POST /api/pipelines/{kind}/instances
pub async fn create_instance(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<CreateInstanceBody>,
) -> Result<(StatusCode, Json<InstanceResponse>), ApiError> {
    let kind = parse_kind(&kind)?;
    let instance = state.instance_service.create(kind, body.into()).await?;

    Ok((StatusCode::CREATED, Json(InstanceResponse::from(&instance))))
}

/// GET /api/instances/{id}
pub async fn get_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InstanceResponse>, ApiError> {
    let instance = state.instance_service.get(&id).await?;
    Ok(Json(InstanceResponse::from(&instance)))
}

/// DELETE /api/instances/{id}
pub async fn delete_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.instance_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/instances/{id}/transition
pub async fn transition_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<InstanceResponse>, ApiError> {
    let instance = state
        .instance_service
        .transition(&id, &request.target_stage)
        .await?;

    Ok(Json(InstanceResponse::from(&instance)))
}

/// PUT /api/instances/{id}/pending-items
pub async fn set_pending_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetPendingItemsRequest>,
) -> Result<Json<InstanceResponse>, ApiError> {
    let instance = state
        .instance_service
        .set_pending_items(&id, request.items)
        .await?;

    Ok(Json(InstanceResponse::from(&instance)))
}

/// PUT /api/instances/{id}/assignee
pub async fn assign_instance(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<InstanceResponse>, ApiError> {
    let target = AssignTarget::parse(request.assigned_to.as_deref());
    let instance = state
        .instance_service
        .assign(&id, target, caller.as_ref())
        .await?;

    Ok(Json(InstanceResponse::from(&instance)))
}
