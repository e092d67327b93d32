//! Pipeline introspection endpoints

use axum::extract::{Path, State};

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, BoardResponse, ChecklistResponse, Json, PipelineListResponse, PipelineResponse,
};

use super::parse_kind;

/// GET /api/pipelines
pub async fn list_pipelines(State(state): State<AppState>) -> Json<PipelineListResponse> {
    Json(PipelineListResponse {
        pipelines: state
            .catalog
            .definitions()
            .into_iter()
            .map(PipelineResponse::from)
            .collect(),
    })
}

/// GET /api/pipelines/{kind}
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<PipelineResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(PipelineResponse::from(state.catalog.definition(kind))))
}

/// GET /api/pipelines/{kind}/checklist
pub async fn get_checklist(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ChecklistResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let table = state.checklists.table(kind).await;

    Ok(Json(ChecklistResponse::new(
        state.catalog.definition(kind),
        &table,
    )))
}

/// GET /api/pipelines/{kind}/board
pub async fn get_board(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<BoardResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let columns = state.instance_service.board(kind).await?;

    Ok(Json(BoardResponse {
        kind,
        columns: columns.into_iter().map(Into::into).collect(),
    }))
}
