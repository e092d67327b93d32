//! Pipeline introspection API types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{ChecklistTable, PipelineDefinition, PipelineKind, StageDefinition};
use crate::infrastructure::services::StageSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResponse {
    pub id: String,
    pub label: String,
    pub position: usize,
    pub terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_days: Option<i64>,
}

impl StageResponse {
    fn new(position: usize, stage: &StageDefinition) -> Self {
        Self {
            id: stage.id().to_string(),
            label: stage.label().to_string(),
            position,
            terminal: stage.is_terminal(),
            sla_days: stage.sla_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub kind: PipelineKind,
    pub stages: Vec<StageResponse>,
    pub required_attributes: Vec<String>,
    pub segment_attribute: String,
}

impl From<&PipelineDefinition> for PipelineResponse {
    fn from(definition: &PipelineDefinition) -> Self {
        Self {
            kind: definition.kind(),
            stages: definition
                .stages()
                .iter()
                .enumerate()
                .map(|(i, s)| StageResponse::new(i, s))
                .collect(),
            required_attributes: definition.required_attributes().to_vec(),
            segment_attribute: definition.segment_attribute().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineListResponse {
    pub pipelines: Vec<PipelineResponse>,
}

/// `{stage: [items...]}` for every stage in pipeline order, terminal ones included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistResponse {
    pub kind: PipelineKind,
    pub stages: Map<String, Value>,
}

impl ChecklistResponse {
    pub fn new(definition: &PipelineDefinition, table: &ChecklistTable) -> Self {
        Self {
            kind: definition.kind(),
            stages: table
                .ordered(definition)
                .into_iter()
                .map(|(stage, items)| (stage.to_string(), Value::from(items.to_vec())))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardColumn {
    pub stage: String,
    pub label: String,
    pub terminal: bool,
    pub count: usize,
    pub overdue: usize,
}

impl From<StageSummary> for BoardColumn {
    fn from(summary: StageSummary) -> Self {
        Self {
            stage: summary.stage,
            label: summary.label,
            terminal: summary.terminal,
            count: summary.count,
            overdue: summary.overdue,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    pub kind: PipelineKind,
    pub columns: Vec<BoardColumn>,
}
