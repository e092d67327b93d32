//! Workflow instance API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{
    remaining_days, AssigneeFilter, DomainError, InstanceFilter, InstancePage, Pagination,
    PipelineKind, SlaBucket, WorkflowInstance,
};
use crate::infrastructure::services::CreateInstanceRequest;

/// Body of `POST /api/pipelines/{kind}/instances`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInstanceBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Value,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub sla_deadline: Option<DateTime<Utc>>,
}

impl From<CreateInstanceBody> for CreateInstanceRequest {
    fn from(body: CreateInstanceBody) -> Self {
        Self {
            id: body.id,
            attributes: body.attributes,
            assigned_to: body.assigned_to,
            sla_deadline: body.sla_deadline,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub target_stage: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetPendingItemsRequest {
    pub items: Vec<String>,
}

/// `assigned_to`: an owner name, `"me"` for the caller, or `null` to unassign
#[derive(Debug, Clone, Deserialize)]
pub struct AssignRequest {
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Query string of the instance listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInstancesQuery {
    pub stage: Option<String>,
    /// `all`, `mine`, `unassigned` or an owner name
    pub assigned_to: Option<String>,
    pub segment: Option<String>,
    /// `within`, `approaching` or `overdue`
    pub sla: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListInstancesQuery {
    pub fn into_filter(self) -> Result<(InstanceFilter, Pagination), DomainError> {
        let mut filter = InstanceFilter::new();

        if let Some(stage) = self.stage.filter(|s| !s.trim().is_empty()) {
            filter = filter.with_stage(stage.trim());
        }

        if let Some(assignee) = self.assigned_to {
            filter = filter.with_assignee(AssigneeFilter::parse(&assignee));
        }

        if let Some(segment) = self.segment.filter(|s| !s.trim().is_empty()) {
            filter = filter.with_segment(segment.trim());
        }

        if let Some(sla) = self.sla.filter(|s| !s.trim().is_empty() && s.trim() != "all") {
            filter = filter.with_sla(sla.parse::<SlaBucket>()?);
        }

        Ok((filter, Pagination::new(self.limit, self.offset)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceResponse {
    pub id: String,
    pub pipeline_kind: PipelineKind,
    pub current_stage: String,
    pub pending_items: Vec<String>,
    pub assigned_to: Option<String>,
    pub sla_deadline: Option<DateTime<Utc>>,
    /// Bucket of `sla_deadline`, absent when there is no deadline
    pub sla_status: Option<SlaBucket>,
    pub sla_remaining_days: Option<i64>,
    pub days_in_stage: i64,
    pub status_started_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
    pub attributes: Map<String, Value>,
}

impl InstanceResponse {
    pub fn at(instance: &WorkflowInstance, now: DateTime<Utc>) -> Self {
        let deadline = instance.sla_deadline();

        Self {
            id: instance.id().to_string(),
            pipeline_kind: instance.pipeline_kind(),
            current_stage: instance.current_stage().to_string(),
            pending_items: instance.pending_items().to_vec(),
            assigned_to: instance.assigned_to().map(String::from),
            sla_deadline: deadline,
            sla_status: deadline.map(|d| SlaBucket::classify(d, now)),
            sla_remaining_days: deadline.map(|d| remaining_days(d, now).unwrap_or(0)),
            days_in_stage: instance.days_in_stage(now),
            status_started_at: instance.status_started_at(),
            created_at: instance.created_at(),
            updated_at: instance.updated_at(),
            version: instance.version(),
            attributes: instance.attributes().clone(),
        }
    }
}

impl From<&WorkflowInstance> for InstanceResponse {
    fn from(instance: &WorkflowInstance) -> Self {
        Self::at(instance, Utc::now())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceListResponse {
    pub items: Vec<InstanceResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl InstanceListResponse {
    pub fn from_page(page: &InstancePage, pagination: Pagination) -> Self {
        let now = Utc::now();

        Self {
            items: page
                .items
                .iter()
                .map(|i| InstanceResponse::at(i, now))
                .collect(),
            total: page.total,
            limit: pagination.limit(),
            offset: pagination.offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstanceId;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_query_into_filter() {
        let query = ListInstancesQuery {
            stage: Some("validacao".to_string()),
            assigned_to: Some("mine".to_string()),
            segment: Some(" FIDC Alpha ".to_string()),
            sla: Some("approaching".to_string()),
            limit: Some(1000),
            offset: Some(10),
        };

        let (filter, pagination) = query.into_filter().unwrap();
        assert_eq!(filter.stage.as_deref(), Some("validacao"));
        assert_eq!(filter.assignee, AssigneeFilter::Mine);
        assert_eq!(filter.segment.as_deref(), Some("FIDC Alpha"));
        assert_eq!(filter.sla, Some(SlaBucket::Approaching));
        assert_eq!(pagination.limit(), 200);
        assert_eq!(pagination.offset(), 10);
    }

    #[test]
    fn test_query_defaults_and_bad_sla() {
        let (filter, pagination) = ListInstancesQuery::default().into_filter().unwrap();
        assert_eq!(filter, InstanceFilter::new());
        assert_eq!(pagination.limit(), 50);

        let bad = ListInstancesQuery {
            sla: Some("late".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad.into_filter(), Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_response_derives_sla_fields() {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 9, 0, 0).unwrap();
        let inst = WorkflowInstance::new(
            InstanceId::new("alloc-3").unwrap(),
            PipelineKind::Allocation,
            "matching",
            vec![],
            now - Duration::days(3),
        )
        .with_sla_deadline(Some(now + Duration::days(1)));

        let response = InstanceResponse::at(&inst, now);
        assert_eq!(response.sla_status, Some(SlaBucket::Approaching));
        assert_eq!(response.sla_remaining_days, Some(2));
        assert_eq!(response.days_in_stage, 3);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["pipeline_kind"], "allocation");
        assert_eq!(json["sla_status"], "approaching");
    }
}
