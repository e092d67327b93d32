//! Instance list filters, SLA bucketing and pagination

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::WorkflowInstance;
use crate::domain::caller::CallerIdentity;
use crate::domain::DomainError;

/// Default page size
pub const DEFAULT_LIMIT: usize = 50;

/// Maximum page size
pub const MAX_LIMIT: usize = 200;

/// Remaining days above which a deadline is comfortably within SLA
const APPROACHING_MAX_DAYS: i64 = 2;

/// Deadline proximity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlaBucket {
    Within,
    Approaching,
    Overdue,
}

impl SlaBucket {
    /// Classifies a deadline relative to `now`
    pub fn classify(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        match remaining_days(deadline, now) {
            None => Self::Overdue,
            Some(days) if days > APPROACHING_MAX_DAYS => Self::Within,
            Some(_) => Self::Approaching,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Within => "within",
            Self::Approaching => "approaching",
            Self::Overdue => "overdue",
        }
    }
}

impl fmt::Display for SlaBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SlaBucket {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "within" => Ok(Self::Within),
            "approaching" => Ok(Self::Approaching),
            "overdue" => Ok(Self::Overdue),
            other => Err(DomainError::validation(format!(
                "Unknown SLA bucket '{}': expected within, approaching or overdue",
                other
            ))),
        }
    }
}

/// Inclusive count of UTC calendar days left until `deadline`, counting today.
///
/// Returns `None` once the deadline has passed.
pub fn remaining_days(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    if deadline < now {
        return None;
    }

    Some((deadline.date_naive() - now.date_naive()).num_days() + 1)
}

/// Assignee filter; `Mine` is resolved against the caller identity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AssigneeFilter {
    #[default]
    All,
    Mine,
    Unassigned,
    Owner(String),
}

impl AssigneeFilter {
    /// Parses the wire value: `all`, `mine`, `unassigned` or an owner name
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();

        match trimmed.to_lowercase().as_str() {
            "" | "all" => Self::All,
            "mine" => Self::Mine,
            "unassigned" => Self::Unassigned,
            _ => Self::Owner(trimmed.to_string()),
        }
    }

    /// Replaces `Mine` with the caller's own name
    pub fn resolve(self, caller: Option<&CallerIdentity>) -> Result<Self, DomainError> {
        match self {
            Self::Mine => caller
                .map(|c| Self::Owner(c.as_str().to_string()))
                .ok_or_else(|| {
                    DomainError::validation("Filter 'mine' requires a caller identity")
                }),
            other => Ok(other),
        }
    }

    fn matches(&self, assigned_to: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Unassigned => assigned_to.is_none(),
            Self::Owner(owner) => assigned_to == Some(owner.as_str()),
            // Unresolved `Mine` never matches
            Self::Mine => false,
        }
    }
}

/// Criteria for listing instances of one pipeline kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceFilter {
    pub stage: Option<String>,
    pub assignee: AssigneeFilter,
    pub segment: Option<String>,
    pub sla: Option<SlaBucket>,
}

impl InstanceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_assignee(mut self, assignee: AssigneeFilter) -> Self {
        self.assignee = assignee;
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn with_sla(mut self, bucket: SlaBucket) -> Self {
        self.sla = Some(bucket);
        self
    }

    /// Checks one instance; `segment_attribute` is the kind's segment key
    pub fn matches(
        &self,
        instance: &WorkflowInstance,
        segment_attribute: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if let Some(stage) = &self.stage {
            if instance.current_stage() != stage {
                return false;
            }
        }

        if !self.assignee.matches(instance.assigned_to()) {
            return false;
        }

        if let Some(segment) = &self.segment {
            let value = instance.attribute_str(segment_attribute);

            if !value.is_some_and(|v| v.eq_ignore_ascii_case(segment)) {
                return false;
            }
        }

        if let Some(bucket) = self.sla {
            // Instances without a deadline only show up unfiltered
            match instance.sla_deadline() {
                Some(deadline) if SlaBucket::classify(deadline, now) == bucket => {}
                _ => return false,
            }
        }

        true
    }
}

/// Offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: usize,
    offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Builds a page window; limit is clamped to `1..=MAX_LIMIT`
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Slices a filtered, ordered result set and reports the pre-pagination total
    pub fn apply(&self, items: Vec<WorkflowInstance>) -> InstancePage {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect();

        InstancePage { items, total }
    }
}

/// One page of a filtered listing
#[derive(Debug, Clone)]
pub struct InstancePage {
    pub items: Vec<WorkflowInstance>,
    pub total: usize,
}
