//! Workflow instance entity

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::pipeline::PipelineKind;
use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Maximum length for instance IDs
pub const MAX_ID_LENGTH: usize = 64;

static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$").unwrap());

/// Validated instance identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_instance_id(&id)?;
        Ok(Self(id))
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InstanceId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InstanceId> for String {
    fn from(id: InstanceId) -> Self {
        id.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for InstanceId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn validate_instance_id(id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::invalid_id("Instance ID cannot be empty"));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(DomainError::invalid_id(format!(
            "Instance ID exceeds maximum length of {} characters",
            MAX_ID_LENGTH
        )));
    }

    if !ID_PATTERN.is_match(id) {
        return Err(DomainError::invalid_id(format!(
            "Invalid instance ID '{}': must be alphanumeric with hyphens or underscores",
            id
        )));
    }

    Ok(())
}

/// A tracked item moving through one pipeline: an originator, a receivable,
/// an allocation or a monitoring cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    id: InstanceId,
    pipeline_kind: PipelineKind,
    current_stage: String,
    /// Checklist items of `current_stage` not yet completed, in checklist order
    pending_items: Vec<String>,
    #[serde(default)]
    assigned_to: Option<String>,
    #[serde(default)]
    sla_deadline: Option<DateTime<Utc>>,
    status_started_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Bumped on every mutation
    #[serde(default)]
    version: u64,
    /// Pipeline-specific attributes, opaque to the engine
    #[serde(default)]
    attributes: Map<String, Value>,
}

impl WorkflowInstance {
    /// Creates an instance sitting at `stage` with the given pending checklist
    pub fn new(
        id: InstanceId,
        pipeline_kind: PipelineKind,
        stage: impl Into<String>,
        pending_items: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            pipeline_kind,
            current_stage: stage.into(),
            pending_items,
            assigned_to: None,
            sla_deadline: None,
            status_started_at: now,
            created_at: now,
            updated_at: now,
            version: 1,
            attributes: Map::new(),
        }
    }

    // Builder methods

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_assigned_to(mut self, owner: Option<String>) -> Self {
        self.assigned_to = owner;
        self
    }

    pub fn with_sla_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.sla_deadline = deadline;
        self
    }

    // Getters

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn pipeline_kind(&self) -> PipelineKind {
        self.pipeline_kind
    }

    pub fn current_stage(&self) -> &str {
        &self.current_stage
    }

    pub fn pending_items(&self) -> &[String] {
        &self.pending_items
    }

    pub fn has_pending_items(&self) -> bool {
        !self.pending_items.is_empty()
    }

    pub fn assigned_to(&self) -> Option<&str> {
        self.assigned_to.as_deref()
    }

    pub fn sla_deadline(&self) -> Option<DateTime<Utc>> {
        self.sla_deadline
    }

    pub fn status_started_at(&self) -> DateTime<Utc> {
        self.status_started_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// String value of an attribute, if present and textual
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    /// Whole days elapsed since the instance entered its current stage
    pub fn days_in_stage(&self, now: DateTime<Utc>) -> i64 {
        (now - self.status_started_at).num_days().max(0)
    }

    // Mutators. Stage changes go through the transition engine only.

    /// Moves to `stage`, resetting the stage clock and the pending checklist
    pub(crate) fn enter_stage(
        &mut self,
        stage: impl Into<String>,
        pending_items: Vec<String>,
        sla_deadline: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        self.current_stage = stage.into();
        self.pending_items = pending_items;
        self.sla_deadline = sla_deadline;
        self.status_started_at = now;
        self.touch(now);
    }

    /// Overwrites the pending checklist without touching the stage
    pub(crate) fn set_pending_items(&mut self, items: Vec<String>, now: DateTime<Utc>) {
        self.pending_items = items;
        self.touch(now);
    }

    pub(crate) fn assign(&mut self, owner: Option<String>, now: DateTime<Utc>) {
        self.assigned_to = owner;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}

impl StorageEntity for WorkflowInstance {
    type Key = InstanceId;

    fn key(&self) -> &Self::Key {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn instance() -> WorkflowInstance {
        WorkflowInstance::new(
            InstanceId::new("rec-1").unwrap(),
            PipelineKind::Receivables,
            "recebido",
            vec!["A".into(), "B".into()],
            t0(),
        )
    }

    #[test]
    fn test_instance_id_valid() {
        assert!(InstanceId::new("rec-1").is_ok());
        assert!(InstanceId::new("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(InstanceId::new("with_underscore").is_ok());
    }

    #[test]
    fn test_instance_id_invalid() {
        assert!(InstanceId::new("").is_err());
        assert!(InstanceId::new("-leading").is_err());
        assert!(InstanceId::new("has spaces").is_err());
        assert!(InstanceId::new("a".repeat(65)).is_err());
    }

    #[test]
    fn test_generated_id_is_valid() {
        let id = InstanceId::generate();
        assert!(validate_instance_id(id.as_str()).is_ok());
    }

    #[test]
    fn test_new_instance_defaults() {
        let inst = instance();
        assert_eq!(inst.current_stage(), "recebido");
        assert_eq!(inst.pending_items().len(), 2);
        assert_eq!(inst.status_started_at(), t0());
        assert_eq!(inst.version(), 1);
        assert!(inst.assigned_to().is_none());
    }

    #[test]
    fn test_enter_stage_resets_clock() {
        let mut inst = instance();
        let later = t0() + Duration::days(3);

        inst.enter_stage("validacao", vec!["C".into()], None, later);

        assert_eq!(inst.current_stage(), "validacao");
        assert_eq!(inst.status_started_at(), later);
        assert_eq!(inst.updated_at(), later);
        assert_eq!(inst.version(), 2);
    }

    #[test]
    fn test_set_pending_does_not_reset_clock() {
        let mut inst = instance();
        let later = t0() + Duration::hours(5);

        inst.set_pending_items(vec![], later);

        assert!(!inst.has_pending_items());
        assert_eq!(inst.status_started_at(), t0());
        assert_eq!(inst.updated_at(), later);
    }

    #[test]
    fn test_days_in_stage() {
        let inst = instance();
        assert_eq!(inst.days_in_stage(t0() + Duration::hours(47)), 1);
        assert_eq!(inst.days_in_stage(t0() + Duration::days(4)), 4);
        assert_eq!(inst.days_in_stage(t0() - Duration::days(1)), 0);
    }

    #[test]
    fn test_serialization_roundtrip_keeps_attributes() {
        let mut attrs = Map::new();
        attrs.insert("debtor".into(), Value::String("ACME".into()));
        let inst = instance().with_attributes(attrs);

        let json = serde_json::to_value(&inst).unwrap();
        assert_eq!(json["pipeline_kind"], "receivables");
        assert_eq!(json["attributes"]["debtor"], "ACME");

        let back: WorkflowInstance = serde_json::from_value(json).unwrap();
        assert_eq!(back, inst);
        assert_eq!(back.attribute_str("debtor"), Some("ACME"));
    }
}
