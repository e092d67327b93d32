//! Pipeline and stage definitions

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::kind::PipelineKind;

/// A named position in a pipeline's total order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    id: String,
    label: String,
    #[serde(default)]
    terminal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sla_days: Option<i64>,
}

impl StageDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            terminal: false,
            sla_days: None,
        }
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn with_sla_days(mut self, days: i64) -> Self {
        self.sla_days = Some(days);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn sla_days(&self) -> Option<i64> {
        self.sla_days
    }
}

/// Relative direction of a stage change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageDirection {
    Forward,
    Backward,
    Same,
}

impl StageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Same => "same",
        }
    }
}

/// Ordered stage list plus per-kind attribute rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    kind: PipelineKind,
    stages: Vec<StageDefinition>,
    #[serde(default)]
    required_attributes: Vec<String>,
    segment_attribute: String,
}

impl PipelineDefinition {
    /// Builds and validates a definition
    pub fn new(
        kind: PipelineKind,
        stages: Vec<StageDefinition>,
        required_attributes: Vec<&str>,
        segment_attribute: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let definition = Self {
            kind,
            stages,
            required_attributes: required_attributes.into_iter().map(String::from).collect(),
            segment_attribute: segment_attribute.into(),
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Checks ordering invariants: non-empty, unique ids, non-terminal entry stage
    pub fn validate(&self) -> Result<(), PipelineError> {
        let first = self
            .stages
            .first()
            .ok_or_else(|| PipelineError::EmptyPipeline(self.kind.to_string()))?;

        if first.is_terminal() {
            return Err(PipelineError::TerminalFirstStage(self.kind.to_string()));
        }

        let mut seen = HashSet::new();

        for stage in &self.stages {
            if !seen.insert(stage.id()) {
                return Err(PipelineError::DuplicateStage {
                    kind: self.kind.to_string(),
                    stage: stage.id().to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    pub fn stage_ids(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    pub fn required_attributes(&self) -> &[String] {
        &self.required_attributes
    }

    pub fn segment_attribute(&self) -> &str {
        &self.segment_attribute
    }

    /// Entry stage for new instances
    pub fn first_stage(&self) -> &StageDefinition {
        // validate() guarantees at least one stage
        &self.stages[0]
    }

    pub fn stage(&self, id: &str) -> Result<&StageDefinition, PipelineError> {
        self.stages
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| PipelineError::unknown_stage(self.kind.as_str(), id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stages.iter().any(|s| s.id() == id)
    }

    pub fn index_of(&self, id: &str) -> Result<usize, PipelineError> {
        self.stages
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| PipelineError::unknown_stage(self.kind.as_str(), id))
    }

    pub fn is_terminal(&self, id: &str) -> Result<bool, PipelineError> {
        Ok(self.stage(id)?.is_terminal())
    }

    /// Direction of a move from `from` to `to` in this pipeline's order
    pub fn direction(&self, from: &str, to: &str) -> Result<StageDirection, PipelineError> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;

        Ok(match to_idx.cmp(&from_idx) {
            std::cmp::Ordering::Greater => StageDirection::Forward,
            std::cmp::Ordering::Less => StageDirection::Backward,
            std::cmp::Ordering::Equal => StageDirection::Same,
        })
    }
}
