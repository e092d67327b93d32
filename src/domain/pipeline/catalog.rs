//! Pipeline catalog - static stage configuration for every pipeline kind

use std::collections::HashMap;

use super::definition::{PipelineDefinition, StageDefinition, StageDirection};
use super::error::PipelineError;
use super::kind::PipelineKind;

/// Lookup of pipeline definitions keyed by kind
#[derive(Debug, Clone)]
pub struct PipelineCatalog {
    definitions: HashMap<PipelineKind, PipelineDefinition>,
}

impl PipelineCatalog {
    /// Builds a catalog, requiring one definition per kind
    pub fn new(definitions: Vec<PipelineDefinition>) -> Result<Self, PipelineError> {
        let mut map = HashMap::new();

        for definition in definitions {
            definition.validate()?;
            map.insert(definition.kind(), definition);
        }

        for kind in PipelineKind::ALL {
            if !map.contains_key(&kind) {
                return Err(PipelineError::MissingDefinition(kind.to_string()));
            }
        }

        Ok(Self { definitions: map })
    }

    /// Catalog with the fund's standard pipelines
    pub fn builtin() -> Result<Self, PipelineError> {
        Self::new(builtin_definitions()?)
    }

    pub fn definition(&self, kind: PipelineKind) -> &PipelineDefinition {
        // new() guarantees every kind is present
        &self.definitions[&kind]
    }

    /// All definitions in canonical kind order
    pub fn definitions(&self) -> Vec<&PipelineDefinition> {
        PipelineKind::ALL
            .iter()
            .map(|kind| self.definition(*kind))
            .collect()
    }

    pub fn stages_of(&self, kind: PipelineKind) -> Vec<&str> {
        self.definition(kind).stage_ids()
    }

    pub fn index_of(&self, kind: PipelineKind, stage: &str) -> Result<usize, PipelineError> {
        self.definition(kind).index_of(stage)
    }

    pub fn is_terminal(&self, kind: PipelineKind, stage: &str) -> Result<bool, PipelineError> {
        self.definition(kind).is_terminal(stage)
    }

    pub fn first_stage(&self, kind: PipelineKind) -> &StageDefinition {
        self.definition(kind).first_stage()
    }

    pub fn stage(&self, kind: PipelineKind, stage: &str) -> Result<&StageDefinition, PipelineError> {
        self.definition(kind).stage(stage)
    }

    pub fn direction(
        &self,
        kind: PipelineKind,
        from: &str,
        to: &str,
    ) -> Result<StageDirection, PipelineError> {
        self.definition(kind).direction(from, to)
    }
}

fn builtin_definitions() -> Result<Vec<PipelineDefinition>, PipelineError> {
    Ok(vec![
        PipelineDefinition::new(
            PipelineKind::Originators,
            vec![
                StageDefinition::new("lead", "Lead").with_sla_days(5),
                StageDefinition::new("documentacao", "Documentação").with_sla_days(7),
                StageDefinition::new("analise_credito", "Análise de Crédito").with_sla_days(5),
                StageDefinition::new("comite", "Comitê").with_sla_days(3),
                StageDefinition::new("aprovado", "Aprovado").terminal(),
                StageDefinition::new("reprovado", "Reprovado").terminal(),
            ],
            vec!["company_name", "cnpj"],
            "segment",
        )?,
        PipelineDefinition::new(
            PipelineKind::Receivables,
            vec![
                StageDefinition::new("recebido", "Recebido").with_sla_days(1),
                StageDefinition::new("validacao", "Validação").with_sla_days(2),
                StageDefinition::new("analise_risco", "Análise de Risco").with_sla_days(3),
                StageDefinition::new("aprovado", "Aprovado").with_sla_days(2),
                StageDefinition::new("liquidado", "Liquidado").terminal(),
                StageDefinition::new("rejeitado", "Rejeitado").terminal(),
            ],
            vec!["debtor", "face_value"],
            "fund",
        )?,
        PipelineDefinition::new(
            PipelineKind::Allocation,
            vec![
                StageDefinition::new("proposta", "Proposta").with_sla_days(2),
                StageDefinition::new("matching", "Matching").with_sla_days(2),
                StageDefinition::new("aprovacao", "Aprovação").with_sla_days(1),
                StageDefinition::new("formalizacao", "Formalização").with_sla_days(3),
                StageDefinition::new("alocado", "Alocado").terminal(),
                StageDefinition::new("cancelado", "Cancelado").terminal(),
            ],
            vec!["fund", "amount"],
            "fund",
        )?,
        PipelineDefinition::new(
            PipelineKind::Monitoring,
            vec![
                StageDefinition::new("ativo", "Ativo").with_sla_days(30),
                StageDefinition::new("revisao", "Revisão").with_sla_days(5),
                StageDefinition::new("alerta", "Alerta").with_sla_days(2),
                StageDefinition::new("renegociacao", "Renegociação").with_sla_days(10),
                StageDefinition::new("encerrado", "Encerrado").terminal(),
            ],
            vec!["originator", "cycle"],
            "segment",
        )?,
    ])
}
