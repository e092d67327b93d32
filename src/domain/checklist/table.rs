//! Checklist tables: stage -> ordered required actions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::{PipelineDefinition, PipelineError, PipelineKind};

/// Required checklist items per stage of one pipeline kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistTable {
    stages: HashMap<String, Vec<String>>,
}

impl ChecklistTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage<I, S>(mut self, stage: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages
            .insert(stage.into(), items.into_iter().map(Into::into).collect());
        self
    }

    /// Items for a stage; a stage with no entry has an empty checklist
    pub fn items(&self, stage: &str) -> &[String] {
        self.stages.get(stage).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_item(&self, stage: &str, item: &str) -> bool {
        self.items(stage).iter().any(|i| i == item)
    }

    pub fn has_stage(&self, stage: &str) -> bool {
        self.stages.contains_key(stage)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Rejects tables naming stages the pipeline does not have
    pub fn validate_against(&self, definition: &PipelineDefinition) -> Result<(), PipelineError> {
        for stage in self.stages.keys() {
            if !definition.contains(stage) {
                return Err(PipelineError::unknown_stage(
                    definition.kind().as_str(),
                    stage.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Fills stages missing from `self` with the entries of `fallback`
    pub fn merged_over(mut self, fallback: &ChecklistTable) -> Self {
        for (stage, items) in &fallback.stages {
            self.stages
                .entry(stage.clone())
                .or_insert_with(|| items.clone());
        }
        self
    }

    /// Stage -> items pairs in pipeline order, including empty stages
    pub fn ordered<'a>(&'a self, definition: &'a PipelineDefinition) -> Vec<(&'a str, &'a [String])> {
        definition
            .stages()
            .iter()
            .map(|s| (s.id(), self.items(s.id())))
            .collect()
    }
}

/// Built-in checklist table for a pipeline kind
pub fn builtin_checklist(kind: PipelineKind) -> ChecklistTable {
    match kind {
        PipelineKind::Originators => ChecklistTable::new()
            .with_stage(
                "lead",
                ["Contato inicial realizado", "Apresentação institucional enviada"],
            )
            .with_stage(
                "documentacao",
                [
                    "Contrato social recebido",
                    "Balanços dos últimos 2 anos recebidos",
                    "Documentos dos sócios recebidos",
                ],
            )
            .with_stage(
                "analise_credito",
                [
                    "Consulta a bureaus de crédito",
                    "Análise de demonstrações financeiras",
                    "Rating interno atribuído",
                ],
            )
            .with_stage(
                "comite",
                ["Parecer de crédito anexado", "Ata do comitê registrada"],
            ),
        PipelineKind::Receivables => ChecklistTable::new()
            .with_stage(
                "recebido",
                [
                    "Arquivo de remessa importado",
                    "Lastro documental anexado",
                    "Cedente com cadastro ativo",
                ],
            )
            .with_stage(
                "validacao",
                [
                    "Duplicatas validadas na registradora",
                    "Sacado confirmado",
                ],
            )
            .with_stage(
                "analise_risco",
                [
                    "Concentração por sacado verificada",
                    "Limite do cedente verificado",
                    "Score de risco calculado",
                ],
            )
            .with_stage(
                "aprovado",
                ["Termo de cessão assinado", "Pagamento ao cedente agendado"],
            ),
        PipelineKind::Allocation => ChecklistTable::new()
            .with_stage(
                "proposta",
                ["Valor e prazo definidos", "Fundo de destino selecionado"],
            )
            .with_stage(
                "matching",
                [
                    "Critérios de elegibilidade conferidos",
                    "Enquadramento do regulamento verificado",
                ],
            )
            .with_stage(
                "aprovacao",
                ["Aprovação da gestora", "Aprovação do custodiante"],
            )
            .with_stage(
                "formalizacao",
                [
                    "Contrato de cessão formalizado",
                    "Registro na registradora concluído",
                    "Liquidação financeira confirmada",
                ],
            ),
        PipelineKind::Monitoring => ChecklistTable::new()
            .with_stage(
                "ativo",
                ["Conciliação de pagamentos do período"],
            )
            .with_stage(
                "revisao",
                [
                    "Indicadores de inadimplência revisados",
                    "Covenants verificados",
                ],
            )
            .with_stage(
                "alerta",
                ["Cedente notificado", "Plano de ação registrado"],
            )
            .with_stage(
                "renegociacao",
                [
                    "Proposta de renegociação aprovada",
                    "Aditivo contratual assinado",
                ],
            ),
    }
}
