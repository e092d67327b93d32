//! Demo data for local development

use serde_json::json;
use tracing::info;

use crate::domain::{DomainError, PipelineKind};

use super::instance_service::{CreateInstanceRequest, InstanceServiceTrait};

/// Creates a handful of instances in every pipeline, returning how many
pub async fn seed_demo_data(service: &dyn InstanceServiceTrait) -> Result<usize, DomainError> {
    let fixtures = [
        (
            PipelineKind::Originators,
            json!({"company_name": "Metalúrgica Horizonte Ltda", "cnpj": "12.345.678/0001-90", "segment": "industria"}),
            Some("Maria Silva"),
        ),
        (
            PipelineKind::Originators,
            json!({"company_name": "Agro Campos SA", "cnpj": "98.765.432/0001-10", "segment": "agro"}),
            None,
        ),
        (
            PipelineKind::Receivables,
            json!({"debtor": "Varejo Bom Preço SA", "face_value": 48250.00, "fund": "FIDC Alpha"}),
            Some("João Souza"),
        ),
        (
            PipelineKind::Receivables,
            json!({"debtor": "Distribuidora Norte Ltda", "face_value": 12900.50, "fund": "FIDC Beta"}),
            None,
        ),
        (
            PipelineKind::Allocation,
            json!({"fund": "FIDC Alpha", "amount": 1500000, "originator": "Metalúrgica Horizonte Ltda"}),
            Some("Maria Silva"),
        ),
        (
            PipelineKind::Monitoring,
            json!({"originator": "Agro Campos SA", "cycle": "2026-09", "segment": "agro"}),
            None,
        ),
    ];

    let mut created = 0;

    for (kind, attributes, owner) in fixtures {
        service
            .create(
                kind,
                CreateInstanceRequest {
                    attributes,
                    assigned_to: owner.map(str::to_string),
                    ..Default::default()
                },
            )
            .await?;
        created += 1;
    }

    info!(count = created, "Seeded demo instances");
    Ok(created)
}
