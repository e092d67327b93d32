//! Stages command - prints a pipeline's stage order and built-in checklist

use std::fmt::Write;

use crate::domain::{builtin_checklist, PipelineCatalog, PipelineKind};

pub fn run(kind: PipelineKind) -> anyhow::Result<()> {
    let catalog = PipelineCatalog::builtin()?;
    print!("{}", render(&catalog, kind)?);
    Ok(())
}

fn render(catalog: &PipelineCatalog, kind: PipelineKind) -> anyhow::Result<String> {
    let definition = catalog.definition(kind);
    let checklist = builtin_checklist(kind);
    let mut out = String::new();

    writeln!(out, "Pipeline: {}", kind)?;

    for (position, stage) in definition.stages().iter().enumerate() {
        let mut flags = Vec::new();
        if stage.is_terminal() {
            flags.push("terminal".to_string());
        }
        if let Some(days) = stage.sla_days() {
            flags.push(format!("SLA {}d", days));
        }

        let suffix = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };

        writeln!(out, "{}. {} [{}]{}", position + 1, stage.label(), stage.id(), suffix)?;

        for item in checklist.items(stage.id()) {
            writeln!(out, "   - {}", item)?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_stages_in_order() {
        let catalog = PipelineCatalog::builtin().unwrap();
        let out = render(&catalog, PipelineKind::Monitoring).unwrap();

        assert!(out.starts_with("Pipeline: monitoring\n"));
        assert!(out.contains("1. Ativo [ativo] (SLA 30d)"));
        assert!(out.contains("5. Encerrado [encerrado] (terminal)"));

        let ativo = out.find("[ativo]").unwrap();
        let revisao = out.find("[revisao]").unwrap();
        assert!(ativo < revisao);
    }

    #[test]
    fn test_render_includes_checklist_items() {
        let catalog = PipelineCatalog::builtin().unwrap();
        let out = render(&catalog, PipelineKind::Originators).unwrap();

        assert!(out.contains("   - Contrato social recebido"));
    }
}
