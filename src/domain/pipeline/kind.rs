//! Pipeline kind enumeration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// The four tracked business processes of the fund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// Onboarding of originators (cedentes)
    Originators,
    /// Intake of receivables (recebiveis)
    Receivables,
    /// Fund allocation / matching
    Allocation,
    /// Post-allocation monitoring cycles
    Monitoring,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 4] = [
        PipelineKind::Originators,
        PipelineKind::Receivables,
        PipelineKind::Allocation,
        PipelineKind::Monitoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Originators => "originators",
            Self::Receivables => "receivables",
            Self::Allocation => "allocation",
            Self::Monitoring => "monitoring",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PipelineKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "originators" | "originator" | "cedentes" => Ok(Self::Originators),
            "receivables" | "receivable" | "recebiveis" => Ok(Self::Receivables),
            "allocation" | "allocations" | "alocacao" => Ok(Self::Allocation),
            "monitoring" | "monitoramento" => Ok(Self::Monitoring),
            other => Err(PipelineError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("receivables".parse::<PipelineKind>().unwrap(), PipelineKind::Receivables);
        assert_eq!("Originators".parse::<PipelineKind>().unwrap(), PipelineKind::Originators);
        assert_eq!("alocacao".parse::<PipelineKind>().unwrap(), PipelineKind::Allocation);
        assert!("treasury".parse::<PipelineKind>().is_err());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&PipelineKind::Monitoring).unwrap();
        assert_eq!(json, "\"monitoring\"");

        let kind: PipelineKind = serde_json::from_str("\"allocation\"").unwrap();
        assert_eq!(kind, PipelineKind::Allocation);
    }

    #[test]
    fn test_display_matches_as_str() {
        for kind in PipelineKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }
}
