//! Deliverable stages with per-group due dates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The four deliverable stages. The camelCase tokens appear in URLs and
/// in the `group_due_dates.stage` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "literatureReview")]
    LiteratureReview,
    #[serde(rename = "methodology")]
    Methodology,
    #[serde(rename = "systemAnalysis")]
    SystemAnalysis,
    #[serde(rename = "systemDesign")]
    SystemDesign,
}

/// All stages in curriculum order.
pub const ALL_STAGES: &[Stage] = &[
    Stage::LiteratureReview,
    Stage::Methodology,
    Stage::SystemAnalysis,
    Stage::SystemDesign,
];

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::LiteratureReview => "literatureReview",
            Stage::Methodology => "methodology",
            Stage::SystemAnalysis => "systemAnalysis",
            Stage::SystemDesign => "systemDesign",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "literatureReview" => Ok(Stage::LiteratureReview),
            "methodology" => Ok(Stage::Methodology),
            "systemAnalysis" => Ok(Stage::SystemAnalysis),
            "systemDesign" => Ok(Stage::SystemDesign),
            other => Err(CoreError::Validation(format!("Unknown stage '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for stage in ALL_STAGES {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), *stage);
        }
    }

    #[test]
    fn test_unknown_stage_is_validation_error() {
        assert!(matches!(
            "finalReport".parse::<Stage>(),
            Err(CoreError::Validation(_))
        ));
    }
}
