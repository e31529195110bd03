//! Situation identifiers and the small enums attached to nodes and relations.

use serde::{Deserialize, Serialize};

/// Situation identifier as it appears in the model description.
pub type SituationId = i64;

/// Whether a situation is reported to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationType {
    #[default]
    Normal,
    Hidden,
}

impl SituationType {
    /// Parse the numeric model code (0 = normal, 1 = hidden).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Normal),
            1 => Some(Self::Hidden),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Normal => 0,
            Self::Hidden => 1,
        }
    }

    pub fn is_observable(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Runtime state of a situation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SituationState {
    /// Unresolved, pending probabilistic refinement.
    Undetermined,
    #[default]
    Untriggered,
    /// Committed by inference rather than by observation.
    Triggering,
    Triggered,
}

impl SituationState {
    /// Hard-evidence value for inference, `None` while undetermined.
    pub fn evidence(&self) -> Option<bool> {
        match self {
            Self::Triggering | Self::Triggered => Some(true),
            Self::Untriggered => Some(false),
            Self::Undetermined => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undetermined => "undetermined",
            Self::Untriggered => "untriggered",
            Self::Triggering => "triggering",
            Self::Triggered => "triggered",
        }
    }
}

impl std::fmt::Display for SituationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a situation relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Cause → effect, weight is the causal strength.
    Causal,
    /// Evidence child → parent, weight is the contribution.
    Hierarchical,
}

/// Combination policy recorded on a relation. Only the weight is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    And,
    Or,
    Sole,
}

impl Combination {
    /// Parse the numeric model code (0 = sole, 1 = and, 2 = or).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Sole),
            1 => Some(Self::And),
            2 => Some(Self::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Sole => "sole",
        }
    }
}
