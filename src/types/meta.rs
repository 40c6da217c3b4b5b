use serde::{Deserialize, Serialize};

/// ZenHub board data for one issue.
///
/// Every field other than the number is optional: an issue that has not been
/// triaged onto the board yields a record with all fields blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub number: u64,
    pub pipeline: Option<String>,
    pub estimate: Option<f64>,
    pub is_epic: Option<bool>,
}

impl ProjectMeta {
    /// Metadata for an issue the board knows nothing about.
    pub fn absent(number: u64) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    pub fn is_absent(&self) -> bool {
        self.pipeline.is_none() && self.estimate.is_none() && self.is_epic.is_none()
    }
}

/// A board dependency: `blocking` must be done before `blocked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub blocking: u64,
    pub blocked: u64,
}
