use serde::Deserialize;

use crate::types::{Dependency, ProjectMeta};

// ---------------------------------------------------------------------------
// Raw API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssueData {
    #[serde(default)]
    pipeline: Option<RawPipeline>,
    #[serde(default)]
    estimate: Option<RawEstimate>,
    #[serde(default)]
    is_epic: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawPipeline {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawEstimate {
    value: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEpicList {
    #[serde(default)]
    pub(crate) epic_issues: Vec<RawIssueRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEpicData {
    #[serde(default)]
    pub(crate) issues: Vec<RawIssueRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDependencyList {
    #[serde(default)]
    pub(crate) dependencies: Option<Vec<RawDependency>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDependency {
    blocking: RawIssueRef,
    blocked: RawIssueRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssueRef {
    pub(crate) issue_number: u64,
    #[serde(default)]
    pub(crate) repo_id: Option<u64>,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

impl RawIssueData {
    pub(crate) fn into_domain(self, number: u64) -> ProjectMeta {
        ProjectMeta {
            number,
            pipeline: self.pipeline.map(|p| p.name).filter(|n| !n.is_empty()),
            estimate: self.estimate.map(|e| e.value),
            is_epic: self.is_epic,
        }
    }
}

impl RawIssueRef {
    pub(crate) fn is_in(&self, repo_id: u64) -> bool {
        self.repo_id.is_none_or(|id| id == repo_id)
    }
}

impl RawDependency {
    /// `None` when either end lives in another repository.
    pub(crate) fn into_domain(self, repo_id: u64) -> Option<Dependency> {
        (self.blocking.is_in(repo_id) && self.blocked.is_in(repo_id)).then_some(Dependency {
            blocking: self.blocking.issue_number,
            blocked: self.blocked.issue_number,
        })
    }
}
