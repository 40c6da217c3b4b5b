use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::RunConfig;
use crate::error::ExportError;
use crate::types::{Comment, Dependency, Issue, ProjectMeta, RepoRef, StateFilter};

/// Issue number → numbers of the epics containing it.
pub type EpicMap = HashMap<u64, Vec<u64>>;
/// Blocked issue number → numbers of the open issues blocking it.
pub type BlockerMap = HashMap<u64, Vec<u64>>;

/// Which issues to list from the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub repo: RepoRef,
    pub state: StateFilter,
    /// Only issues updated at or after midnight UTC of this date.
    pub since: Option<NaiveDate>,
}

impl IssueQuery {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            repo: config.repo.clone(),
            state: config.state,
            since: config.since,
        }
    }
}

/// The primary issue tracker.
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    /// Every issue matching `query`, in tracker order. Pull requests are
    /// excluded.
    async fn fetch_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>, ExportError>;

    /// Comments on one issue, oldest first.
    async fn fetch_comments(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<Comment>, ExportError>;
}

/// The project board add-on.
#[allow(async_fn_in_trait)]
pub trait MetadataSource {
    /// Board data for one issue. An issue unknown to the board yields
    /// `ProjectMeta::absent(number)`, never an error.
    async fn project_meta(&self, number: u64) -> Result<ProjectMeta, ExportError>;

    /// Epic membership for the whole board.
    async fn epic_membership(&self) -> Result<EpicMap, ExportError>;

    /// Every dependency recorded between issues of the repository.
    async fn dependencies(&self) -> Result<Vec<Dependency>, ExportError>;
}
