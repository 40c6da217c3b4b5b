use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::ExportError;
use crate::types::{Comment, Dependency, Issue, ProjectMeta, RepoRef};

use super::interface::{EpicMap, IssueQuery, IssueSource, MetadataSource};

/// Serves pre-loaded fixture data without any network calls.
///
/// Records every metadata lookup so tests can assert on call order.
#[derive(Debug, Default)]
pub struct StubSource {
    pub issues: Vec<Issue>,
    pub meta: HashMap<u64, ProjectMeta>,
    pub epics: EpicMap,
    pub dependencies: Vec<Dependency>,
    pub comments: HashMap<u64, Vec<Comment>>,
    pub meta_lookups: RefCell<Vec<u64>>,
}

impl IssueSource for StubSource {
    async fn fetch_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>, ExportError> {
        Ok(self
            .issues
            .iter()
            .filter(|issue| query.state.matches(issue.state))
            .cloned()
            .collect())
    }

    async fn fetch_comments(
        &self,
        _repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<Comment>, ExportError> {
        Ok(self.comments.get(&number).cloned().unwrap_or_default())
    }
}

impl MetadataSource for StubSource {
    async fn project_meta(&self, number: u64) -> Result<ProjectMeta, ExportError> {
        self.meta_lookups.borrow_mut().push(number);
        Ok(self
            .meta
            .get(&number)
            .cloned()
            .unwrap_or_else(|| ProjectMeta::absent(number)))
    }

    async fn epic_membership(&self) -> Result<EpicMap, ExportError> {
        Ok(self.epics.clone())
    }

    async fn dependencies(&self) -> Result<Vec<Dependency>, ExportError> {
        Ok(self.dependencies.clone())
    }
}
