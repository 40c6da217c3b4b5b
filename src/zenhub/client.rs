use std::collections::HashMap;

use crate::api::{ApiClient, Auth, Pacer};
use crate::config::Settings;
use crate::error::{ErrorKind, ExportError, Service};
use crate::source::{EpicMap, MetadataSource};
use crate::types::{Dependency, ProjectMeta};
use crate::zenhub::types::{RawDependencyList, RawEpicData, RawEpicList, RawIssueData};

const TOKEN_HEADER: &str = "x-authentication-token";

/// REST client for ZenHub's per-repository API.
pub struct ZenHubClient {
    api: ApiClient,
    repo_id: u64,
}

impl ZenHubClient {
    pub fn new(token: &str, repo_id: u64, settings: &Settings) -> Result<Self, ExportError> {
        let api = ApiClient::new(
            Service::ZenHub,
            &settings.zenhub.api_url,
            Auth::Header {
                name: TOKEN_HEADER,
                token: token.to_owned(),
            },
            "application/json",
            &settings.http,
        )?
        .with_pacer(Pacer::per_minute(settings.zenhub.requests_per_minute));
        Ok(Self { api, repo_id })
    }

    fn repo_path(&self, rest: &str) -> String {
        format!("/p1/repositories/{}/{rest}", self.repo_id)
    }
}

impl MetadataSource for ZenHubClient {
    async fn project_meta(&self, number: u64) -> Result<ProjectMeta, ExportError> {
        let path = self.repo_path(&format!("issues/{number}"));
        match self.api.get_json_optional::<RawIssueData>(&path, &[]).await? {
            Some(raw) => Ok(raw.into_domain(number)),
            None => {
                tracing::debug!(
                    number,
                    kind = ?ErrorKind::NotFoundMetadata,
                    "issue not on the board"
                );
                Ok(ProjectMeta::absent(number))
            }
        }
    }

    async fn epic_membership(&self) -> Result<EpicMap, ExportError> {
        let list: RawEpicList = self.api.get_json(&self.repo_path("epics"), &[]).await?;

        let mut membership: EpicMap = HashMap::new();
        for epic in list.epic_issues {
            if !epic.is_in(self.repo_id) {
                continue;
            }
            let path = self.repo_path(&format!("epics/{}", epic.issue_number));
            let Some(data) = self.api.get_json_optional::<RawEpicData>(&path, &[]).await? else {
                tracing::debug!(epic = epic.issue_number, "epic vanished while listing");
                continue;
            };
            for child in data.issues {
                if !child.is_in(self.repo_id) {
                    continue;
                }
                membership
                    .entry(child.issue_number)
                    .or_default()
                    .push(epic.issue_number);
            }
        }
        tracing::info!(issues = membership.len(), "resolved epic membership");
        Ok(membership)
    }

    async fn dependencies(&self) -> Result<Vec<Dependency>, ExportError> {
        let list: RawDependencyList =
            self.api.get_json(&self.repo_path("dependencies"), &[]).await?;
        let dependencies: Vec<Dependency> = list
            .dependencies
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| raw.into_domain(self.repo_id))
            .collect();
        tracing::info!(count = dependencies.len(), "fetched dependencies");
        Ok(dependencies)
    }
}
