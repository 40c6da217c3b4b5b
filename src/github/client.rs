use crate::api::{ApiClient, Auth};
use crate::config::Settings;
use crate::error::{ExportError, Service};
use crate::github::types::{RawComment, RawIssue};
use crate::source::{IssueQuery, IssueSource};
use crate::types::{Comment, Issue, RepoRef};

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
/// GitHub's maximum page size, used for comment listings.
const MAX_PAGE_SIZE: u32 = 100;

/// REST client for the GitHub issues API.
pub struct GitHubClient {
    api: ApiClient,
    page_size: u32,
}

impl GitHubClient {
    pub fn new(token: &str, settings: &Settings) -> Result<Self, ExportError> {
        let api = ApiClient::new(
            Service::GitHub,
            &settings.github.api_url,
            Auth::Bearer(token.to_owned()),
            ACCEPT_GITHUB_JSON,
            &settings.http,
        )?;
        Ok(Self {
            api,
            page_size: settings.github.page_size,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// A lazy page-by-page listing of the issues matching `query`.
    pub fn issue_pages(&self, query: &IssueQuery) -> IssuePages<'_> {
        let mut params = vec![
            ("state", query.state.as_query().to_owned()),
            ("per_page", self.page_size.to_string()),
        ];
        if let Some(since) = query.since {
            params.push(("since", format!("{}T00:00:00Z", since.format("%Y-%m-%d"))));
        }
        IssuePages {
            client: self,
            path: format!("/repos/{}/{}/issues", query.repo.owner, query.repo.name),
            params,
            query: query.clone(),
            next_page: 1,
            exhausted: false,
        }
    }
}

/// Pages of issues, fetched on demand.
///
/// Listing stops after the first page holding fewer than `page_size` raw
/// items (pull requests included, since they count toward the page).
pub struct IssuePages<'a> {
    client: &'a GitHubClient,
    path: String,
    params: Vec<(&'static str, String)>,
    query: IssueQuery,
    next_page: u32,
    exhausted: bool,
}

impl IssuePages<'_> {
    /// Fetch the next page. `Ok(None)` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Issue>>, ExportError> {
        if self.exhausted {
            return Ok(None);
        }

        let mut params = self.params.clone();
        params.push(("page", self.next_page.to_string()));
        let raw: Vec<RawIssue> = self.client.api.get_json(&self.path, &params).await?;

        let fetched = raw.len();
        self.exhausted = fetched < self.client.page_size as usize;
        tracing::debug!(
            repo = %self.query.repo,
            page = self.next_page,
            fetched,
            "fetched issue page"
        );
        self.next_page += 1;

        let issues = raw
            .into_iter()
            .filter(|r| !r.is_pull_request())
            .map(RawIssue::into_domain)
            .filter(|issue| {
                let keep = self.query.state.matches(issue.state);
                if !keep {
                    tracing::debug!(number = issue.number, "dropping issue outside state filter");
                }
                keep
            })
            .collect();
        Ok(Some(issues))
    }

    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> u32 {
        self.next_page - 1
    }

    /// Drain every remaining page.
    pub async fn collect_all(mut self) -> Result<Vec<Issue>, ExportError> {
        let mut issues = Vec::new();
        while let Some(page) = self.next_page().await? {
            issues.extend(page);
        }
        Ok(issues)
    }
}

impl IssueSource for GitHubClient {
    async fn fetch_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>, ExportError> {
        let issues = self.issue_pages(query).collect_all().await?;
        tracing::info!(repo = %query.repo, count = issues.len(), "fetched issues");
        Ok(issues)
    }

    async fn fetch_comments(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<Vec<Comment>, ExportError> {
        let path = format!("/repos/{}/{}/issues/{number}/comments", repo.owner, repo.name);
        let mut comments = Vec::new();
        let mut page = 1_u32;
        loop {
            let params = [
                ("per_page", MAX_PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];
            let raw: Vec<RawComment> = self.api.get_json(&path, &params).await?;
            let fetched = raw.len();
            comments.extend(raw.into_iter().map(RawComment::into_domain));
            if fetched < MAX_PAGE_SIZE as usize {
                return Ok(comments);
            }
            page += 1;
        }
    }
}
