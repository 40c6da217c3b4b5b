use std::collections::HashSet;

use crate::config::RunConfig;
use crate::error::ExportError;
use crate::markdown::render_body;
use crate::source::{BlockerMap, EpicMap, IssueSource, MetadataSource};
use crate::types::{Comment, Dependency, Issue, IssueState, MergedRecord, ProjectMeta, RepoRef};

/// Log progress every this many issues.
const PROGRESS_EVERY: usize = 50;

/// Per-run switches that shape each record.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub repo: RepoRef,
    pub html: bool,
    pub include_comments: bool,
}

impl MergeOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            repo: config.repo.clone(),
            html: config.html,
            include_comments: config.include_comments,
        }
    }
}

/// Board relations resolved once per run, keyed by issue number.
#[derive(Debug, Clone, Default)]
pub struct BoardLinks {
    pub epics: EpicMap,
    pub blocked_by: BlockerMap,
}

/// Map each blocked issue to its blockers.
///
/// An edge is dropped when either end is a closed issue of this export.
/// Issues outside the export are taken as open.
pub fn blockers_by_issue(dependencies: &[Dependency], issues: &[Issue]) -> BlockerMap {
    let closed: HashSet<u64> = issues
        .iter()
        .filter(|issue| issue.state == IssueState::Closed)
        .map(|issue| issue.number)
        .collect();

    let mut blockers = BlockerMap::new();
    for dep in dependencies {
        if closed.contains(&dep.blocked) || closed.contains(&dep.blocking) {
            continue;
        }
        blockers.entry(dep.blocked).or_default().push(dep.blocking);
    }
    blockers
}

/// Join every issue with its board data, one metadata lookup per issue, in
/// fetch order. Issues the board does not know get blank metadata.
pub async fn merge_records<I, M>(
    issues: Vec<Issue>,
    tracker: &I,
    board: &M,
    links: &BoardLinks,
    opts: &MergeOptions,
) -> Result<Vec<MergedRecord>, ExportError>
where
    I: IssueSource,
    M: MetadataSource,
{
    let total = issues.len();
    let mut records = Vec::with_capacity(total);

    for (idx, issue) in issues.into_iter().enumerate() {
        let meta = board.project_meta(issue.number).await?;

        let comments = if opts.include_comments && issue.comment_count > 0 {
            let comments = tracker.fetch_comments(&opts.repo, issue.number).await?;
            Some(format_comments(&comments))
        } else {
            None
        };

        let epics = links.epics.get(&issue.number).cloned().unwrap_or_default();
        let blocked_by = links
            .blocked_by
            .get(&issue.number)
            .cloned()
            .unwrap_or_default();
        records.push(merge_one(issue, meta, epics, blocked_by, comments, opts));

        let done = idx + 1;
        if done % PROGRESS_EVERY == 0 || done == total {
            tracing::info!(done, total, "merged issues");
        }
    }

    Ok(records)
}

/// Build the row for one issue.
pub fn merge_one(
    issue: Issue,
    meta: ProjectMeta,
    mut epics: Vec<u64>,
    mut blocked_by: Vec<u64>,
    comments: Option<String>,
    opts: &MergeOptions,
) -> MergedRecord {
    let meta = if meta.number == issue.number {
        meta
    } else {
        tracing::warn!(
            issue = issue.number,
            meta = meta.number,
            "board data belongs to another issue, ignoring it"
        );
        ProjectMeta::absent(issue.number)
    };
    for numbers in [&mut epics, &mut blocked_by] {
        numbers.sort_unstable();
        numbers.dedup();
    }

    MergedRecord {
        repository: opts.repo.full_name(),
        number: issue.number,
        priority: issue.priority().map(str::to_owned),
        labels: issue.label_names(),
        assignees: issue.assignee_logins(),
        body: render_body(issue.number, &issue.body, opts.html),
        title: issue.title,
        state: issue.state,
        pipeline: meta.pipeline,
        estimate: meta.estimate,
        is_epic: meta.is_epic,
        epics,
        blocked_by,
        author: issue.author.map(|a| a.login),
        milestone_due: issue.milestone.as_ref().and_then(|m| m.due_on),
        milestone: issue.milestone.map(|m| m.title),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        comments,
    }
}

/// Comments as `@login - body`, oldest first, separated by blank lines.
pub fn format_comments(comments: &[Comment]) -> String {
    comments
        .iter()
        .map(|c| match &c.author {
            Some(login) => format!("@{login} - {}", c.body),
            None => c.body.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
