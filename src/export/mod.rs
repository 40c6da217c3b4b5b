// The export pipeline: fetch issues, join board data, write the sheet.

pub mod merge;
pub mod writer;

use std::path::PathBuf;

use crate::config::{RunConfig, Settings};
use crate::error::{ExportError, WriteError};
use crate::github::GitHubClient;
use crate::source::{BlockerMap, EpicMap, IssueQuery, IssueSource, MetadataSource};
use crate::zenhub::ZenHubClient;

pub use merge::{BoardLinks, MergeOptions, blockers_by_issue, merge_records};
pub use writer::{OutputFormat, write_records};

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Run a full export against the live services.
pub async fn run_export(
    config: &RunConfig,
    settings: &Settings,
) -> Result<ExportSummary, ExportError> {
    // Refuse to clobber before spending any requests.
    if config.no_clobber && config.output.exists() {
        return Err(WriteError::Exists {
            path: config.output.clone(),
        }
        .into());
    }

    let github = GitHubClient::new(&config.github_token, settings)?;
    let zenhub = ZenHubClient::new(&config.zenhub_token, config.tracker_id, settings)?;
    export_with(config, &github, &zenhub).await
}

/// Run the pipeline over any tracker and board.
///
/// Nothing touches the output path until every issue has been fetched and
/// merged, so a failed run writes no rows.
pub async fn export_with<I, M>(
    config: &RunConfig,
    tracker: &I,
    board: &M,
) -> Result<ExportSummary, ExportError>
where
    I: IssueSource,
    M: MetadataSource,
{
    let query = IssueQuery::from_config(config);
    let issues = tracker.fetch_issues(&query).await?;

    let epics = if config.include_epics {
        board.epic_membership().await?
    } else {
        EpicMap::new()
    };

    let blocked_by = if config.include_dependencies {
        let dependencies = board.dependencies().await?;
        blockers_by_issue(&dependencies, &issues)
    } else {
        BlockerMap::new()
    };

    let links = BoardLinks { epics, blocked_by };
    let records =
        merge_records(issues, tracker, board, &links, &MergeOptions::from_config(config)).await?;
    let rows = write_records(&config.output, &records, config.no_clobber)?;

    Ok(ExportSummary {
        path: config.output.clone(),
        rows,
    })
}
