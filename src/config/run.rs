use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;

use crate::error::{ConfigError, Service};
use crate::types::{RepoRef, StateFilter};

/// Environment variables holding the GitHub token, in lookup order.
pub const GITHUB_TOKEN_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];
/// Environment variable holding the ZenHub token.
pub const ZENHUB_TOKEN_VAR: &str = "ZENHUB_TOKEN";

// ---------------------------------------------------------------------------
// Raw CLI arguments
// ---------------------------------------------------------------------------

/// Flags of the `export` subcommand, before validation.
#[derive(Debug, Clone, Default, Args)]
pub struct ExportArgs {
    /// Output file (.xlsx or .csv). Defaults to `<repo>.xlsx`.
    #[arg(long = "file_name", value_name = "PATH")]
    pub file_name: Option<PathBuf>,

    /// GitHub repository and ZenHub repository id.
    #[arg(
        long = "repo_list",
        num_args = 2,
        required = true,
        value_names = ["OWNER/REPO", "TRACKER_ID"]
    )]
    pub repo_list: Vec<String>,

    /// Convert issue bodies from Markdown to HTML (1) or keep them raw (0).
    #[arg(long, default_value = "0", value_name = "0|1")]
    pub html: String,

    /// Issue state to export: open, closed or all.
    #[arg(long, default_value = "all")]
    pub state: String,

    /// Only export issues updated on or after this date.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub since: Option<String>,

    /// Fetch and concatenate issue comments.
    #[arg(long)]
    pub comments: bool,

    /// Resolve the epics each issue belongs to.
    #[arg(long)]
    pub epics: bool,

    /// Fill the Blocked and Blocked By columns from board dependencies.
    #[arg(long)]
    pub dependencies: bool,

    /// Fail instead of overwriting an existing output file.
    #[arg(long = "no_clobber")]
    pub no_clobber: bool,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Validated, immutable configuration for one export run.
#[derive(Clone)]
pub struct RunConfig {
    pub repo: RepoRef,
    /// ZenHub repository id (the GitHub repository's numeric id).
    pub tracker_id: u64,
    pub output: PathBuf,
    pub html: bool,
    pub state: StateFilter,
    pub since: Option<NaiveDate>,
    pub include_comments: bool,
    pub include_epics: bool,
    pub include_dependencies: bool,
    pub no_clobber: bool,
    pub github_token: String,
    pub zenhub_token: String,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("repo", &self.repo)
            .field("tracker_id", &self.tracker_id)
            .field("output", &self.output)
            .field("html", &self.html)
            .field("state", &self.state)
            .field("since", &self.since)
            .field("include_comments", &self.include_comments)
            .field("include_epics", &self.include_epics)
            .field("include_dependencies", &self.include_dependencies)
            .field("no_clobber", &self.no_clobber)
            .field("github_token", &"<redacted>")
            .field("zenhub_token", &"<redacted>")
            .finish()
    }
}

impl RunConfig {
    /// Validate CLI arguments and read both tokens through `env`.
    ///
    /// Identifiers come only from the arguments and secrets only from the
    /// environment.
    pub fn resolve<F>(args: &ExportArgs, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (repo_arg, tracker_arg) = match args.repo_list.as_slice() {
            [repo, tracker] => (repo.as_str(), tracker.as_str()),
            other => return Err(ConfigError::InvalidRepository(other.join(" "))),
        };

        let repo = RepoRef::from_full_name(repo_arg)
            .ok_or_else(|| ConfigError::InvalidRepository(repo_arg.to_owned()))?;

        let tracker_id = tracker_arg
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ConfigError::InvalidTrackerId(tracker_arg.to_owned()))?;

        let html = match args.html.trim() {
            "0" => false,
            "1" => true,
            other => return Err(ConfigError::InvalidHtmlFlag(other.to_owned())),
        };

        let state = args
            .state
            .parse::<StateFilter>()
            .map_err(ConfigError::InvalidState)?;

        let since = args
            .since
            .as_deref()
            .map(|s| {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .map_err(|_| ConfigError::InvalidSince(s.to_owned()))
            })
            .transpose()?;

        let output = args
            .file_name
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.xlsx", repo.name)));

        let github_token = GITHUB_TOKEN_VARS
            .iter()
            .find_map(|var| non_empty(&env, var))
            .ok_or(ConfigError::MissingToken {
                service: Service::GitHub,
                vars: "GH_TOKEN or GITHUB_TOKEN",
            })?;
        let zenhub_token =
            non_empty(&env, ZENHUB_TOKEN_VAR).ok_or(ConfigError::MissingToken {
                service: Service::ZenHub,
                vars: ZENHUB_TOKEN_VAR,
            })?;

        Ok(Self {
            repo,
            tracker_id,
            output,
            html,
            state,
            since,
            include_comments: args.comments,
            include_epics: args.epics,
            include_dependencies: args.dependencies,
            no_clobber: args.no_clobber,
            github_token,
            zenhub_token,
        })
    }
}

fn non_empty<F>(env: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(var)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
