use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{Actor, Comment, Issue, IssueState, Label, Milestone};

// ---------------------------------------------------------------------------
// Raw REST response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    state: String,
    #[serde(default)]
    user: Option<RawActor>,
    #[serde(default)]
    labels: Vec<RawLabel>,
    #[serde(default)]
    assignees: Vec<RawActor>,
    #[serde(default)]
    milestone: Option<RawMilestone>,
    #[serde(default)]
    comments: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Present only when the "issue" is a pull request.
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawActor {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawMilestone {
    title: String,
    #[serde(default)]
    due_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComment {
    #[serde(default)]
    user: Option<RawActor>,
    #[serde(default)]
    body: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

fn parse_state(s: &str) -> IssueState {
    match s {
        "open" => IssueState::Open,
        "closed" => IssueState::Closed,
        _ => IssueState::Unknown,
    }
}

impl RawIssue {
    pub(crate) fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub(crate) fn into_domain(self) -> Issue {
        Issue {
            number: self.number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            state: parse_state(&self.state),
            author: self.user.map(|u| Actor { login: u.login }),
            labels: self
                .labels
                .into_iter()
                .map(|l| Label { name: l.name })
                .collect(),
            assignees: self
                .assignees
                .into_iter()
                .map(|a| Actor { login: a.login })
                .collect(),
            milestone: self.milestone.map(|m| Milestone {
                title: m.title,
                due_on: m.due_on,
            }),
            comment_count: self.comments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl RawComment {
    pub(crate) fn into_domain(self) -> Comment {
        Comment {
            author: self.user.map(|u| u.login),
            body: self.body.unwrap_or_default(),
        }
    }
}
