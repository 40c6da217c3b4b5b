use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Actor, Label, Milestone};

// ---------------------------------------------------------------------------
// Issue-specific enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
    #[serde(other)]
    Unknown,
}

impl IssueState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
        }
    }
}

/// Which issues to request from the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFilter {
    Open,
    Closed,
    #[default]
    All,
}

impl StateFilter {
    /// Value of the `state` query parameter.
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }

    pub fn matches(self, state: IssueState) -> bool {
        match self {
            Self::All => true,
            Self::Open => state == IssueState::Open,
            Self::Closed => state == IssueState::Closed,
        }
    }
}

impl FromStr for StateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "all" => Ok(Self::All),
            _ => Err(s.to_owned()),
        }
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

// ---------------------------------------------------------------------------
// Issue domain type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub state: IssueState,
    pub author: Option<Actor>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<Actor>,
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Label names joined with commas, in tracker order.
    pub fn label_names(&self) -> String {
        join_names(self.labels.iter().map(|l| l.name.as_str()))
    }

    /// Assignee logins joined with commas.
    pub fn assignee_logins(&self) -> String {
        join_names(self.assignees.iter().map(|a| a.login.as_str()))
    }

    /// The last label naming a priority (`Low`, `Medium`, `High`), if any.
    pub fn priority(&self) -> Option<&str> {
        self.labels
            .iter()
            .rev()
            .map(|l| l.name.as_str())
            .find(|name| ["Low", "Medium", "High"].iter().any(|p| name.contains(p)))
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(",")
}

/// A single issue comment, reduced to what the export needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Option<String>,
    pub body: String,
}
