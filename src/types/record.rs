use chrono::{DateTime, Utc};

use super::issue::IssueState;

/// Timestamp layout used in every exported date column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

/// One column of the exported sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Repository,
    Number,
    Title,
    State,
    Pipeline,
    Estimate,
    IsEpic,
    Epics,
    Blocked,
    BlockedBy,
    Priority,
    Labels,
    Assignees,
    Author,
    Milestone,
    MilestoneDue,
    CreatedAt,
    UpdatedAt,
    Comments,
    Body,
}

/// The sheet layout, left to right. Writers iterate this list, never the
/// record's fields.
pub const COLUMNS: [Column; 20] = [
    Column::Repository,
    Column::Number,
    Column::Title,
    Column::State,
    Column::Pipeline,
    Column::Estimate,
    Column::IsEpic,
    Column::Epics,
    Column::Blocked,
    Column::BlockedBy,
    Column::Priority,
    Column::Labels,
    Column::Assignees,
    Column::Author,
    Column::Milestone,
    Column::MilestoneDue,
    Column::CreatedAt,
    Column::UpdatedAt,
    Column::Comments,
    Column::Body,
];

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Self::Repository => "Repository",
            Self::Number => "Issue Number",
            Self::Title => "Issue Title",
            Self::State => "State",
            Self::Pipeline => "Pipeline",
            Self::Estimate => "Estimate Value",
            Self::IsEpic => "Is Epic",
            Self::Epics => "Epics",
            Self::Blocked => "Blocked",
            Self::BlockedBy => "Blocked By",
            Self::Priority => "Priority",
            Self::Labels => "Labels",
            Self::Assignees => "Assigned To",
            Self::Author => "Issue Author",
            Self::Milestone => "Milestone",
            Self::MilestoneDue => "Milestone End Date",
            Self::CreatedAt => "Created At",
            Self::UpdatedAt => "Updated At",
            Self::Comments => "Comments",
            Self::Body => "User Story",
        }
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A typed cell value. `Blank` is written as an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Blank,
}

impl Cell {
    fn text_or_blank(value: Option<&str>) -> Self {
        match value {
            Some(s) if !s.is_empty() => Self::Text(s.to_owned()),
            _ => Self::Blank,
        }
    }

    /// Issue numbers joined with commas; blank when empty.
    fn numbers(values: &[u64]) -> Self {
        let joined = values
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self::text_or_blank(Some(joined.as_str()))
    }

    fn timestamp(value: Option<&DateTime<Utc>>) -> Self {
        value.map_or(Self::Blank, |dt| {
            Self::Text(dt.format(TIMESTAMP_FORMAT).to_string())
        })
    }

    /// Plain-text rendering, as used by delimited output.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Blank => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Merged record
// ---------------------------------------------------------------------------

/// One exported row: an issue joined with its (possibly absent) board data.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub repository: String,
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub pipeline: Option<String>,
    pub estimate: Option<f64>,
    pub is_epic: Option<bool>,
    pub epics: Vec<u64>,
    /// Open issues blocking this one.
    pub blocked_by: Vec<u64>,
    pub priority: Option<String>,
    pub labels: String,
    pub assignees: String,
    pub author: Option<String>,
    pub milestone: Option<String>,
    pub milestone_due: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Option<String>,
    pub body: String,
}

impl MergedRecord {
    pub fn cell(&self, column: Column) -> Cell {
        match column {
            Column::Repository => Cell::Text(self.repository.clone()),
            #[allow(clippy::cast_precision_loss)]
            Column::Number => Cell::Number(self.number as f64),
            Column::Title => Cell::Text(self.title.clone()),
            Column::State => Cell::Text(self.state.as_str().to_owned()),
            Column::Pipeline => Cell::text_or_blank(self.pipeline.as_deref()),
            Column::Estimate => self.estimate.map_or(Cell::Blank, Cell::Number),
            Column::IsEpic => self.is_epic.map_or(Cell::Blank, Cell::Bool),
            Column::Epics => Cell::numbers(&self.epics),
            Column::Blocked if self.blocked_by.is_empty() => Cell::Blank,
            Column::Blocked => Cell::Text("blocked".to_owned()),
            Column::BlockedBy => Cell::numbers(&self.blocked_by),
            Column::Priority => Cell::text_or_blank(self.priority.as_deref()),
            Column::Labels => Cell::text_or_blank(Some(self.labels.as_str())),
            Column::Assignees => Cell::text_or_blank(Some(self.assignees.as_str())),
            Column::Author => Cell::text_or_blank(self.author.as_deref()),
            Column::Milestone => Cell::text_or_blank(self.milestone.as_deref()),
            Column::MilestoneDue => Cell::timestamp(self.milestone_due.as_ref()),
            Column::CreatedAt => Cell::timestamp(Some(&self.created_at)),
            Column::UpdatedAt => Cell::timestamp(Some(&self.updated_at)),
            Column::Comments => Cell::text_or_blank(self.comments.as_deref()),
            Column::Body => Cell::text_or_blank(Some(self.body.as_str())),
        }
    }

    /// All cells in `COLUMNS` order.
    pub fn cells(&self) -> Vec<Cell> {
        COLUMNS.iter().map(|&c| self.cell(c)).collect()
    }
}
