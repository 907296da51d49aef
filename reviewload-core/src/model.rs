//! Entity model of the service under test, as seen by the driver

use serde::{Deserialize, Serialize};
use std::fmt;

/// Team with its membership snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team name
    pub name: String,
    /// Members in roster order
    pub members: Vec<Membership>,
}

/// Denormalized member entry taken when the team is created.
///
/// It is not kept in sync with later activation changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

/// User known to the driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: String,
}

/// Pull request status.
///
/// The only transition is `Open` to `Merged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    #[default]
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pull request tracked in shadow state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: String,
    pub title: String,
    pub author_id: String,
    status: PrStatus,
}

impl PullRequest {
    /// New pull request, always `OPEN`
    pub fn open(id: impl Into<String>, title: impl Into<String>, author_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
        }
    }

    pub fn status(&self) -> PrStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == PrStatus::Open
    }

    /// Moves the pull request to `MERGED`. Returns false if it already was.
    pub fn mark_merged(&mut self) -> bool {
        let changed = self.status == PrStatus::Open;
        self.status = PrStatus::Merged;
        changed
    }
}
