//! Operation kinds the driver can issue per iteration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Domain operations, in the order used by the standard traffic mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    GetTeam,
    CreatePr,
    GetUserReview,
    MergePr,
    ReassignReviewer,
    SetUserActive,
    GetStatistics,
}

impl OperationKind {
    /// Number of operation kinds
    pub const COUNT: usize = 7;

    /// Get the string representation of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::GetTeam => "get_team",
            OperationKind::CreatePr => "create_pr",
            OperationKind::GetUserReview => "get_user_review",
            OperationKind::MergePr => "merge_pr",
            OperationKind::ReassignReviewer => "reassign_reviewer",
            OperationKind::SetUserActive => "set_user_active",
            OperationKind::GetStatistics => "get_statistics",
        }
    }

    /// Get all operations in canonical order
    pub fn all() -> &'static [OperationKind] {
        &[
            OperationKind::GetTeam,
            OperationKind::CreatePr,
            OperationKind::GetUserReview,
            OperationKind::MergePr,
            OperationKind::ReassignReviewer,
            OperationKind::SetUserActive,
            OperationKind::GetStatistics,
        ]
    }

    /// Stable position in [`OperationKind::all`], used for per-operation counters
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = OperationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| OperationKindError::Unknown(s.to_string()))
    }
}

/// Errors that can occur when parsing operation names
#[derive(Error, Debug, Clone)]
pub enum OperationKindError {
    #[error("Unknown operation: '{0}'. Supported operations are: get_team, create_pr, get_user_review, merge_pr, reassign_reviewer, set_user_active, get_statistics")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_from_str() {
        assert_eq!("get_team".parse::<OperationKind>().unwrap(), OperationKind::GetTeam);
        assert_eq!("MERGE_PR".parse::<OperationKind>().unwrap(), OperationKind::MergePr);
        assert!("delete_team".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_index_matches_canonical_order() {
        for (position, kind) in OperationKind::all().iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
        assert_eq!(OperationKind::all().len(), OperationKind::COUNT);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&OperationKind::ReassignReviewer).unwrap();
        assert_eq!(json, "\"reassign_reviewer\"");
        let parsed: OperationKind = serde_json::from_str("\"set_user_active\"").unwrap();
        assert_eq!(parsed, OperationKind::SetUserActive);
    }
}
