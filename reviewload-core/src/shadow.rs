//! Shadow state: the driver's local belief about server-side entities
//!
//! Setup produces one baseline value. Every execution context clones it and
//! mutates only its own copy, so nothing here is shared or locked.

use crate::error::ShadowError;
use crate::model::{Membership, PrStatus, PullRequest};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Known teams, users, pull requests and the locally believed active set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowState {
    pub teams: Vec<String>,
    pub users: Vec<String>,
    pub prs: Vec<PullRequest>,
    pub active_users: HashSet<String>,
}

impl ShadowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a team the service accepted, registering each member as an active user
    pub fn record_team_created(&mut self, name: impl Into<String>, members: &[Membership]) {
        self.teams.push(name.into());
        for member in members {
            self.users.push(member.user_id.clone());
            self.active_users.insert(member.user_id.clone());
        }
    }

    /// Record a newly created pull request. It always enters as `OPEN`.
    pub fn record_pr_created(&mut self, id: impl Into<String>, title: impl Into<String>, author_id: impl Into<String>) {
        self.prs.push(PullRequest::open(id, title, author_id));
    }

    /// Mark a locally known pull request as merged.
    ///
    /// Unknown ids are ignored: the PR may have been created by another
    /// context whose state is gone.
    pub fn record_pr_merged(&mut self, id: &str) {
        if let Some(pr) = self.prs.iter_mut().find(|pr| pr.id == id) {
            pr.mark_merged();
        }
    }

    /// Apply an observed activation result
    pub fn set_active(&mut self, user_id: &str, is_active: bool) {
        if is_active {
            self.active_users.insert(user_id.to_string());
        } else {
            self.active_users.remove(user_id);
        }
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.active_users.contains(user_id)
    }

    /// Pull requests believed to be open, in creation order
    pub fn open_prs(&self) -> Vec<&PullRequest> {
        self.prs.iter().filter(|pr| pr.is_open()).collect()
    }

    pub fn pr(&self, id: &str) -> Option<&PullRequest> {
        self.prs.iter().find(|pr| pr.id == id)
    }

    pub fn count_prs(&self, status: PrStatus) -> usize {
        self.prs.iter().filter(|pr| pr.status() == status).count()
    }

    pub fn random_team<R: Rng>(&self, rng: &mut R) -> Result<&String, ShadowError> {
        pick_random(&self.teams, "teams", rng)
    }

    pub fn random_user<R: Rng>(&self, rng: &mut R) -> Result<&String, ShadowError> {
        pick_random(&self.users, "users", rng)
    }

    pub fn random_open_pr<R: Rng>(&self, rng: &mut R) -> Result<&PullRequest, ShadowError> {
        let open = self.open_prs();
        pick_random(&open, "open pull requests", rng).map(|pr| *pr)
    }
}

/// Uniform pick from a collection
pub fn pick_random<'a, T, R: Rng>(
    collection: &'a [T],
    name: &'static str,
    rng: &mut R,
) -> Result<&'a T, ShadowError> {
    if collection.is_empty() {
        return Err(ShadowError::EmptyCollection(name));
    }
    Ok(&collection[rng.random_range(0..collection.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn member(id: &str) -> Membership {
        Membership {
            user_id: id.to_string(),
            username: id.to_uppercase(),
            is_active: true,
        }
    }

    #[test]
    fn test_team_creation_registers_active_members() {
        let mut state = ShadowState::new();
        state.record_team_created("backend-team", &[member("user1"), member("user2")]);

        assert_eq!(state.teams, vec!["backend-team".to_string()]);
        assert_eq!(state.users, vec!["user1".to_string(), "user2".to_string()]);
        assert!(state.is_active("user1"));
        assert!(state.is_active("user2"));
    }

    #[test]
    fn test_merge_unknown_pr_is_noop() {
        let mut state = ShadowState::new();
        state.record_pr_created("pr-1", "One", "user1");
        state.record_pr_merged("pr-404");

        assert_eq!(state.count_prs(PrStatus::Open), 1);
        assert_eq!(state.count_prs(PrStatus::Merged), 0);
    }

    #[test]
    fn test_merged_pr_leaves_open_set() {
        let mut state = ShadowState::new();
        state.record_pr_created("pr-1", "One", "user1");
        state.record_pr_created("pr-2", "Two", "user1");
        state.record_pr_merged("pr-1");

        let open: Vec<&str> = state.open_prs().iter().map(|pr| pr.id.as_str()).collect();
        assert_eq!(open, vec!["pr-2"]);

        // Merging again never reopens
        state.record_pr_merged("pr-1");
        assert_eq!(state.pr("pr-1").unwrap().status(), PrStatus::Merged);
    }

    #[test]
    fn test_set_active_tracks_latest_value() {
        let mut state = ShadowState::new();
        state.set_active("user7", true);
        assert!(state.is_active("user7"));
        state.set_active("user7", false);
        assert!(!state.is_active("user7"));
        state.set_active("user7", false);
        assert!(!state.is_active("user7"));
    }

    #[test]
    fn test_pick_random_empty_collection() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = ShadowState::new();

        assert_eq!(
            state.random_team(&mut rng),
            Err(ShadowError::EmptyCollection("teams"))
        );
        assert!(state.random_user(&mut rng).is_err());
        assert!(state.random_open_pr(&mut rng).is_err());
    }

    #[test]
    fn test_random_open_pr_never_returns_merged() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = ShadowState::new();
        state.record_pr_created("pr-1", "One", "user1");
        state.record_pr_created("pr-2", "Two", "user1");
        state.record_pr_merged("pr-2");

        for _ in 0..100 {
            assert_eq!(state.random_open_pr(&mut rng).unwrap().id, "pr-1");
        }
    }

    #[test]
    fn test_clones_are_independent() {
        let mut baseline = ShadowState::new();
        baseline.record_pr_created("pr-1", "One", "user1");

        let mut context = baseline.clone();
        context.record_pr_merged("pr-1");
        context.record_pr_created("pr-2", "Two", "user1");

        assert_eq!(baseline.prs.len(), 1);
        assert!(baseline.pr("pr-1").unwrap().is_open());
        assert_eq!(context.prs.len(), 2);
    }
}
