//! Team reads

use super::{skip, Executor};
use crate::api::{self, TeamMembersResponse, TeamResponse};
use crate::validation::{judge, no_expectations};
use rand::rngs::StdRng;
use reviewload_core::{Execution, OperationKind, ShadowState, SkipReason};

impl Executor {
    pub(super) async fn get_team(&self, state: &ShadowState, rng: &mut StdRng) -> Execution {
        let operation = OperationKind::GetTeam;
        let Ok(team) = state.random_team(rng) else {
            return skip(operation, SkipReason::NoTeams);
        };

        let exchange = self.exchange(&api::get_team(team)).await;
        Execution::Completed(judge::<TeamResponse, _>(
            operation,
            &exchange,
            self.budget(operation),
            no_expectations,
        ))
    }

    /// Member ids of the lookup team. This read is a precondition and is
    /// never reported.
    pub(super) async fn lookup_reviewers(&self) -> Result<Vec<String>, SkipReason> {
        let response = self
            .client
            .send(&api::get_team(&self.lookup_team))
            .await
            .map_err(|_| SkipReason::ReviewerLookupUnavailable)?;

        if response.status != 200 {
            return Err(SkipReason::ReviewerLookupUnavailable);
        }

        let team: TeamMembersResponse = response
            .json()
            .map_err(|_| SkipReason::ReviewerLookupUnavailable)?;

        if team.members.len() < 2 {
            return Err(SkipReason::NotEnoughReviewers);
        }

        Ok(team.members.into_iter().map(|member| member.user_id).collect())
    }
}
