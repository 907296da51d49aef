//! User review reads and activation toggles

use super::{skip, Executor};
use crate::api::{self, SetActiveResponse, UserReviewResponse};
use crate::validation::{judge, no_expectations};
use rand::rngs::StdRng;
use reviewload_core::{Execution, OperationKind, ShadowState, SkipReason, Violation};

impl Executor {
    pub(super) async fn get_user_review(&self, state: &ShadowState, rng: &mut StdRng) -> Execution {
        let operation = OperationKind::GetUserReview;
        let Ok(user_id) = state.random_user(rng) else {
            return skip(operation, SkipReason::NoUsers);
        };

        let exchange = self.exchange(&api::get_user_review(user_id)).await;
        Execution::Completed(judge::<UserReviewResponse, _>(
            operation,
            &exchange,
            self.budget(operation),
            no_expectations,
        ))
    }

    /// Flip the locally believed activation state of a random user
    pub(super) async fn set_user_active(
        &self,
        state: &mut ShadowState,
        rng: &mut StdRng,
    ) -> Execution {
        let operation = OperationKind::SetUserActive;
        let Ok(user_id) = state.random_user(rng).cloned() else {
            return skip(operation, SkipReason::NoUsers);
        };
        let requested = !state.is_active(&user_id);

        let exchange = self
            .exchange(&api::set_user_active(&user_id, requested))
            .await;
        let outcome = judge(
            operation,
            &exchange,
            self.budget(operation),
            |response: &SetActiveResponse| match response.user.is_active {
                Some(actual) if actual == requested => Ok(()),
                Some(actual) => Err(Violation::field_mismatch("user.is_active", requested, actual)),
                None => Err(Violation::field_mismatch("user.is_active", requested, "missing")),
            },
        );

        if outcome.is_success() {
            state.set_active(&user_id, requested);
        }
        Execution::Completed(outcome)
    }
}
