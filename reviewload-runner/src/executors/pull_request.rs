//! Pull request creation, merge and reviewer reassignment

use super::{skip, Executor};
use crate::api::{self, PrResponse, ReassignResponse};
use crate::validation::{judge, no_expectations};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use reviewload_core::shadow::pick_random;
use reviewload_core::{Execution, OperationKind, PrStatus, ShadowState, SkipReason, Violation};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Unique id for a pull request created during steady state:
/// `pr-<unix millis>-<8 base36 chars>`
pub fn generate_pr_id<R: Rng>(rng: &mut R) -> String {
    let suffix: String = (0..8)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("pr-{}-{}", Utc::now().timestamp_millis(), suffix)
}

fn expect_merged(response: &PrResponse) -> Result<(), Violation> {
    match response.status() {
        Some(status) if status == PrStatus::Merged.as_str() => Ok(()),
        other => Err(Violation::field_mismatch(
            "pr.status",
            PrStatus::Merged,
            other.unwrap_or("missing"),
        )),
    }
}

impl Executor {
    pub(super) async fn create_pr(&self, state: &mut ShadowState, rng: &mut StdRng) -> Execution {
        let operation = OperationKind::CreatePr;
        let Ok(author) = state.random_user(rng).cloned() else {
            return skip(operation, SkipReason::NoUsers);
        };

        let id = generate_pr_id(rng);
        let title = format!("Load Test PR {}", id);

        let exchange = self.exchange(&api::create_pr(&id, &title, &author)).await;
        let outcome = judge::<PrResponse, _>(
            operation,
            &exchange,
            self.budget(operation),
            no_expectations,
        );

        if outcome.is_success() {
            state.record_pr_created(id, title, author);
        }
        Execution::Completed(outcome)
    }

    pub(super) async fn merge_pr(&self, state: &mut ShadowState, rng: &mut StdRng) -> Execution {
        let operation = OperationKind::MergePr;
        let Ok(pr) = state.random_open_pr(rng) else {
            return skip(operation, SkipReason::NoOpenPullRequests);
        };
        let id = pr.id.clone();

        let exchange = self.exchange(&api::merge_pr(&id)).await;
        let outcome = judge(operation, &exchange, self.budget(operation), expect_merged);

        if outcome.is_success() {
            state.record_pr_merged(&id);
        }
        Execution::Completed(outcome)
    }

    pub(super) async fn reassign_reviewer(
        &self,
        state: &ShadowState,
        rng: &mut StdRng,
    ) -> Execution {
        let operation = OperationKind::ReassignReviewer;
        let Ok(pr) = state.random_open_pr(rng) else {
            return skip(operation, SkipReason::NoOpenPullRequests);
        };
        let pr_id = pr.id.clone();

        let reviewers = match self.lookup_reviewers().await {
            Ok(reviewers) => reviewers,
            Err(reason) => return skip(operation, reason),
        };
        let Ok(old_reviewer) = pick_random(&reviewers, "reviewers", rng) else {
            return skip(operation, SkipReason::NotEnoughReviewers);
        };

        let exchange = self
            .exchange(&api::reassign_reviewer(&pr_id, old_reviewer))
            .await;
        Execution::Completed(judge::<ReassignResponse, _>(
            operation,
            &exchange,
            self.budget(operation),
            no_expectations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_generated_pr_id_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let id = generate_pr_id(&mut rng);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "pr");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_generated_ids_differ() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_ne!(generate_pr_id(&mut rng), generate_pr_id(&mut rng));
    }
}
