use super::Executor;
use crate::api::{self, StatisticsResponse};
use crate::validation::{judge, no_expectations};
use reviewload_core::{Execution, OperationKind};

impl Executor {
    pub(super) async fn get_statistics(&self) -> Execution {
        let operation = OperationKind::GetStatistics;
        let exchange = self.exchange(&api::get_statistics()).await;
        Execution::Completed(judge::<StatisticsResponse, _>(
            operation,
            &exchange,
            self.budget(operation),
            no_expectations,
        ))
    }
}
