//! Response contract checks shared by every executor
//!
//! A response is judged in a fixed order: transport, status, body schema,
//! field expectations, then latency budget. The first unmet check becomes the
//! recorded violation.

use reviewload_core::{OperationKind, OutcomeRecord, Violation};
use reviewload_http::{ApiResponse, HttpError};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A sent request with its result and wall-clock latency
#[derive(Debug)]
pub struct Exchange {
    pub result: Result<ApiResponse, HttpError>,
    pub latency: Duration,
}

/// Judge an exchange against an operation's contract.
///
/// `expect` runs on the decoded body and reports field-level mismatches.
pub fn judge<T, F>(
    operation: OperationKind,
    exchange: &Exchange,
    budget: Option<Duration>,
    expect: F,
) -> OutcomeRecord
where
    T: DeserializeOwned,
    F: FnOnce(&T) -> Result<(), Violation>,
{
    let latency = exchange.latency;

    let response = match &exchange.result {
        Ok(response) => response,
        Err(e) => {
            let violation = Violation::Transport {
                message: e.to_string(),
            };
            return OutcomeRecord::failed(operation, latency, None, violation, None);
        }
    };

    let fail = |violation: Violation| {
        OutcomeRecord::failed(
            operation,
            latency,
            Some(response.status),
            violation,
            Some(response.body.as_str()),
        )
    };

    if !response.is_success() {
        return fail(Violation::Status {
            status: response.status,
        });
    }

    let body: T = match response.json() {
        Ok(body) => body,
        Err(e) => {
            return fail(Violation::Schema {
                message: e.to_string(),
            })
        }
    };

    if let Err(violation) = expect(&body) {
        return fail(violation);
    }

    if let Some(budget) = budget {
        if latency >= budget {
            return fail(Violation::Latency {
                elapsed_ms: latency.as_millis() as u64,
                budget_ms: budget.as_millis() as u64,
            });
        }
    }

    OutcomeRecord::passed(operation, latency, response.status)
}

/// Contract with no field expectations beyond the schema
pub fn no_expectations<T>(_: &T) -> Result<(), Violation> {
    Ok(())
}
