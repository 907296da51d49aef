//! In-memory request recording

use crate::types::{ApiRequest, HttpMethod};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// One request as it was sent
#[derive(Debug, Clone, Serialize)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    /// Response status, absent when the transport failed
    pub status: Option<u16>,
    pub sent_at: DateTime<Utc>,
}

/// Collects requests sent through an `HttpManager`
#[derive(Debug, Default)]
pub struct RequestRecorder {
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RequestRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, request: &ApiRequest, status: Option<u16>) {
        self.requests.lock().push(RecordedRequest {
            method: request.method,
            path: request.path.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
            status,
            sent_at: Utc::now(),
        });
    }

    /// Copy of every request recorded so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Requests sent to `path`, in order
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.path == path)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }

    pub fn clear(&self) {
        self.requests.lock().clear();
    }
}
