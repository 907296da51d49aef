//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{ApiRequest, ApiResponse, HttpMethod};
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

#[cfg(feature = "recording")]
use crate::recording::RequestRecorder;

/// HTTP client trait for issuing requests against the service under test
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError>;
}

#[async_trait::async_trait]
impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError> {
        (**self).send(request).await
    }
}

/// Canned response served in offline mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    /// Simulated server time before the response is returned
    pub latency: Duration,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            latency: Duration::ZERO,
        }
    }

    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Responses for one `METHOD:/path` key. Queued responses are served once
/// each, in order, before the standing response.
#[derive(Debug, Default)]
struct MockRoute {
    queued: VecDeque<MockResponse>,
    standing: Option<MockResponse>,
}

impl MockRoute {
    fn next(&mut self) -> Option<MockResponse> {
        self.queued.pop_front().or_else(|| self.standing.clone())
    }
}

#[derive(Debug)]
struct Transport {
    client: Client,
    base_url: Url,
}

/// HTTP Manager for handling HTTP requests with mock support
#[derive(Debug)]
pub struct HttpManager {
    /// Absent in offline mode, where only registered mocks are served
    transport: Option<Transport>,
    mocks: Mutex<HashMap<String, MockRoute>>,
    #[cfg(feature = "recording")]
    recorder: Option<Arc<RequestRecorder>>,
}

impl HttpManager {
    /// Create an online HttpManager. One pooled reqwest client is built up
    /// front and shared by every request.
    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HttpManager for {} with timeout: {}s",
            config.base_url,
            config.timeout.as_secs()
        );

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()?;

        Ok(Self {
            transport: Some(Transport { client, base_url }),
            mocks: Mutex::new(HashMap::new()),
            #[cfg(feature = "recording")]
            recorder: None,
        })
    }

    /// Create a manager that only serves registered mocks
    pub fn offline() -> Self {
        debug!("Creating offline HttpManager");
        Self {
            transport: None,
            mocks: Mutex::new(HashMap::new()),
            #[cfg(feature = "recording")]
            recorder: None,
        }
    }

    /// Attach a recorder that captures every request sent
    #[cfg(feature = "recording")]
    pub fn with_recorder(mut self, recorder: Arc<RequestRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Register the standing response for `method path`
    pub fn add_mock(&self, method: HttpMethod, path: &str, response: MockResponse) {
        let key = format!("{}:{}", method.as_str(), path);
        self.mocks.lock().entry(key).or_default().standing = Some(response);
        debug!("Added HTTP mock for {} {}", method, path);
    }

    /// Queue a one-shot response for `method path`
    pub fn push_mock(&self, method: HttpMethod, path: &str, response: MockResponse) {
        let key = format!("{}:{}", method.as_str(), path);
        self.mocks.lock().entry(key).or_default().queued.push_back(response);
        debug!("Queued HTTP mock for {} {}", method, path);
    }

    async fn send_offline(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError> {
        let key = request.mock_key();
        let mock = self.mocks.lock().get_mut(&key).and_then(MockRoute::next);

        let Some(mock) = mock else {
            debug!("No matching mock response found for {}", request);
            return Err(HttpError::NoMock(key));
        };

        if !mock.latency.is_zero() {
            tokio::time::sleep(mock.latency).await;
        }
        Ok(ApiResponse::new(mock.status, mock.body))
    }

    async fn send_online(
        &self,
        transport: &Transport,
        request: &ApiRequest,
    ) -> Result<ApiResponse, HttpError> {
        let url = join_path(&transport.base_url, &request.path)?;

        let mut builder = transport
            .client
            .request(reqwest::Method::from(request.method), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse::new(status, body))
    }

    #[cfg(feature = "recording")]
    fn record(&self, request: &ApiRequest, result: &Result<ApiResponse, HttpError>) {
        if let Some(recorder) = &self.recorder {
            recorder.record(request, result.as_ref().ok().map(|response| response.status));
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for HttpManager {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError> {
        trace!("Sending {}", request);

        let result = match &self.transport {
            Some(transport) => self.send_online(transport, request).await,
            None => self.send_offline(request).await,
        };

        #[cfg(feature = "recording")]
        self.record(request, &result);

        if let Ok(response) = &result {
            trace!("{} -> {}", request, response.status);
        }
        result
    }
}

/// Append an absolute endpoint path to the base URL, keeping any base path
fn join_path(base: &Url, path: &str) -> Result<Url, HttpError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", joined, e)))
}
