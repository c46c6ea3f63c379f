use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ScanError, ScanResult};
use crate::stream::{BoxEventStream, ScanEventStream};
use crate::types::{JobStatus, JobSummary, NetworkClient, ScanTarget};

/// Operations the orchestrator needs from the scan backend.
///
/// `HttpBackend` talks to the real API; tests plug in an in-memory version.
#[async_trait]
pub trait ScanBackend: Send + Sync + 'static {
    /// Ask the backend to run a scan; returns the job id it assigned.
    async fn start_job(&self, target: &ScanTarget) -> ScanResult<String>;

    async fn poll_status(&self, job_id: &str) -> ScanResult<JobStatus>;

    /// Best-effort; the remote scan may keep running after this returns.
    async fn cancel(&self, job_id: &str) -> ScanResult<()>;

    /// Open one push stream of scan events for `target`.
    async fn open_stream(&self, target: &ScanTarget) -> ScanResult<BoxEventStream>;

    async fn list_jobs(&self) -> ScanResult<Vec<JobSummary>>;

    /// Current network client directory, used for enrichment.
    async fn fetch_clients(&self) -> ScanResult<Vec<NetworkClient>>;
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// Bound on plain request/response calls. Streams are not bounded by it.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            request_timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartRequest<'a> {
    target: &'a str,
    scan_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    #[serde(default, alias = "job_id", alias = "id", rename = "jobId")]
    job_id: Option<String>,
}

pub const CLIENTS_PATH: &str = "/unifi/clients";

/// reqwest-backed client for the NetGuard scan API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base: String,
    token: Option<String>,
    request_timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> ScanResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ScanError::Backend(format!("building HTTP client: {e}")))?;
        Ok(Self {
            http,
            base: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.filter(|t| !t.is_empty()),
            request_timeout: config.request_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    async fn send(&self, rb: RequestBuilder) -> Result<Response, String> {
        let resp = self
            .authed(rb)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        resp.error_for_status().map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ScanBackend for HttpBackend {
    async fn start_job(&self, target: &ScanTarget) -> ScanResult<String> {
        let body = StartRequest {
            target: &target.address,
            scan_type: target.profile.as_str(),
        };
        let resp = self
            .send(self.http.post(self.url("/scan-start")).json(&body))
            .await
            .map_err(ScanError::StartFailed)?;
        let parsed: StartResponse = resp
            .json()
            .await
            .map_err(|e| ScanError::StartFailed(format!("invalid start response: {e}")))?;
        match parsed.job_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                debug!(job_id = %id, target = %target, "scan job started");
                Ok(id)
            }
            None => Err(ScanError::StartFailed("backend returned no job id".into())),
        }
    }

    async fn poll_status(&self, job_id: &str) -> ScanResult<JobStatus> {
        let resp = self
            .send(self.http.get(self.url(&format!("/scan-status/{job_id}"))))
            .await
            .map_err(ScanError::PollFailed)?;
        resp.json()
            .await
            .map_err(|e| ScanError::PollFailed(format!("invalid status body: {e}")))
    }

    async fn cancel(&self, job_id: &str) -> ScanResult<()> {
        self.send(self.http.post(self.url(&format!("/scan-cancel/{job_id}"))))
            .await
            .map_err(ScanError::CancelFailed)?;
        Ok(())
    }

    async fn open_stream(&self, target: &ScanTarget) -> ScanResult<BoxEventStream> {
        let rb = self
            .http
            .get(self.url("/scan-stream"))
            .query(&[("target", target.address.as_str()), ("scanType", target.profile.as_str())])
            .header(header::ACCEPT, "text/event-stream");
        let resp = self
            .authed(rb)
            .send()
            .await
            .map_err(|e| ScanError::StartFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| ScanError::StartFailed(e.to_string()))?;
        debug!(target = %target, "scan stream opened");
        Ok(ScanEventStream::new(Box::pin(resp.bytes_stream())).into_boxed())
    }

    async fn list_jobs(&self) -> ScanResult<Vec<JobSummary>> {
        let resp = self
            .send(self.http.get(self.url("/jobs")))
            .await
            .map_err(ScanError::Backend)?;
        resp.json()
            .await
            .map_err(|e| ScanError::Backend(format!("invalid job list: {e}")))
    }

    async fn fetch_clients(&self) -> ScanResult<Vec<NetworkClient>> {
        let resp = self
            .send(self.http.get(self.url(CLIENTS_PATH)))
            .await
            .map_err(ScanError::Backend)?;
        resp.json()
            .await
            .map_err(|e| ScanError::Backend(format!("invalid client directory: {e}")))
    }
}
