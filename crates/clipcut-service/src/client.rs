//! HTTP client for the processing service.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::types::{
    ApplyCaptionsRequest, ApplyCaptionsResponse, FinalizeRequest, FinalizeResponse,
    GenerateCaptionsRequest, GenerateCaptionsResponse, JobStatusResponse, ProcessRequest,
    ProcessResponse,
};

/// External calls the editor makes. Each call is issued once; callers decide
/// what a failure means.
#[async_trait]
pub trait ClipService: Send + Sync {
    /// Start a processing job.
    async fn submit_job(&self, request: &ProcessRequest) -> ServiceResult<ProcessResponse>;

    /// Query the status of a processing job.
    async fn job_status(&self, job_id: &str) -> ServiceResult<JobStatusResponse>;

    /// Submit every edited clip of a job for re-encoding.
    async fn finalize(&self, request: &FinalizeRequest) -> ServiceResult<FinalizeResponse>;

    /// Generate caption segments for one clip.
    async fn generate_captions(
        &self,
        request: &GenerateCaptionsRequest,
    ) -> ServiceResult<GenerateCaptionsResponse>;

    /// Burn captions into one clip.
    async fn apply_captions(
        &self,
        request: &ApplyCaptionsRequest,
    ) -> ServiceResult<ApplyCaptionsResponse>;
}

/// Configuration for the HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Base URL of the processing service
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        std::env::var("CLIPCUT_SERVICE_URL")
            .map(Self::new)
            .unwrap_or_default()
    }
}

/// [`ClipService`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpClipService {
    http: Client,
    config: ServiceConfig,
}

impl HttpClipService {
    /// Create a new client. No request timeout beyond the client default.
    pub fn new(config: ServiceConfig) -> ServiceResult<Self> {
        let http = Client::builder().build().map_err(ServiceError::Network)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ServiceResult<Self> {
        Self::new(ServiceConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ServiceResult<T>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Service request failed");
        return Err(ServiceError::Status {
            code: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl ClipService for HttpClipService {
    async fn submit_job(&self, request: &ProcessRequest) -> ServiceResult<ProcessResponse> {
        self.post("/process", request).await
    }

    async fn job_status(&self, job_id: &str) -> ServiceResult<JobStatusResponse> {
        let url = self.url(&format!("/status/{job_id}"));
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        decode(response).await
    }

    async fn finalize(&self, request: &FinalizeRequest) -> ServiceResult<FinalizeResponse> {
        self.post("/finalize", request).await
    }

    async fn generate_captions(
        &self,
        request: &GenerateCaptionsRequest,
    ) -> ServiceResult<GenerateCaptionsResponse> {
        self.post("/captions/generate", request).await
    }

    async fn apply_captions(
        &self,
        request: &ApplyCaptionsRequest,
    ) -> ServiceResult<ApplyCaptionsResponse> {
        self.post("/captions/apply", request).await
    }
}
