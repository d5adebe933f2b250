//! HTTP client for the remote export service

use crate::model::{DataTypeInfo, DataTypesResponse, ServiceStatus};
use mi_core::config::RemoteConfig;
use mi_core::error::{ExportError, Result};
use mi_core::filename::resolve_filename;
use mi_core::{DownloadTrigger, DownloadableFile, ExportRequest, ExportResult};
use reqwest::header::{HeaderMap, HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, error, info, warn};

/// Server-side export endpoint
pub const EXPORT_DATA_PATH: &str = "/api/export/data";
/// Data type listing endpoint
pub const DATA_TYPES_PATH: &str = "/api/export/data-types";
/// Service status endpoint
pub const STATUS_PATH: &str = "/api/export/status";

/// Longest error body quoted in an `ExportFailed` message
const MAX_ERROR_BODY: usize = 200;

/// Client for the export service
///
/// Carries its own configuration; construct one and pass it to whoever needs
/// to export. Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ExportClient {
    http: Client,
    config: RemoteConfig,
}

impl ExportClient {
    /// Create a client for the configured service
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ExportError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Request a server-rendered export and hand it to `trigger`
    ///
    /// Never fails: every error is reported through the returned result.
    pub async fn export_data<T>(&self, request: &ExportRequest, trigger: &T) -> ExportResult
    where
        T: DownloadTrigger + ?Sized,
    {
        match self.try_export(request, trigger).await {
            Ok(filename) => {
                info!("Exported {} as {}", request.data_type, filename);
                ExportResult::succeeded(filename)
            }
            Err(err) => {
                error!("Export of {} failed: {}", request.data_type, err);
                ExportResult::failed(err)
            }
        }
    }

    /// Fetch the rendered export without saving it
    pub async fn fetch_export(&self, request: &ExportRequest) -> Result<DownloadableFile> {
        let url = self.config.endpoint(EXPORT_DATA_PATH);
        debug!(
            "Requesting {} export of {} from {}",
            request.format, request.data_type, url
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        let response = ensure_success(response).await?;

        let headers = response.headers();
        let filename = resolve_filename(
            header_str(headers, CONTENT_DISPOSITION),
            &request.fallback_filename(),
        );
        let mime_type = header_str(headers, CONTENT_TYPE)
            .map(str::to_string)
            .unwrap_or_else(|| request.format.mime_type().to_string());

        let content = response.bytes().await.map_err(|e| {
            ExportError::Network(format!("Failed to read export payload from {}: {}", url, e))
        })?;
        debug!("Received {} bytes ({})", content.len(), mime_type);

        Ok(DownloadableFile::new(content.to_vec(), mime_type, filename))
    }

    /// Data types the service can export; empty when the service is unavailable
    pub async fn data_types(&self) -> Vec<DataTypeInfo> {
        match self.try_data_types().await {
            Ok(types) => types,
            Err(err) => {
                warn!("Could not list export data types: {}", err);
                Vec::new()
            }
        }
    }

    /// Service health as reported by the status endpoint
    pub async fn status(&self) -> Result<ServiceStatus> {
        let body = self.get_json_body(STATUS_PATH).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn try_export<T>(&self, request: &ExportRequest, trigger: &T) -> Result<String>
    where
        T: DownloadTrigger + ?Sized,
    {
        let file = self.fetch_export(request).await?;
        let filename = file.filename();
        trigger.trigger(&file)?;
        Ok(filename)
    }

    async fn try_data_types(&self) -> Result<Vec<DataTypeInfo>> {
        let body = self.get_json_body(DATA_TYPES_PATH).await?;
        let response: DataTypesResponse = serde_json::from_slice(&body)?;
        Ok(response.into_infos())
    }

    async fn get_json_body(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.config.endpoint(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        let response = ensure_success(response).await?;
        let body = response.bytes().await.map_err(|e| {
            ExportError::Network(format!("Failed to read response from {}: {}", url, e))
        })?;
        Ok(body.to_vec())
    }
}

fn network_error(url: &str, err: reqwest::Error) -> ExportError {
    if err.is_timeout() {
        ExportError::Network(format!("Request to {} timed out", url))
    } else {
        ExportError::Network(format!("Request to {} failed: {}", url, err))
    }
}

/// Fail fast on any non-2xx status
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ExportError::ExportFailed {
        status: status.as_u16(),
        message: failure_message(status, &body),
    })
}

/// Reason phrase plus the service's explanation, if it sent one
fn failure_message(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Request rejected");

    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(MAX_ERROR_BODY).collect());

    if detail.is_empty() {
        reason.to_string()
    } else {
        format!("{}: {}", reason, detail)
    }
}

/// Header value as text; raw UTF-8 is accepted, other bytes are ignored
fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers
        .get(name)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
}
