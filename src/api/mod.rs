//! Client for the remote analysis service.
//!
//! [`ScanApi`] is the seam the scan orchestrator is generic over; [`ApiClient`]
//! implements it with `reqwest`. Requests are authenticated with a static API
//! key header. Failures are logged where they happen and returned unchanged:
//!
//! - transport errors log the error message,
//! - non-2xx responses log status and reason, plus the body in verbose mode.
//!
//! - [`analysis`] — create, start, and poll a scan.
//! - [`manifests`] — list supported manifest patterns and upload manifest files.

pub mod analysis;
pub mod manifests;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::error::{Result, ScanError};
use crate::models::{
    ManifestFile, PackageManagerManifests, ScanHandle, ScanRequest, ScanStatusResponse,
};

pub const API_KEY_HEADER: &str = "x-soos-apikey";

/// Remote operations a scan run needs.
#[allow(async_fn_in_trait)]
pub trait ScanApi {
    async fn create_scan(&self, request: &ScanRequest) -> Result<ScanHandle>;
    async fn supported_manifests(&self) -> Result<Vec<PackageManagerManifests>>;
    async fn upload_manifest(&self, handle: &ScanHandle, manifest: &ManifestFile) -> Result<()>;
    async fn start_scan(&self, handle: &ScanHandle) -> Result<()>;
    async fn scan_status(&self, report_status_url: &str) -> Result<ScanStatusResponse>;
}

/// `reqwest`-backed [`ScanApi`] bound to one base endpoint and client id.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    client_id: String,
}

impl ApiClient {
    pub fn new(base_uri: &str, api_key: &str, client_id: &str) -> Result<Self> {
        let base_url = Url::parse(base_uri).map_err(|e| ScanError::InvalidUrl {
            url: base_uri.to_string(),
            reason: e.to_string(),
        })?;

        let mut key = HeaderValue::from_str(api_key).map_err(|_| ScanError::InvalidApiKey)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("soos-scan/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url,
            client_id: client_id.to_string(),
        })
    }

    /// Append `segments` to the base URL as percent-encoded path segments.
    ///
    /// A trailing slash on the base is optional.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ScanError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "url cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send `request`, turning non-2xx answers into [`ScanError::Status`].
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("{operation} - Error Message: {e}");
                return Err(e.into());
            }
        };

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();

        if !status.is_success() {
            error!(
                "{operation} - Error Response Status: {} ({reason})",
                status.as_u16()
            );
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            if let Some(body) = &body {
                debug!("{operation} - Error Response Body: {body}");
            }
            return Err(ScanError::Status {
                operation,
                status: status.as_u16(),
                reason,
                body,
            });
        }

        info!("{operation} - Response Status: {} ({reason})", status.as_u16());
        Ok(response)
    }

    /// Read the body as text and log it in verbose mode.
    async fn read_body(&self, operation: &'static str, response: Response) -> Result<String> {
        match response.text().await {
            Ok(body) => {
                debug!("{operation} - Response Body: {body}");
                Ok(body)
            }
            Err(e) => {
                error!("{operation} - Error Message: {e}");
                Err(e.into())
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        response: Response,
    ) -> Result<T> {
        let body = self.read_body(operation, response).await?;
        serde_json::from_str(&body).map_err(|source| {
            error!("{operation} - Error Message: {source}");
            ScanError::Decode { operation, source }
        })
    }
}

impl ScanApi for ApiClient {
    async fn create_scan(&self, request: &ScanRequest) -> Result<ScanHandle> {
        self.create_analysis_scan_structure(request).await
    }

    async fn supported_manifests(&self) -> Result<Vec<PackageManagerManifests>> {
        self.supported_package_manager_manifests().await
    }

    async fn upload_manifest(&self, handle: &ScanHandle, manifest: &ManifestFile) -> Result<()> {
        self.put_manifest(handle, manifest).await
    }

    async fn start_scan(&self, handle: &ScanHandle) -> Result<()> {
        self.start_analysis_scan(handle).await
    }

    async fn scan_status(&self, report_status_url: &str) -> Result<ScanStatusResponse> {
        self.check_analysis_scan_status(report_status_url).await
    }
}
