use tracing::{debug, info};

use super::ApiClient;
use crate::error::{Result, ScanError};
use crate::models::{ScanHandle, ScanRequest, ScanStatusResponse};

impl ApiClient {
    /// `POST clients/{clientId}/analysis/structure`
    pub async fn create_analysis_scan_structure(&self, request: &ScanRequest) -> Result<ScanHandle> {
        const OPERATION: &str = "Create Analysis Scan Structure";

        let url = self.endpoint(&["clients", &self.client_id, "analysis", "structure"])?;
        info!("{OPERATION} - Request Url (POST): {url}");
        if let Ok(body) = serde_json::to_string(request) {
            debug!("{OPERATION} - Request Body: {body}");
        }

        let response = self.send(OPERATION, self.http.post(url).json(request)).await?;
        self.read_json(OPERATION, response).await
    }

    /// `PUT clients/{clientId}/projects/{projectId}/analysis/{analysisId}` with no body.
    pub async fn start_analysis_scan(&self, handle: &ScanHandle) -> Result<()> {
        const OPERATION: &str = "Start Analysis Scan";

        let url = self.endpoint(&[
            "clients",
            &self.client_id,
            "projects",
            &handle.project_id,
            "analysis",
            &handle.analysis_id,
        ])?;
        info!("{OPERATION} - Request Url (PUT): {url}");

        let response = self.send(OPERATION, self.http.put(url)).await?;
        self.read_body(OPERATION, response).await?;
        Ok(())
    }

    /// `GET {reportStatusUrl}`.
    ///
    /// The status URL comes from scan creation and is normally absolute, possibly
    /// on another host; a relative one is resolved against the base endpoint.
    pub async fn check_analysis_scan_status(
        &self,
        report_status_url: &str,
    ) -> Result<ScanStatusResponse> {
        const OPERATION: &str = "Check Analysis Scan Status";

        let url = self
            .base_url
            .join(report_status_url)
            .map_err(|e| ScanError::InvalidUrl {
                url: report_status_url.to_string(),
                reason: e.to_string(),
            })?;
        info!("{OPERATION} - Request Url (GET): {url}");

        let response = self.send(OPERATION, self.http.get(url)).await?;
        self.read_json(OPERATION, response).await
    }
}
