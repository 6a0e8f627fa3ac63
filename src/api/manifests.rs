use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio_util::io::ReaderStream;
use tracing::info;

use super::ApiClient;
use crate::error::{Result, ScanError};
use crate::models::{ManifestFile, PackageManagerManifests, ScanHandle};

/// Multipart field the service reads the manifest from.
const MANIFEST_FIELD: &str = "manifest";

/// Encode a filename for use as a URL path segment.
///
/// The service's router treats dots as extension boundaries, so every `.` is
/// sent as `*`. The service reverses the substitution.
pub fn encode_file_name(name: &str) -> String {
    name.replace('.', "*")
}

impl ApiClient {
    /// `GET clients/{clientId}/manifests`
    pub async fn supported_package_manager_manifests(&self) -> Result<Vec<PackageManagerManifests>> {
        const OPERATION: &str = "Get Manifests";

        let url = self.endpoint(&["clients", &self.client_id, "manifests"])?;
        info!("{OPERATION} - Request Url (GET): {url}");

        let response = self.send(OPERATION, self.http.get(url)).await?;
        self.read_json(OPERATION, response).await
    }

    /// `PUT clients/{clientId}/projects/{projectId}/analysis/{analysisId}/manifests/{encodedFileName}`
    ///
    /// The file is streamed from disk; its content is not inspected.
    pub async fn put_manifest(&self, handle: &ScanHandle, manifest: &ManifestFile) -> Result<()> {
        const OPERATION: &str = "Upload Manifest";

        let encoded = encode_file_name(&manifest.name);
        let url = self.endpoint(&[
            "clients",
            &self.client_id,
            "projects",
            &handle.project_id,
            "analysis",
            &handle.analysis_id,
            "manifests",
            &encoded,
        ])?;
        info!("{OPERATION} - Request Url (PUT): {url}");

        let file = tokio::fs::File::open(&manifest.path)
            .await
            .map_err(|e| ScanError::io(&manifest.path, e))?;
        let length = file.metadata().await.ok().map(|m| m.len());

        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = match length {
            Some(length) => Part::stream_with_length(body, length),
            None => Part::stream(body),
        }
        .file_name(manifest.name.clone());
        let form = Form::new().part(MANIFEST_FIELD, part);

        let response = self.send(OPERATION, self.http.put(url).multipart(form)).await?;
        self.read_body(OPERATION, response).await?;
        Ok(())
    }
}
