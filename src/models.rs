use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Metadata sent when creating the analysis scan structure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// ISO-8601 instant of the run start; a label, not an identifier.
    pub name: String,
    pub project: String,
    pub commit_hash: Option<String>,
    pub branch: Option<String>,
    pub build_version: Option<String>,
    pub build_uri: Option<String>,
    pub branch_uri: Option<String>,
    pub integration_type: String,
    pub operating_environment: String,
    pub integration_name: String,
}

/// Identifiers returned by scan creation. Every later call is addressed by these.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanHandle {
    pub project_id: String,
    #[serde(rename = "Id", alias = "id")]
    pub analysis_id: String,
    pub report_url: String,
    pub report_status_url: String,
}

/// Manifest filename patterns recognised for one package manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManagerManifests {
    pub package_manager: String,
    #[serde(default)]
    pub manifests: Vec<ManifestPattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestPattern {
    pub pattern: String,
    #[serde(default)]
    pub is_lock_file: bool,
}

/// A manifest found on disk, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestFile {
    /// Base filename.
    pub name: String,
    /// Absolute path.
    pub path: PathBuf,
}

/// Progress states reported by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Queued,
    Manifest,
    LocatingDependencies,
    LoadingPackageDetails,
    LocatingVulnerabilities,
    RunningGovernancePolicies,
    Finished,
    FailedWithViolations,
    FailedWithVulnerabilities,
    Error,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStatus::Unknown => write!(f, "Unknown"),
            ScanStatus::Queued => write!(f, "Queued"),
            ScanStatus::Manifest => write!(f, "Manifest"),
            ScanStatus::LocatingDependencies => write!(f, "LocatingDependencies"),
            ScanStatus::LoadingPackageDetails => write!(f, "LoadingPackageDetails"),
            ScanStatus::LocatingVulnerabilities => write!(f, "LocatingVulnerabilities"),
            ScanStatus::RunningGovernancePolicies => write!(f, "RunningGovernancePolicies"),
            ScanStatus::Finished => write!(f, "Finished"),
            ScanStatus::FailedWithViolations => write!(f, "FailedWithViolations"),
            ScanStatus::FailedWithVulnerabilities => write!(f, "FailedWithVulnerabilities"),
            ScanStatus::Error => write!(f, "Error"),
        }
    }
}

/// Body of the report status endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatusResponse {
    pub status: ScanStatus,
    #[serde(default)]
    pub analysis_id: Option<String>,
    /// Only populated once the scan reaches a terminal state.
    #[serde(default)]
    pub result: Option<ScanResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    #[serde(default)]
    pub report_url: String,
    #[serde(default)]
    pub vulnerabilities: u64,
    #[serde(default)]
    pub violations: u64,
}

/// What a successful run ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The scan was started and the run did not wait for it.
    Started { report_url: String },
    /// The scan was awaited and finished without failing.
    Completed(ScanResult),
}
