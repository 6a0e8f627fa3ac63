//! Scan lifecycle: create → list manifest patterns → discover → upload → start → (wait).

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use futures::future::try_join_all;
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::api::ScanApi;
use crate::config::{PollSettings, TaskParameters};
use crate::discovery::discover;
use crate::error::{Result, ScanError};
use crate::models::{
    ManifestFile, ScanHandle, ScanOutcome, ScanRequest, ScanResult, ScanStatus,
};

/// Where to search and whether to wait, independent of the remote client.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub excluded_dirs: Vec<String>,
    pub wait_for_scan: bool,
    pub polling: PollSettings,
}

impl From<&TaskParameters> for ScanOptions {
    fn from(params: &TaskParameters) -> Self {
        ScanOptions {
            root: params.path.clone(),
            excluded_dirs: params.excluded_dirs.clone(),
            wait_for_scan: params.wait_for_scan,
            polling: params.polling,
        }
    }
}

/// Scan label: the current instant in ISO-8601, millisecond precision, UTC.
pub fn scan_name() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn scan_request(params: &TaskParameters, name: String) -> ScanRequest {
    ScanRequest {
        name,
        project: params.project.clone(),
        commit_hash: params.commit_hash.clone(),
        branch: params.branch.clone(),
        build_version: params.build_version.clone(),
        build_uri: params.build_uri.clone(),
        branch_uri: params.branch_uri.clone(),
        integration_type: params.integration_type.clone(),
        operating_environment: params.operating_environment.clone(),
        integration_name: params.integration_name.clone(),
    }
}

/// Run one scan end to end. Any error aborts the run.
///
/// Nothing is uploaded or started when discovery finds no manifests.
pub async fn run_scan<A: ScanApi>(
    api: &A,
    request: &ScanRequest,
    options: &ScanOptions,
) -> Result<ScanOutcome> {
    let handle = api.create_scan(request).await?;
    info!("Analysis Scan Name: {}", request.name);
    debug!("Project Id: {}", handle.project_id);

    let catalog = api.supported_manifests().await?;

    let root = options.root.clone();
    let excluded_dirs = options.excluded_dirs.clone();
    let manifests = join_search(
        tokio::task::spawn_blocking(move || discover(&root, &excluded_dirs, &catalog)).await,
    )?;

    if manifests.is_empty() {
        return Err(ScanError::NoManifests);
    }
    crate::report::terminal::render_manifests(&manifests);

    upload_manifests(api, &handle, &manifests).await?;
    api.start_scan(&handle).await?;

    info!(
        "View the Security Analysis Scan results at: {}",
        handle.report_url
    );

    if !options.wait_for_scan {
        return Ok(ScanOutcome::Started {
            report_url: handle.report_url,
        });
    }

    let mut result = wait_for_scan(api, &handle.report_status_url, &options.polling).await?;
    if result.report_url.is_empty() {
        result.report_url = handle.report_url;
    }
    Ok(ScanOutcome::Completed(result))
}

/// Unwrap the blocking manifest search. A panic inside it is re-raised here.
fn join_search(
    joined: std::result::Result<Result<Vec<ManifestFile>>, JoinError>,
) -> Result<Vec<ManifestFile>> {
    match joined {
        Ok(found) => found,
        Err(e) => match e.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(e) => Err(ScanError::Interrupted(e)),
        },
    }
}

/// Upload every manifest concurrently.
///
/// The uploads are polled together on the current task. The first failure
/// is returned at once and the uploads still in flight are dropped with it.
pub async fn upload_manifests<A: ScanApi>(
    api: &A,
    handle: &ScanHandle,
    manifests: &[ManifestFile],
) -> Result<()> {
    try_join_all(
        manifests
            .iter()
            .map(|manifest| api.upload_manifest(handle, manifest)),
    )
    .await?;
    Ok(())
}

/// Poll the status URL until the scan reaches a terminal state.
///
/// One check at a time, `polling.interval` apart. Without `max_attempts`
/// this polls for as long as the service keeps reporting progress.
pub async fn wait_for_scan<A: ScanApi>(
    api: &A,
    report_status_url: &str,
    polling: &PollSettings,
) -> Result<ScanResult> {
    let mut attempts: u32 = 0;

    loop {
        let scan = api.scan_status(report_status_url).await?;
        attempts += 1;
        debug!(
            analysis_id = scan.analysis_id.as_deref().unwrap_or_default(),
            attempt = attempts,
            "status check"
        );
        let result = scan.result.unwrap_or_default();

        match scan.status {
            ScanStatus::Error => return Err(ScanError::ScanFailed),
            ScanStatus::FailedWithViolations | ScanStatus::FailedWithVulnerabilities => {
                return Err(ScanError::ScanFailedWithIssues {
                    vulnerabilities: result.vulnerabilities,
                    violations: result.violations,
                });
            }
            ScanStatus::Finished => {
                info!(
                    "Scan completed with {} vulnerabilities and {} violations.",
                    result.vulnerabilities, result.violations
                );
                return Ok(result);
            }
            status => info!("Scan Status: {status}"),
        }

        if polling.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(ScanError::PollingExhausted { attempts });
        }
        tokio::time::sleep(polling.interval).await;
    }
}
