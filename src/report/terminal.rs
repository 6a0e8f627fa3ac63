use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::models::{ManifestFile, ScanOutcome, ScanResult};

/// Print the run header.
pub fn render_banner(project: &str, path: &Path) {
    println!("\n {} v{}", "soos-scan".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Project : {}", project);
    println!(" Scanning: {}\n", path.display());
}

/// Print the manifests about to be uploaded.
pub fn render_manifests(manifests: &[ManifestFile]) {
    println!(
        "\n {} {} manifest(s) to upload:\n",
        "→".cyan(),
        manifests.len()
    );
    println!("{}", manifest_table(manifests));
    println!();
}

fn manifest_table(manifests: &[ManifestFile]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Manifest").add_attribute(Attribute::Bold),
            Cell::new("Path").add_attribute(Attribute::Bold),
        ]);

    for manifest in manifests {
        table.add_row(vec![
            Cell::new(&manifest.name),
            Cell::new(manifest.path.display().to_string()),
        ]);
    }

    table
}

/// Print the summary box for a successful run.
pub fn render_outcome(outcome: &ScanOutcome) {
    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    for line in summary_lines(outcome) {
        println!(" │  {:<48} │", line);
    }
    println!(" └────────────────────────────────────────────────────┘\n");

    println!(" Report: {}\n", report_url(outcome).underline());
}

fn summary_lines(outcome: &ScanOutcome) -> Vec<String> {
    match outcome {
        ScanOutcome::Started { .. } => vec![format!("{}  Scan started", "✓".green())],
        ScanOutcome::Completed(ScanResult {
            vulnerabilities,
            violations,
            ..
        }) => vec![
            format!("{}  Scan completed", "✓".green()),
            format!("Vulnerabilities : {:>4}", vulnerabilities),
            format!("Violations      : {:>4}", violations),
        ],
    }
}

fn report_url(outcome: &ScanOutcome) -> &str {
    match outcome {
        ScanOutcome::Started { report_url } => report_url,
        ScanOutcome::Completed(result) => &result.report_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_manifest_table_lists_every_file() {
        let manifests = vec![
            ManifestFile {
                name: "package.json".to_string(),
                path: PathBuf::from("/repo/package.json"),
            },
            ManifestFile {
                name: "yarn.lock".to_string(),
                path: PathBuf::from("/repo/web/yarn.lock"),
            },
        ];

        let rendered = manifest_table(&manifests).to_string();

        assert!(rendered.contains("package.json"));
        assert!(rendered.contains("/repo/web/yarn.lock"));
    }

    #[test]
    fn test_summary_for_completed_scan() {
        colored::control::set_override(false);
        let outcome = ScanOutcome::Completed(ScanResult {
            report_url: "https://app.example/report".to_string(),
            vulnerabilities: 2,
            violations: 0,
        });

        let lines = summary_lines(&outcome);

        assert_eq!(lines[1], "Vulnerabilities :    2");
        assert_eq!(lines[2], "Violations      :    0");
        assert_eq!(report_url(&outcome), "https://app.example/report");
    }

    #[test]
    fn test_summary_for_started_scan() {
        let outcome = ScanOutcome::Started {
            report_url: "https://app.example/r/1".to_string(),
        };
        assert_eq!(summary_lines(&outcome).len(), 1);
        assert_eq!(report_url(&outcome), "https://app.example/r/1");
    }
}
