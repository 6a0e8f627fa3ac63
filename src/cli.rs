use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::Parser;

/// Pipeline task inputs.
///
/// Every input can be given as a flag or through the environment variable the
/// pipeline agent exports for it (`INPUT_<NAME>`).
#[derive(Parser, Debug, Default)]
#[command(
    name = "soos-scan",
    about = "Upload dependency manifests to SOOS and start a security and license scan",
    version
)]
pub struct Cli {
    /// SOOS client id
    #[arg(long, env = "INPUT_CLIENTID")]
    pub client_id: Option<String>,

    /// SOOS API key
    #[arg(long, env = "INPUT_APIKEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Project name the scan is filed under
    #[arg(long, env = "INPUT_PROJECT")]
    pub project: Option<String>,

    /// API root [default: https://api.soos.io/api/]
    #[arg(long, env = "INPUT_BASEURI")]
    pub base_uri: Option<String>,

    /// Source tree to search for manifests [default: .]
    #[arg(long, env = "INPUT_PATH")]
    pub path: Option<PathBuf>,

    #[arg(long, env = "INPUT_COMMITHASH")]
    pub commit_hash: Option<String>,

    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    #[arg(long, env = "INPUT_BUILDVERSION")]
    pub build_version: Option<String>,

    #[arg(long, env = "INPUT_BUILDURI")]
    pub build_uri: Option<String>,

    #[arg(long, env = "INPUT_BRANCHURI")]
    pub branch_uri: Option<String>,

    /// [default: Azure DevOps Pipeline]
    #[arg(long, env = "INPUT_INTEGRATIONNAME")]
    pub integration_name: Option<String>,

    /// [default: CI]
    #[arg(long, env = "INPUT_INTEGRATIONTYPE")]
    pub integration_type: Option<String>,

    /// Windows, MacOS or Linux [default: detected]
    #[arg(long, env = "INPUT_OPERATINGENVIRONMENT")]
    pub operating_environment: Option<String>,

    /// Extra directory globs to skip, added to the defaults (repeatable, comma separated)
    #[arg(
        long = "exclude-dir",
        value_name = "GLOB",
        env = "INPUT_EXCLUDEDDIRECTORIES",
        value_delimiter = ','
    )]
    pub exclude_dirs: Vec<String>,

    /// Poll until the scan finishes and fail on violations or vulnerabilities [default: false]
    #[arg(
        long,
        value_name = "BOOL",
        env = "INPUT_WAITFORSCAN",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = FalseyValueParser::new()
    )]
    pub wait_for_scan: Option<bool>,

    /// Give up waiting after this many status checks [default: unlimited]
    #[arg(long, value_name = "N", env = "INPUT_MAXPOLLATTEMPTS")]
    pub max_poll_attempts: Option<u32>,

    /// Config file [default: <path>/.soos-scan/config.toml, fallback ~/.config/soos-scan/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log request and response bodies
    #[arg(short, long, env = "INPUT_VERBOSE")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "soos-scan",
            "--client-id",
            "c1",
            "--api-key",
            "k1",
            "--project",
            "p1",
            "--path",
            "./repo",
            "--exclude-dir",
            "**/vendor/**,**/dist/**",
            "--wait-for-scan",
        ])
        .unwrap();

        assert_eq!(cli.client_id.as_deref(), Some("c1"));
        assert_eq!(cli.path, Some(PathBuf::from("./repo")));
        assert_eq!(cli.exclude_dirs, ["**/vendor/**", "**/dist/**"]);
        assert_eq!(cli.wait_for_scan, Some(true));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_wait_for_scan_takes_an_explicit_value() {
        let cli = Cli::try_parse_from(["soos-scan", "--wait-for-scan", "false"]).unwrap();
        assert_eq!(cli.wait_for_scan, Some(false));

        let cli = Cli::try_parse_from(["soos-scan", "--wait-for-scan=yes"]).unwrap();
        assert_eq!(cli.wait_for_scan, Some(true));
    }
}
