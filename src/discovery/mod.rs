//! Manifest discovery.
//!
//! Walks a source tree once, then matches every supported manifest pattern
//! against the walked files. The root is passed explicitly; the process
//! working directory is never changed, so discovery is reentrant.
//!
//! Results keep catalog order (package manager, then pattern, then walk order)
//! and are not de-duplicated: a file matched by two patterns appears twice.

pub mod glob;

use std::path::{Path, PathBuf};

use tracing::{info, info_span, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, ScanError};
use crate::models::{ManifestFile, PackageManagerManifests};
use glob::{manifest_glob, matcher, Exclusions};

/// Directories never searched unless configuration says otherwise.
pub const DEFAULT_EXCLUDED_DIRECTORIES: [&str; 4] =
    ["**/node_modules/**", "**/bin/**", "**/obj/**", "**/lib/**"];

/// A walked file: absolute path plus its path relative to the root.
struct WalkedFile {
    path: PathBuf,
    relative: PathBuf,
}

/// Find every file under `root` matching a pattern from `catalog`, skipping
/// anything under a directory matched by `excluded_dirs`.
///
/// A catalog pattern that is not a valid glob matches nothing. A malformed
/// exclusion glob is an error: it comes from the task's own configuration.
pub fn discover(
    root: &Path,
    excluded_dirs: &[String],
    catalog: &[PackageManagerManifests],
) -> Result<Vec<ManifestFile>> {
    let root = root.canonicalize().map_err(|e| ScanError::io(root, e))?;
    let _span = info_span!("manifest_search").entered();
    info!("Searching for manifests in {}", root.display());

    let exclusions = Exclusions::new(excluded_dirs).map_err(|e| ScanError::InvalidGlob {
        glob: e.glob().unwrap_or_default().to_string(),
        reason: e.kind().to_string(),
    })?;

    let files = walk(&root, &exclusions);

    let mut matched: Vec<&Path> = Vec::new();
    for package_manager in catalog {
        for manifest in &package_manager.manifests {
            let glob = manifest_glob(&manifest.pattern);
            let glob_matcher = match matcher(&glob) {
                Ok(m) => m,
                Err(e) => {
                    warn!(
                        package_manager = %package_manager.package_manager,
                        "Skipping manifest pattern {}: {}",
                        manifest.pattern,
                        e.kind()
                    );
                    continue;
                }
            };
            let before = matched.len();
            matched.extend(
                files
                    .iter()
                    .filter(|f| glob_matcher.is_match(&f.relative))
                    .map(|f| f.path.as_path()),
            );
            info!(
                package_manager = %package_manager.package_manager,
                lock_file = manifest.is_lock_file,
                "Found {} files matching {}",
                matched.len() - before,
                glob
            );
        }
    }

    matched
        .into_iter()
        .map(|path| -> Result<ManifestFile> {
            info!("Found manifest: {}", path.display());
            let content = std::fs::read(path).map_err(|e| ScanError::io(path, e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("Manifest {} with length {}.", name, content.len());
            Ok(ManifestFile {
                name,
                path: path.to_path_buf(),
            })
        })
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Collect every regular file under `root`.
///
/// Hidden entries are skipped and hidden or excluded directories are not
/// descended.
fn walk(root: &Path, exclusions: &Exclusions) -> Vec<WalkedFile> {
    let relative = |path: &Path| path.strip_prefix(root).unwrap_or(path).to_path_buf();

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(is_hidden(e)
                    || (e.file_type().is_dir() && exclusions.excludes_dir(&relative(e.path()))))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path: {e}");
                continue;
            }
        };

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let relative_path = relative(entry.path());
        if exclusions.excludes_file(&relative_path) {
            continue;
        }
        files.push(WalkedFile {
            path: entry.into_path(),
            relative: relative_path,
        });
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ManifestPattern;
    use std::fs;
    use tempfile::TempDir;

    fn catalog(entries: Vec<(&str, Vec<&str>)>) -> Vec<PackageManagerManifests> {
        entries
            .into_iter()
            .map(|(package_manager, patterns)| PackageManagerManifests {
                package_manager: package_manager.to_string(),
                manifests: patterns
                    .iter()
                    .map(|p| ManifestPattern {
                        pattern: p.to_string(),
                        is_lock_file: p.contains("lock"),
                    })
                    .collect(),
            })
            .collect()
    }

    fn default_exclusions() -> Vec<String> {
        DEFAULT_EXCLUDED_DIRECTORIES
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_node_modules_is_excluded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "repo/package.json", "{}");
        write(dir.path(), "repo/node_modules/x/package.json", "{}");

        let files = discover(
            &dir.path().join("repo"),
            &default_exclusions(),
            &catalog(vec![("NPM", vec!["package.json"])]),
        )
        .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "package.json");
        assert!(files[0].path.is_absolute());
        assert_eq!(
            files[0].path,
            dir.path().join("repo/package.json").canonicalize().unwrap()
        );
    }

    #[test]
    fn test_extension_pattern_matches_suffix() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/Api/Api.csproj", "<Project/>");
        write(dir.path(), "src/Api/bin/Debug/Copy.csproj", "<Project/>");
        write(dir.path(), "src/Api/Api.cs", "class A {}");

        let files = discover(
            dir.path(),
            &default_exclusions(),
            &catalog(vec![("NuGet", vec![".csproj"])]),
        )
        .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "Api.csproj");
    }

    #[test]
    fn test_order_follows_catalog_then_pattern() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/requirements.txt", "flask");
        write(dir.path(), "b/package-lock.json", "{}");
        write(dir.path(), "c/package.json", "{}");

        let files = discover(
            dir.path(),
            &default_exclusions(),
            &catalog(vec![
                ("NPM", vec!["package.json", "package-lock.json"]),
                ("PyPI", vec!["requirements.txt"]),
            ]),
        )
        .unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["package.json", "package-lock.json", "requirements.txt"]);
    }

    #[test]
    fn test_overlapping_patterns_are_not_deduplicated() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "yarn.lock", "");

        let files = discover(
            dir.path(),
            &default_exclusions(),
            &catalog(vec![("Yarn", vec!["yarn.lock"]), ("Generic", vec![".lock"])]),
        )
        .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, files[1].path);
    }

    #[test]
    fn test_case_insensitive_match() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Pipfile.LOCK", "{}");

        let files = discover(dir.path(), &[], &catalog(vec![("PyPI", vec!["pipfile.lock"])])).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "Pipfile.LOCK");
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "# hi");

        let files = discover(
            dir.path(),
            &default_exclusions(),
            &catalog(vec![("NPM", vec!["package.json"])]),
        )
        .unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_custom_exclusion() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app/package.json", "{}");
        write(dir.path(), "fixtures/package.json", "{}");

        let mut exclusions = default_exclusions();
        exclusions.push("**/fixtures/**".to_string());
        let files = discover(dir.path(), &exclusions, &catalog(vec![("NPM", vec!["package.json"])]))
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("app/package.json"));
    }

    #[test]
    fn test_hidden_entries_are_not_walked() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".git/objects/ab/cdef", "blob");
        write(dir.path(), ".github/package.json", "{}");
        write(dir.path(), ".package.json", "{}");
        write(dir.path(), "web/package.json", "{}");

        let root = dir.path().canonicalize().unwrap();
        let files = walk(&root, &Exclusions::new(&[]).unwrap());

        let relative: Vec<PathBuf> = files.into_iter().map(|f| f.relative).collect();
        assert_eq!(relative, [PathBuf::from("web/package.json")]);
    }

    #[test]
    fn test_excluded_directory_is_pruned() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "node_modules/a/b/c.txt", "");
        write(dir.path(), "src/obj/Debug/x.json", "");
        write(dir.path(), "src/main.rs", "");

        let root = dir.path().canonicalize().unwrap();
        let files = walk(&root, &Exclusions::new(&default_exclusions()).unwrap());

        let relative: Vec<PathBuf> = files.into_iter().map(|f| f.relative).collect();
        assert_eq!(relative, [PathBuf::from("src/main.rs")]);
    }

    #[test]
    fn test_malformed_pattern_matches_nothing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{}");

        let files = discover(
            dir.path(),
            &[],
            &catalog(vec![("NPM", vec!["[z-a].json", "package.json"])]),
        )
        .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "package.json");
    }

    #[test]
    fn test_malformed_exclusion_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = discover(dir.path(), &["**/{vendor/**".to_string()], &[]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidGlob { .. }));
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("nope"), &[], &[]).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[test]
    fn test_working_directory_is_untouched() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{}");
        let before = std::env::current_dir().unwrap();

        discover(dir.path(), &[], &catalog(vec![("NPM", vec!["package.json"])])).unwrap();

        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
