//! Search globs for manifest patterns and excluded directories.
//!
//! Every glob is compiled with `globset`, case-insensitive, with `*` and `?`
//! stopping at `/`. Globs are matched against paths relative to the search
//! root.

use std::path::Path;

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

/// Build the search glob for a manifest pattern.
///
/// Patterns starting with `.` are extensions and match as a filename suffix;
/// anything else is a filename pattern matched verbatim at any depth.
pub fn manifest_glob(pattern: &str) -> String {
    if pattern.starts_with('.') {
        format!("**/*{pattern}")
    } else {
        format!("**/{pattern}")
    }
}

fn build(glob: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(glob)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
}

/// Compile one search glob into a matcher.
pub fn matcher(glob: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(build(glob)?.compile_matcher())
}

/// Excluded-directory globs.
///
/// A glob ending in `/**` also matches the directory it names, so the walk can
/// prune that directory instead of descending into it.
#[derive(Debug)]
pub struct Exclusions {
    dirs: GlobSet,
    files: GlobSet,
}

impl Exclusions {
    pub fn new(globs: &[String]) -> Result<Self, globset::Error> {
        let mut dirs = GlobSetBuilder::new();
        let mut files = GlobSetBuilder::new();
        for glob in globs {
            let compiled = build(glob)?;
            dirs.add(compiled.clone());
            files.add(compiled);
            if let Some(dir) = glob.strip_suffix("/**").filter(|d| !d.is_empty()) {
                dirs.add(build(dir)?);
            }
        }

        Ok(Self {
            dirs: dirs.build()?,
            files: files.build()?,
        })
    }

    pub fn excludes_dir(&self, relative: &Path) -> bool {
        self.dirs.is_match(relative)
    }

    pub fn excludes_file(&self, relative: &Path) -> bool {
        self.files.is_match(relative)
    }
}
