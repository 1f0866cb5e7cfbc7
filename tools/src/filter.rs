//! Sensitive-path filter: keeps secrets out of tool output.

use std::fs;
use std::io;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};

use super::ToolError;
use super::sandbox::{base_name, clean_path};

/// Patterns that are always blocked.
pub const DEFAULT_BLOCKED_PATTERNS: &[&str] = &[
    ".env",
    ".env.*",
    "*.pem",
    "*.key",
    "*.p12",
    "*.pfx",
    "*.secret",
    "*credentials*",
    "*secret*",
    ".aws/credentials",
    ".ssh/*",
    "id_rsa",
    "id_ed25519",
    "*.keystore",
    ".netrc",
    ".npmrc",
    ".pypirc",
];

/// Project-local file of extra patterns, one per line.
pub const IGNORE_FILE_NAME: &str = ".codequeryignore";

#[derive(Debug, Clone)]
enum Matcher {
    Glob(GlobMatcher),
    Literal,
}

#[derive(Debug, Clone)]
struct BlockedPattern {
    pattern: String,
    matcher: Matcher,
}

impl BlockedPattern {
    fn compile(pattern: &str) -> Result<Self, ToolError> {
        let matcher = if pattern.contains(['*', '?', '[']) {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| ToolError::BadArgs {
                    message: format!("invalid blocked pattern '{pattern}': {e}"),
                })?;
            Matcher::Glob(glob.compile_matcher())
        } else {
            Matcher::Literal
        };
        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
        })
    }

    fn matches(&self, clean: &str, base: &str) -> bool {
        match &self.matcher {
            Matcher::Glob(glob) => glob.is_match(clean) || glob.is_match(base),
            Matcher::Literal => {
                let pattern = self.pattern.as_str();
                clean == pattern
                    || base == pattern
                    || clean
                        .strip_suffix(pattern)
                        .is_some_and(|head| head.ends_with('/'))
            }
        }
    }
}

/// Glob-based deny list consulted by the read-oriented tools.
///
/// Shell-glob semantics: `*` and `?` never cross a `/`. A pattern without
/// metacharacters matches an exact basename or a `/<pattern>` suffix.
#[derive(Debug, Clone)]
pub struct SensitivePathFilter {
    patterns: Vec<BlockedPattern>,
}

impl Default for SensitivePathFilter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SensitivePathFilter {
    /// A filter with exactly `patterns`; fails on the first invalid glob.
    pub fn new<I, S>(patterns: I) -> Result<Self, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| BlockedPattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// A filter holding [`DEFAULT_BLOCKED_PATTERNS`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut filter = Self {
            patterns: Vec::with_capacity(DEFAULT_BLOCKED_PATTERNS.len()),
        };
        for pattern in DEFAULT_BLOCKED_PATTERNS {
            filter.push_lenient(pattern);
        }
        filter
    }

    /// Defaults plus `.codequeryignore` from `working_dir`.
    #[must_use]
    pub fn load(working_dir: &Path) -> Self {
        Self::with_defaults().with_ignore_file(&working_dir.join(IGNORE_FILE_NAME))
    }

    /// Append patterns from an ignore file. `#` comment lines and blank lines
    /// are skipped. A missing file leaves the filter unchanged.
    #[must_use]
    pub fn with_ignore_file(mut self, path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read ignore file");
                return self;
            }
        };
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.push_lenient(line);
        }
        self
    }

    fn push_lenient(&mut self, pattern: &str) {
        match BlockedPattern::compile(pattern) {
            Ok(compiled) => self.patterns.push(compiled),
            Err(e) => tracing::warn!(pattern, error = %e, "Skipping invalid blocked pattern"),
        }
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.pattern.as_str())
    }

    #[must_use]
    pub fn is_blocked(&self, path: &str) -> bool {
        let clean = clean_path(path);
        let base = base_name(&clean);
        self.patterns.iter().any(|p| p.matches(&clean, base))
    }

    /// Drop blocked entries, preserving the order of the rest.
    pub fn filter_blocked_paths<I, S>(&self, paths: I) -> Vec<S>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .filter(|p| !self.is_blocked(p.as_ref()))
            .collect()
    }
}
