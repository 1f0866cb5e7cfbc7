//! Working-directory containment for tool paths.

use std::io;
use std::path::{Path, PathBuf, absolute};

use super::{DenialReason, ToolError};

/// Filesystem sandbox rooted at the working directory.
#[derive(Debug, Clone)]
pub struct Sandbox {
    working_dir: PathBuf,
}

impl Sandbox {
    /// Roots the sandbox at `working_dir`, made absolute and lexically cleaned.
    pub fn new(working_dir: impl AsRef<Path>) -> io::Result<Self> {
        let resolved = absolute(working_dir.as_ref())?;
        let cleaned = clean_path(&resolved.to_string_lossy());
        Ok(Self {
            working_dir: PathBuf::from(cleaned),
        })
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Clean `path` and require that it stays under the working directory.
    ///
    /// Relative paths that do not start with `..` are accepted as-is. Paths
    /// that are absolute or climb out lexically are resolved against the
    /// working directory and must remain inside it.
    pub fn validate(&self, path: &str) -> Result<String, ToolError> {
        let clean = clean_path(path);
        if clean.starts_with("..") || Path::new(&clean).is_absolute() {
            let resolved = if Path::new(&clean).is_absolute() {
                clean.clone()
            } else {
                clean_path(&self.working_dir.join(&clean).to_string_lossy())
            };
            if !Path::new(&resolved).starts_with(&self.working_dir) {
                tracing::warn!(path, "Rejected path outside working directory");
                return Err(ToolError::SandboxViolation(DenialReason::PathTraversal {
                    attempted: path.to_string(),
                }));
            }
        }
        Ok(clean)
    }

    /// Location of a validated path on disk.
    #[must_use]
    pub fn resolve(&self, clean: &str) -> PathBuf {
        self.working_dir.join(clean)
    }
}

/// Lexical path normalization.
///
/// Collapses repeated separators, drops `.` segments, and folds `..` into the
/// preceding segment where one exists. Leading `..` segments survive on
/// relative paths and vanish at the root of absolute ones. An empty result
/// becomes `.`.
#[must_use]
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Final segment of a cleaned path.
#[must_use]
pub fn base_name(clean: &str) -> &str {
    if clean == "/" {
        return clean;
    }
    clean.rsplit('/').next().unwrap_or(clean)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{Sandbox, base_name, clean_path};
    use crate::{DenialReason, ToolError};

    #[test]
    fn clean_path_normalizes() {
        let cases = [
            ("", "."),
            (".", "."),
            ("./foo", "foo"),
            ("foo//bar/", "foo/bar"),
            ("foo/./bar", "foo/bar"),
            ("foo/../bar", "bar"),
            ("foo/..", "."),
            ("../foo", "../foo"),
            ("../../a/../b", "../../b"),
            ("/..", "/"),
            ("/a/b/../../..", "/"),
            ("/tmp/./x//y", "/tmp/x/y"),
        ];
        for (input, expected) in cases {
            assert_eq!(clean_path(input), expected, "clean_path({input:?})");
        }
    }

    #[test]
    fn base_name_of_cleaned_paths() {
        assert_eq!(base_name("foo/bar.txt"), "bar.txt");
        assert_eq!(base_name("bar.txt"), "bar.txt");
        assert_eq!(base_name("/"), "/");
        assert_eq!(base_name("/etc/passwd"), "passwd");
    }

    #[test]
    fn validate_accepts_paths_inside() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();
        for (input, expected) in [
            ("main.go", "main.go"),
            ("./src/main.go", "src/main.go"),
            ("src/../main.go", "main.go"),
            ("a/b/../../c", "c"),
            (".", "."),
        ] {
            assert_eq!(sandbox.validate(input).unwrap(), expected);
        }
    }

    #[test]
    fn validate_accepts_absolute_path_inside() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();
        let inside = sandbox.working_dir().join("notes").join("a.md");
        let inside = inside.to_string_lossy().to_string();
        assert_eq!(sandbox.validate(&inside).unwrap(), inside);

        let root = sandbox.working_dir().to_string_lossy().to_string();
        assert!(sandbox.validate(&root).is_ok());
    }

    #[test]
    fn validate_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let sandbox = Sandbox::new(dir.path()).unwrap();
        for input in [
            "../secret",
            "../../../etc/passwd",
            "foo/../../bar",
            "/etc/passwd",
            "/",
        ] {
            let err = sandbox.validate(input).unwrap_err();
            assert!(
                matches!(
                    &err,
                    ToolError::SandboxViolation(DenialReason::PathTraversal { attempted })
                        if attempted == input
                ),
                "expected traversal error for {input:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn validate_rejects_sibling_with_shared_prefix() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("work");
        fs::create_dir(&root).unwrap();
        let sandbox = Sandbox::new(&root).unwrap();
        let sibling = parent.path().join("work-other").join("file.txt");
        assert!(sandbox.validate(&sibling.to_string_lossy()).is_err());
        assert!(sandbox.validate("../work-other/file.txt").is_err());
    }

    #[test]
    fn climbing_back_into_root_is_allowed() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("work");
        fs::create_dir(&root).unwrap();
        let sandbox = Sandbox::new(&root).unwrap();
        assert_eq!(
            sandbox.validate("../work/notes.md").unwrap(),
            "../work/notes.md"
        );
    }
}
