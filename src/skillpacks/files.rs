//! Deterministic enumeration of the files that make up a skill.

use crate::error::Result;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem metadata artifacts that never belong in a package
pub const DEFAULT_EXCLUDES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// A file to package: where it lives and where it goes in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillFile {
    pub source: PathBuf,
    pub relative: PathBuf,
}

impl SkillFile {
    /// Archive path under `prefix`, always `/`-separated
    pub fn archive_path(&self, prefix: &str) -> String {
        let mut out = String::from(prefix);
        for component in self.relative.components() {
            if let Component::Normal(part) = component {
                out.push('/');
                out.push_str(&part.to_string_lossy());
            }
        }
        out
    }
}

/// Restartable listing of every packageable file under a root directory.
///
/// Siblings are visited in byte order of their names, so the walk yields
/// paths in component-wise lexicographic order regardless of what the
/// filesystem returns.
#[derive(Debug, Clone)]
pub struct SkillFiles {
    root: PathBuf,
    excludes: Vec<String>,
}

impl SkillFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excludes: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Add more excluded path components on top of the defaults
    pub fn with_excludes<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in extra {
            let name = name.into();
            if !self.excludes.contains(&name) {
                self.excludes.push(name);
            }
        }
        self
    }

    fn is_excluded(&self, name: &OsStr) -> bool {
        self.excludes.iter().any(|e| OsStr::new(e) == name)
    }

    /// Walk the root afresh. Each call produces the same sequence for an
    /// unchanged tree.
    pub fn iter(&self) -> impl Iterator<Item = Result<SkillFile>> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            // an excluded directory prunes everything beneath it
            .filter_entry(move |e| e.depth() == 0 || !self.is_excluded(e.file_name()))
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(e.into())),
                };
                // follows symlinks; dirs, broken links and special files drop out
                if !entry.path().is_file() {
                    return None;
                }
                let relative = entry.path().strip_prefix(&self.root).ok()?.to_path_buf();
                Some(Ok(SkillFile {
                    source: entry.into_path(),
                    relative,
                }))
            })
    }

    /// Collect the whole listing, failing on the first walk error
    pub fn collect(&self) -> Result<Vec<SkillFile>> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, rel).unwrap();
    }

    fn relatives(files: &SkillFiles) -> Vec<String> {
        files
            .collect()
            .unwrap()
            .iter()
            .map(|f| f.archive_path("x"))
            .collect()
    }

    #[test]
    fn test_excludes_metadata_artifacts() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.txt");
        touch(tmp.path(), "sub/b.txt");
        touch(tmp.path(), "sub/.DS_Store");
        touch(tmp.path(), "Thumbs.db/inner.txt");

        let files = SkillFiles::new(tmp.path());
        assert_eq!(relatives(&files), vec!["x/a.txt", "x/sub/b.txt"]);
    }

    #[test]
    fn test_sorted_and_skips_directories() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b/z.txt");
        touch(tmp.path(), "a-b/y.txt");
        touch(tmp.path(), "a/x.txt");
        touch(tmp.path(), "SKILL.md");
        std::fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let files = SkillFiles::new(tmp.path());
        assert_eq!(
            relatives(&files),
            vec!["x/SKILL.md", "x/a/x.txt", "x/a-b/y.txt", "x/b/z.txt"]
        );
    }

    #[test]
    fn test_restartable() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "one.txt");
        touch(tmp.path(), "two/three.txt");

        let files = SkillFiles::new(tmp.path());
        let first: Vec<_> = files.iter().map(|f| f.unwrap()).collect();
        let second: Vec<_> = files.iter().map(|f| f.unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_extra_excludes() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "keep.txt");
        touch(tmp.path(), "node_modules/pkg/index.js");

        let files = SkillFiles::new(tmp.path()).with_excludes(["node_modules"]);
        assert_eq!(relatives(&files), vec!["x/keep.txt"]);
    }

    #[test]
    fn test_excluded_root_name_is_not_checked() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join(".DS_Store");
        touch(&root, "kept.txt");

        assert_eq!(relatives(&SkillFiles::new(&root)), vec!["x/kept.txt"]);
    }

    #[test]
    fn test_archive_path_uses_forward_slashes() {
        let file = SkillFile {
            source: PathBuf::from("/src/a/b/c.txt"),
            relative: Path::new("a").join("b").join("c.txt"),
        };
        assert_eq!(file.archive_path("skill"), "skill/a/b/c.txt");
    }
}
