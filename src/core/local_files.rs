use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults::WalkConfig;
use crate::error::{Error, Result};

/// Which files a tree walk yields.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    /// File extension without the dot (e.g. "java").
    pub extension: String,
    /// Directory names skipped at any depth.
    pub skip_dirs: Vec<String>,
    /// Glob patterns matched against root-relative paths.
    pub exclude: Vec<String>,
}

impl SourceFilter {
    pub fn new(extension: impl Into<String>, walk: &WalkConfig) -> Self {
        Self {
            extension: extension.into(),
            skip_dirs: walk.skip_dirs.clone(),
            exclude: walk.exclude.clone(),
        }
    }

    /// Filter that only checks the extension.
    pub fn extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            skip_dirs: Vec::new(),
            exclude: Vec::new(),
        }
    }

    fn skips_dir(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|d| d == name)
    }

    /// Whether `path` (somewhere under `root`) is an eligible source file.
    pub fn accepts(&self, root: &Path, path: &Path) -> bool {
        if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
            return false;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let in_skipped_dir = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .any(|c| self.skips_dir(&c.as_os_str().to_string_lossy()))
            })
            .unwrap_or(false);
        if in_skipped_dir {
            return false;
        }

        if self.exclude.is_empty() {
            return true;
        }
        let relative = relative_slash_path(relative);
        !self
            .exclude
            .iter()
            .any(|pattern| glob_match::glob_match(pattern, &relative))
    }
}

fn relative_slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// File access used by both passes of the fixer.
pub trait FileSystem {
    fn read(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    /// Every eligible file under `root`, recursively, in sorted order.
    fn walk(&self, root: &Path, filter: &SourceFilter) -> Result<Vec<PathBuf>>;
}

/// Local filesystem implementation
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::internal_io(
                    format!("File not found: {}", path.display()),
                    Some("read file".to_string()),
                )
            } else {
                Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
            }
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        // Symlinked sources are written through the link
        let target = resolve_link(path)?;
        let path = target.as_path();

        // Atomic write: write to temp file, then rename
        let parent = path.parent().ok_or_else(|| {
            Error::internal_io(
                format!("Invalid path: {}", path.display()),
                Some("write file".to_string()),
            )
        })?;

        let filename = path.file_name().ok_or_else(|| {
            Error::internal_io(
                format!("Invalid path: {}", path.display()),
                Some("write file".to_string()),
            )
        })?;

        let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));
        let permissions = fs::metadata(path).ok().map(|m| m.permissions());

        fs::write(&tmp_path, content)
            .map_err(|e| Error::internal_io(e.to_string(), Some("write temp file".to_string())))?;

        if let Some(permissions) = permissions {
            fs::set_permissions(&tmp_path, permissions).map_err(|e| {
                Error::internal_io(e.to_string(), Some("copy file permissions".to_string()))
            })?;
        }

        fs::rename(&tmp_path, path)
            .map_err(|e| Error::internal_io(e.to_string(), Some("rename temp file".to_string())))?;

        Ok(())
    }

    fn walk(&self, root: &Path, filter: &SourceFilter) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        walk_recursive(root, root, filter, &mut files)?;
        files.sort();
        Ok(files)
    }
}

fn walk_recursive(
    dir: &Path,
    root: &Path,
    filter: &SourceFilter,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("list {}", dir.display())))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("list {}", dir.display())))
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("stat {}", path.display())))
        })?;

        if file_type.is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            if filter.skips_dir(&name) {
                continue;
            }
            walk_recursive(&path, root, filter, files)?;
        } else if file_type.is_symlink() && path.is_dir() {
            // Linked directories are not descended into
            continue;
        } else if filter.accepts(root, &path) {
            files.push(path);
        }
    }

    Ok(())
}

/// The file a symlink ultimately points at, or `path` itself.
fn resolve_link(path: &Path) -> Result<PathBuf> {
    let is_link = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return Ok(path.to_path_buf());
    }

    fs::canonicalize(path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("resolve link {}", path.display())))
    })
}

/// Convenience function to get local filesystem
pub fn local() -> LocalFs {
    LocalFs::new()
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_local_fs_write_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Test.java");
        let fs = local();

        fs.write(&path, "package a;\n").unwrap();
        let content = fs.read(&path).unwrap();
        assert_eq!(content, "package a;\n");
        assert!(!dir.path().join("Test.java.tmp").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_write_goes_through_symlink() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("Real.java");
        let link = dir.path().join("Link.java");
        std::fs::write(&real, "package old;\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        local().write(&link, "package a;\n").unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "package a;\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("Tool.java");
        std::fs::write(&path, "package old;\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o750)).unwrap();

        local().write(&path, "package a;\n").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    #[cfg(unix)]
    fn test_walk_skips_symlinked_directories() {
        let dir = tempdir().unwrap();
        let fs = local();

        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        fs.write(&dir.path().join("a/One.java"), "").unwrap();
        std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("link")).unwrap();

        let files = fs.walk(dir.path(), &SourceFilter::extension("java")).unwrap();
        assert_eq!(files, vec![dir.path().join("a/One.java")]);
    }

    #[test]
    fn test_walk_filters_extension_and_sorts() {
        let dir = tempdir().unwrap();
        let fs = local();

        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        fs.write(&dir.path().join("b/Two.java"), "").unwrap();
        fs.write(&dir.path().join("a/One.java"), "").unwrap();
        fs.write(&dir.path().join("a/notes.txt"), "").unwrap();

        let files = fs.walk(dir.path(), &SourceFilter::extension("java")).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a/One.java"), dir.path().join("b/Two.java")]
        );
    }

    #[test]
    fn test_walk_skips_vcs_dirs() {
        let dir = tempdir().unwrap();
        let fs = local();

        std::fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs.write(&dir.path().join(".git/objects/Stray.java"), "").unwrap();
        fs.write(&dir.path().join("Main.java"), "").unwrap();

        let filter = SourceFilter::new("java", &WalkConfig::default());
        let files = fs.walk(dir.path(), &filter).unwrap();
        assert_eq!(files, vec![dir.path().join("Main.java")]);
    }

    #[test]
    fn test_exclude_globs_match_relative_paths() {
        let root = Path::new("/src");
        let mut filter = SourceFilter::extension("java");
        filter.exclude = vec!["generated/**".to_string()];

        assert!(!filter.accepts(root, Path::new("/src/generated/deep/Proto.java")));
        assert!(filter.accepts(root, Path::new("/src/app/Proto.java")));
    }

    #[test]
    fn test_walk_missing_root_is_io_error() {
        let fs = local();
        let err = fs
            .walk(Path::new("/nonexistent/pkgsync/root"), &SourceFilter::extension("java"))
            .unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }
}
