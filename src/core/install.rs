use serde::Serialize;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;

// === PATH lookup ===

/// First PATH entry whose text contains `tool_name`.
pub fn find_install_entry(path_var: &OsStr, tool_name: &str) -> Option<PathBuf> {
    env::split_paths(path_var).find(|entry| entry.to_string_lossy().contains(tool_name))
}

/// Install entry from the current process PATH.
pub fn current_install_entry(tool_name: &str) -> Option<PathBuf> {
    env::var_os("PATH").and_then(|path| find_install_entry(&path, tool_name))
}

fn same_entry(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Drop every entry equal to `old_entry` (trimmed, case-insensitive), drop
/// empty entries, then append `new_entry`.
pub fn rewrite_path_value(current: &str, old_entry: &str, new_entry: &str, separator: char) -> String {
    let mut entries: Vec<&str> = current
        .split(separator)
        .filter(|part| !part.trim().is_empty())
        .filter(|part| !same_entry(part, old_entry))
        .collect();
    entries.push(new_entry);
    entries.join(&separator.to_string())
}

// === User PATH persistence ===

/// Where the user-level PATH value lives.
pub trait UserPathStore {
    fn separator(&self) -> char;

    fn read(&self) -> Result<String>;

    /// Store `value`. Returns false when the store cannot persist it.
    fn write(&self, value: &str) -> Result<bool>;
}

/// User `Path` value from a `reg query HKCU\Environment` listing.
///
/// The listing must name the key; a key without a `Path` value reads as
/// empty. Anything else is an error so a bad read never overwrites PATH.
#[cfg_attr(not(windows), allow(dead_code))]
fn path_from_reg_query(output: &str) -> Result<String> {
    let names_key = output
        .lines()
        .any(|line| line.trim().eq_ignore_ascii_case(r"HKEY_CURRENT_USER\Environment"));
    if !names_key {
        return Err(Error::internal_unexpected(format!(
            "Unrecognized reg query output: {}",
            output.trim()
        )));
    }

    let pattern = regex::Regex::new(r"(?i)^\s*Path\s+REG_(?:EXPAND_)?SZ(?:\s+(.*))?$")
        .map_err(|e| Error::internal_unexpected(e.to_string()))?;
    Ok(output
        .lines()
        .find_map(|line| {
            pattern.captures(line).map(|c| {
                c.get(1)
                    .map(|m| m.as_str().trim_end().to_string())
                    .unwrap_or_default()
            })
        })
        .unwrap_or_default())
}

/// `HKCU\Environment\Path`, edited through `reg.exe`.
#[cfg(windows)]
pub struct RegistryPathStore;

#[cfg(windows)]
impl RegistryPathStore {
    const KEY: &'static str = r"HKCU\Environment";
}

#[cfg(windows)]
impl UserPathStore for RegistryPathStore {
    fn separator(&self) -> char {
        ';'
    }

    fn read(&self) -> Result<String> {
        // Query the whole key so a missing value is told apart from a failed query
        let output = crate::utils::command::run("reg", &["query", Self::KEY], "read user PATH")?;
        path_from_reg_query(&output)
    }

    fn write(&self, value: &str) -> Result<bool> {
        crate::utils::command::run(
            "reg",
            &["add", Self::KEY, "/v", "Path", "/t", "REG_EXPAND_SZ", "/d", value, "/f"],
            "write user PATH",
        )?;
        Ok(true)
    }
}

/// Reads the process PATH and never persists; the caller reports the value.
pub struct ReportOnlyPathStore;

impl UserPathStore for ReportOnlyPathStore {
    fn separator(&self) -> char {
        if cfg!(windows) {
            ';'
        } else {
            ':'
        }
    }

    fn read(&self) -> Result<String> {
        Ok(env::var("PATH").unwrap_or_default())
    }

    fn write(&self, _value: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Platform store: the registry on Windows, report-only elsewhere.
pub fn default_store() -> Box<dyn UserPathStore> {
    #[cfg(windows)]
    {
        Box::new(RegistryPathStore)
    }

    #[cfg(not(windows))]
    {
        Box::new(ReportOnlyPathStore)
    }
}

// === Public API ===

/// Copy a finished build into its per-version install directory.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub tool_name: String,
    pub tag: String,
    pub install_root: String,
    /// The versioned executable produced by the build.
    pub source: PathBuf,
}

impl InstallPlan {
    pub fn destination_dir(&self) -> PathBuf {
        paths::install_dir(&self.install_root, &self.tool_name, &self.tag)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallOutput {
    pub source: String,
    pub destination: String,
    pub old_entry: String,
    pub path_updated: bool,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_value: Option<String>,
}

/// Copy the build next to the other versions and point the user PATH at it.
///
/// `old_entry` is the PATH entry found by [`current_install_entry`]; the caller
/// is responsible for confirming with the user first.
pub fn install(plan: &InstallPlan, old_entry: &Path, store: &dyn UserPathStore) -> Result<InstallOutput> {
    if !plan.source.is_file() {
        return Err(Error::validation_invalid_argument(
            "tag",
            format!("No build found at {}", plan.source.display()),
            Some(plan.tag.clone()),
            None,
        )
        .with_hint("Run `pkgsync build` first, or pass the tag of an existing build"));
    }

    let dest_dir = plan.destination_dir();
    fs::create_dir_all(&dest_dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", dest_dir.display())))
    })?;

    let file_name = plan.source.file_name().ok_or_else(|| {
        Error::internal_unexpected(format!("Build path has no file name: {}", plan.source.display()))
    })?;
    let dest_file = dest_dir.join(file_name);
    fs::copy(&plan.source, &dest_file).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("copy {} → {}", plan.source.display(), dest_file.display())),
        )
    })?;
    log_status!("install", "Copied build to {}", dest_dir.display());

    let old = old_entry.to_string_lossy().to_string();
    let new = dest_dir.to_string_lossy().to_string();

    let mut output = InstallOutput {
        source: plan.source.display().to_string(),
        destination: new.clone(),
        old_entry: old.clone(),
        path_updated: false,
        persisted: false,
        path_value: None,
    };

    if same_entry(&old, &new) {
        return Ok(output);
    }

    let current = store.read()?;
    let value = rewrite_path_value(&current, &old, &new, store.separator());
    output.persisted = store.write(&value)?;
    output.path_updated = true;
    output.path_value = Some(value);

    if output.persisted {
        log_status!("install", "User PATH updated");
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    struct RecordingStore {
        value: RefCell<String>,
    }

    impl UserPathStore for RecordingStore {
        fn separator(&self) -> char {
            ';'
        }

        fn read(&self) -> Result<String> {
            Ok(self.value.borrow().clone())
        }

        fn write(&self, value: &str) -> Result<bool> {
            *self.value.borrow_mut() = value.to_string();
            Ok(true)
        }
    }

    #[test]
    fn rewrite_drops_old_entry_case_insensitively() {
        let value = rewrite_path_value(
            r"C:\Windows; C:\Users\me\Programs\PKGSYNC\2025w01 ;C:\Tools",
            r"C:\Users\me\Programs\pkgsync\2025w01",
            r"C:\Users\me\Programs\pkgsync\2025w07",
            ';',
        );
        assert_eq!(
            value,
            r"C:\Windows;C:\Tools;C:\Users\me\Programs\pkgsync\2025w07"
        );
    }

    #[test]
    fn rewrite_drops_empty_entries() {
        let value = rewrite_path_value("a;;b;", "old", "new", ';');
        assert_eq!(value, "a;b;new");
    }

    #[test]
    #[cfg(unix)]
    fn find_install_entry_matches_substring() {
        let path = OsStr::new("/usr/bin:/home/me/Programs/pkgsync/2025w01:/bin");
        assert_eq!(
            find_install_entry(path, "pkgsync"),
            Some(PathBuf::from("/home/me/Programs/pkgsync/2025w01"))
        );
        assert_eq!(find_install_entry(path, "other"), None);
    }

    #[test]
    fn install_copies_build_and_updates_path() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("dist/2025w07/pkgsync");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "bin").unwrap();

        let root = dir.path().join("Programs");
        let plan = InstallPlan {
            tool_name: "pkgsync".to_string(),
            tag: "2025w07".to_string(),
            install_root: root.display().to_string(),
            source,
        };
        let old_entry = root.join("pkgsync").join("2025w01");
        let store = RecordingStore {
            value: RefCell::new(format!("/bin;{}", old_entry.display())),
        };

        let output = install(&plan, &old_entry, &store).unwrap();

        let dest = root.join("pkgsync").join("2025w07");
        assert_eq!(fs::read_to_string(dest.join("pkgsync")).unwrap(), "bin");
        assert!(output.path_updated);
        assert!(output.persisted);
        assert_eq!(*store.value.borrow(), format!("/bin;{}", dest.display()));
    }

    #[test]
    fn install_leaves_path_alone_when_entry_is_current() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("pkgsync");
        fs::write(&source, "bin").unwrap();

        let root = dir.path().join("Programs");
        let plan = InstallPlan {
            tool_name: "pkgsync".to_string(),
            tag: "2025w07".to_string(),
            install_root: root.display().to_string(),
            source,
        };
        let store = RecordingStore {
            value: RefCell::new("/bin".to_string()),
        };

        let output = install(&plan, &plan.destination_dir(), &store).unwrap();
        assert!(!output.path_updated);
        assert_eq!(*store.value.borrow(), "/bin");
    }

    struct UnreadableStore {
        written: RefCell<bool>,
    }

    impl UserPathStore for UnreadableStore {
        fn separator(&self) -> char {
            ';'
        }

        fn read(&self) -> Result<String> {
            Err(Error::internal_io("Access is denied.", Some("read user PATH".to_string())))
        }

        fn write(&self, _value: &str) -> Result<bool> {
            *self.written.borrow_mut() = true;
            Ok(true)
        }
    }

    #[test]
    fn reg_query_path_value_is_extracted() {
        let output = "\r\nHKEY_CURRENT_USER\\Environment\r\n    \
                      Path    REG_EXPAND_SZ    C:\\Tools;%USERPROFILE%\\bin\r\n    \
                      TEMP    REG_EXPAND_SZ    %USERPROFILE%\\AppData\\Local\\Temp\r\n";
        assert_eq!(
            path_from_reg_query(output).unwrap(),
            "C:\\Tools;%USERPROFILE%\\bin"
        );
    }

    #[test]
    fn reg_query_without_path_value_reads_empty() {
        let output = "\r\nHKEY_CURRENT_USER\\Environment\r\n    \
                      TEMP    REG_EXPAND_SZ    C:\\Temp\r\n";
        assert_eq!(path_from_reg_query(output).unwrap(), "");
    }

    #[test]
    fn unrecognized_reg_query_output_is_error() {
        let err = path_from_reg_query("ERROR: Access is denied.").unwrap_err();
        assert_eq!(err.code.as_str(), "internal.unexpected");
    }

    #[test]
    fn failed_path_read_never_writes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("pkgsync");
        fs::write(&source, "bin").unwrap();

        let plan = InstallPlan {
            tool_name: "pkgsync".to_string(),
            tag: "2025w07".to_string(),
            install_root: dir.path().join("Programs").display().to_string(),
            source,
        };
        let store = UnreadableStore {
            written: RefCell::new(false),
        };

        let err = install(&plan, Path::new("/old/pkgsync"), &store).unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
        assert!(!*store.written.borrow());
    }

    #[test]
    fn install_without_build_is_validation_error() {
        let dir = tempdir().unwrap();
        let plan = InstallPlan {
            tool_name: "pkgsync".to_string(),
            tag: "2025w07".to_string(),
            install_root: dir.path().display().to_string(),
            source: dir.path().join("missing"),
        };

        let err = install(&plan, Path::new("/old"), &ReportOnlyPathStore).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert_eq!(err.hints.len(), 1);
    }
}
