use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base pkgsync config directory (~/.config/pkgsync/, %APPDATA%\pkgsync on Windows)
pub fn pkgsync() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("pkgsync"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("pkgsync"))
    }
}

/// Global pkgsync.json config file path
pub fn pkgsync_json() -> Result<PathBuf> {
    Ok(pkgsync()?.join("pkgsync.json"))
}

/// Per-version install directory: `<install_root>/<tool>/<tag>`
pub fn install_dir(install_root: &str, tool_name: &str, tag: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(install_root).to_string())
        .join(tool_name)
        .join(tag)
}

/// Platform executable suffix (".exe" on Windows, empty elsewhere)
pub fn exe_suffix() -> &'static str {
    env::consts::EXE_SUFFIX
}
