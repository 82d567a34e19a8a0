use serde::{Deserialize, Serialize};
use std::fs;

use crate::paths;

/// Root configuration structure for pkgsync.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PkgsyncConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via pkgsync.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_language")]
    pub language: LanguageProfile,

    #[serde(default = "default_walk")]
    pub walk: WalkConfig,

    #[serde(default = "default_build")]
    pub build: BuildConfig,

    #[serde(default = "default_install")]
    pub install: InstallConfig,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            language: default_language(),
            walk: default_walk(),
            build: default_build(),
            install: default_install(),
        }
    }
}

/// Textual conventions of the source language being normalized.
///
/// Detection is purely line-prefix based, so these strings are all the
/// engine knows about the language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageProfile {
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_declaration_keyword")]
    pub declaration_keyword: String,

    #[serde(default = "default_import_keyword")]
    pub import_keyword: String,

    #[serde(default = "default_static_keyword")]
    pub static_keyword: String,

    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,

    #[serde(default = "default_namespace_separator")]
    pub namespace_separator: String,

    /// Reproduce the old static-import rewrite that dropped the member name.
    #[serde(default)]
    pub truncate_static_members: bool,
}

impl Default for LanguageProfile {
    fn default() -> Self {
        default_language()
    }
}

/// Which parts of the tree are walked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Directory names skipped at any depth.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// Glob patterns matched against root-relative paths (forward slashes).
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        default_walk()
    }
}

/// Configuration for packaging the standalone executable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_tool_name")]
    pub tool_name: String,

    #[serde(default = "default_script")]
    pub script: String,

    /// Packager invocation; `{script}` is replaced with the script name.
    #[serde(default = "default_packager")]
    pub packager: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,

    #[serde(default = "default_build_dir")]
    pub build_dir: String,
}

/// Configuration for installing a build and updating PATH
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default = "default_install_root")]
    pub install_root: String,
}

// =============================================================================
// Default value functions (match current hardcoded behavior)
// =============================================================================

fn default_language() -> LanguageProfile {
    LanguageProfile {
        extension: default_extension(),
        declaration_keyword: default_declaration_keyword(),
        import_keyword: default_import_keyword(),
        static_keyword: default_static_keyword(),
        comment_prefix: default_comment_prefix(),
        namespace_separator: default_namespace_separator(),
        truncate_static_members: false,
    }
}

fn default_extension() -> String {
    "java".to_string()
}

fn default_declaration_keyword() -> String {
    "package".to_string()
}

fn default_import_keyword() -> String {
    "import".to_string()
}

fn default_static_keyword() -> String {
    "static".to_string()
}

fn default_comment_prefix() -> String {
    "//".to_string()
}

fn default_namespace_separator() -> String {
    ".".to_string()
}

fn default_walk() -> WalkConfig {
    WalkConfig {
        skip_dirs: default_skip_dirs(),
        exclude: Vec::new(),
    }
}

fn default_skip_dirs() -> Vec<String> {
    vec![".git".to_string(), ".svn".to_string(), ".hg".to_string()]
}

fn default_build() -> BuildConfig {
    BuildConfig {
        tool_name: default_tool_name(),
        script: default_script(),
        packager: default_packager(),
        icon: None,
        dist_dir: default_dist_dir(),
        build_dir: default_build_dir(),
    }
}

fn default_tool_name() -> String {
    "pkgsync".to_string()
}

fn default_script() -> String {
    "main.py".to_string()
}

fn default_packager() -> Vec<String> {
    vec![
        "pyinstaller".to_string(),
        "--onefile".to_string(),
        "{script}".to_string(),
    ]
}

fn default_dist_dir() -> String {
    "dist".to_string()
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_install() -> InstallConfig {
    InstallConfig {
        install_root: default_install_root(),
    }
}

fn default_install_root() -> String {
    "~/Programs".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If pkgsync.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full pkgsync.json config, falling back to defaults on any error.
pub fn load_config() -> PkgsyncConfig {
    load_config_from_file().unwrap_or_default()
}

/// Attempt to load config from pkgsync.json file.
fn load_config_from_file() -> crate::Result<PkgsyncConfig> {
    let path = paths::pkgsync_json()?;

    if !path.exists() {
        return Err(crate::Error::internal_unexpected("pkgsync.json not found"));
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    parse_config(&content, &path.display().to_string())
}

fn parse_config(content: &str, origin: &str) -> crate::Result<PkgsyncConfig> {
    serde_json::from_str(content).map_err(|e| crate::Error::config_invalid_json(origin, e))
}

/// Check if pkgsync.json file exists
pub fn config_exists() -> bool {
    paths::pkgsync_json()
        .map(|p| p.exists())
        .unwrap_or(false)
}

/// Delete pkgsync.json file (reset to defaults)
pub fn reset_config() -> crate::Result<bool> {
    let path = paths::pkgsync_json()?;

    if path.exists() {
        fs::remove_file(&path).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("delete {}", path.display())))
        })?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Get the path to pkgsync.json (for display purposes)
pub fn config_path() -> crate::Result<String> {
    Ok(paths::pkgsync_json()?.display().to_string())
}
