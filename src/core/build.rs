use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults::BuildConfig;
use crate::error::{BuildFailedDetails, Error, Result};
use crate::paths;
use crate::utils::command::{self, CapturedOutput};

// === Version Tag ===

/// Build tag for a date: ISO year, `w`, zero-padded ISO week (`2025w07`).
pub fn version_tag(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}w{:02}", week.year(), week.week())
}

/// Build tag for today.
pub fn current_version_tag() -> String {
    version_tag(Local::now().date_naive())
}

// === Build Plan ===

/// Where a build runs and what it produces.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub project_dir: PathBuf,
    pub tag: String,
    pub config: BuildConfig,
}

impl BuildPlan {
    pub fn new(project_dir: impl Into<PathBuf>, tag: impl Into<String>, config: BuildConfig) -> Self {
        Self {
            project_dir: project_dir.into(),
            tag: tag.into(),
            config,
        }
    }

    /// Script name without extension (`main.py` → `main`).
    pub fn script_stem(&self) -> String {
        Path::new(&self.config.script)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.config.script.clone())
    }

    /// Packager program and arguments with `{script}` substituted.
    pub fn command(&self) -> Result<(String, Vec<String>)> {
        let mut parts = self
            .config
            .packager
            .iter()
            .map(|part| part.replace("{script}", &self.config.script));

        let program = parts.next().ok_or_else(|| {
            Error::config_invalid_value("build.packager", None, "Packager command is empty")
        })?;
        let mut args: Vec<String> = parts.collect();

        if let Some(icon) = &self.config.icon {
            args.push("--icon".to_string());
            args.push(icon.clone());
        }

        Ok((program, args))
    }

    fn dist_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.dist_dir)
    }

    /// Where the packager leaves its output.
    pub fn artifact_path(&self) -> PathBuf {
        self.dist_dir()
            .join(format!("{}{}", self.script_stem(), paths::exe_suffix()))
    }

    /// Versioned directory the artifact is moved into.
    pub fn final_dir(&self) -> PathBuf {
        self.dist_dir().join(&self.tag)
    }

    /// Versioned, renamed executable.
    pub fn final_path(&self) -> PathBuf {
        self.final_dir()
            .join(format!("{}{}", self.config.tool_name, paths::exe_suffix()))
    }
}

// === Public API ===

#[derive(Debug, Clone, Serialize)]
pub struct BuildOutput {
    pub command: String,
    pub tag: String,
    pub artifact: String,
    #[serde(flatten)]
    pub output: CapturedOutput,
    pub cleaned: Vec<String>,
}

/// Package the script, move the executable into its versioned directory and
/// remove packager leftovers.
pub fn run_build(plan: &BuildPlan) -> Result<BuildOutput> {
    let (program, args) = plan.command()?;
    let display = std::iter::once(program.clone())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");

    log_status!("build", "Building executable with {}", program);
    let run = command::capture_in(&plan.project_dir, &program, &args, "build executable")?;

    if !run.success {
        return Err(Error::build_failed(BuildFailedDetails {
            command: display,
            exit_code: run.exit_code,
            stdout: run.output.stdout,
            stderr: run.output.stderr,
        }));
    }

    let artifact = plan.artifact_path();
    let final_path = plan.final_path();
    move_artifact(&artifact, &final_path)?;
    log_status!("build", "Renamed to: {}", final_path.display());

    let cleaned = clean_up(plan);

    Ok(BuildOutput {
        command: display,
        tag: plan.tag.clone(),
        artifact: final_path.display().to_string(),
        output: run.output,
        cleaned,
    })
}

fn move_artifact(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    if to.exists() {
        fs::remove_file(to).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("remove {}", to.display())))
        })?;
    }

    fs::rename(from, to).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("rename {} → {}", from.display(), to.display())),
        )
    })
}

/// Remove the packager's work directory and spec file. Best effort.
fn clean_up(plan: &BuildPlan) -> Vec<String> {
    let mut cleaned = Vec::new();

    let build_dir = plan.project_dir.join(&plan.config.build_dir);
    if build_dir.is_dir() && fs::remove_dir_all(&build_dir).is_ok() {
        cleaned.push(build_dir.display().to_string());
    }

    let spec_file = plan.project_dir.join(format!("{}.spec", plan.script_stem()));
    if spec_file.is_file() && fs::remove_file(&spec_file).is_ok() {
        cleaned.push(spec_file.display().to_string());
    }

    cleaned
}
