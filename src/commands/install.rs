use clap::Args;
use serde::Serialize;
use std::path::Path;

use pkgsync::build::{self, BuildPlan};
use pkgsync::defaults::{self, Defaults};
use pkgsync::install::{self, InstallOutput, InstallPlan};

use super::{CmdResult, TextOutput};

#[derive(Args)]
pub struct InstallArgs {
    /// Version tag of the build to install (default: current ISO week)
    #[arg(long)]
    tag: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstallStep {
    Installed(InstallOutput),
    Cancelled { reason: String },
}

#[derive(Serialize)]
pub struct InstallCmdOutput {
    command: &'static str,
    tag: String,
    #[serde(flatten)]
    step: InstallStep,
}

pub fn run(args: InstallArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<InstallCmdOutput> {
    let defaults = defaults::load_defaults();
    let tag = args.tag.unwrap_or_else(build::current_version_tag);
    let project_dir = std::env::current_dir().map_err(|e| {
        pkgsync::Error::internal_io(e.to_string(), Some("read current directory".to_string()))
    })?;

    let step = auto_update(&project_dir, &tag, &defaults, args.yes)?;

    Ok((
        InstallCmdOutput {
            command: "install",
            tag,
            step,
        },
        0,
    ))
}

/// Find the current install on PATH, confirm, then install the build for `tag`.
pub(crate) fn auto_update(
    project_dir: &Path,
    tag: &str,
    defaults: &Defaults,
    yes: bool,
) -> pkgsync::Result<InstallStep> {
    let tool_name = &defaults.build.tool_name;

    let Some(old_entry) = install::current_install_entry(tool_name) else {
        return Ok(InstallStep::Cancelled {
            reason: format!("No PATH entry contains '{}'", tool_name),
        });
    };

    if !yes {
        if !crate::tty::is_stdin_tty() {
            return Ok(InstallStep::Cancelled {
                reason: "Confirmation required; pass --yes to install non-interactively".to_string(),
            });
        }

        let question = format!(
            "Detected install entry @ {}\nWant to auto-update?\n[Y/N] ",
            old_entry.display()
        );
        if !crate::tty::confirm(&question)? {
            return Ok(InstallStep::Cancelled {
                reason: "Declined by user".to_string(),
            });
        }
    }

    let source = BuildPlan::new(project_dir, tag, defaults.build.clone()).final_path();
    let plan = InstallPlan {
        tool_name: tool_name.clone(),
        tag: tag.to_string(),
        install_root: defaults.install.install_root.clone(),
        source,
    };

    let store = install::default_store();
    let output = install::install(&plan, &old_entry, store.as_ref())?;
    Ok(InstallStep::Installed(output))
}

pub(crate) fn step_text(step: &InstallStep) -> String {
    match step {
        InstallStep::Cancelled { reason } => format!("Cancelling auto update: {}\n", reason),
        InstallStep::Installed(output) => {
            let mut out = format!("Installed {} to {}\n", output.source, output.destination);
            match (&output.path_value, output.persisted) {
                (Some(_), true) => out.push_str("User PATH updated.\n"),
                (Some(value), false) => {
                    out.push_str("User PATH not persisted on this platform. New value:\n");
                    out.push_str(&format!("    {}\n", value));
                }
                (None, _) => out.push_str("PATH already points at this version.\n"),
            }
            out
        }
    }
}

impl TextOutput for InstallCmdOutput {
    fn to_text(&self) -> String {
        step_text(&self.step)
    }
}
