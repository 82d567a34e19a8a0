use clap::Args;
use serde::Serialize;

use pkgsync::build::{self, BuildOutput, BuildPlan};
use pkgsync::defaults;

use super::install::{self, InstallStep};
use super::{CmdResult, TextOutput};

#[derive(Args)]
pub struct BuildArgs {
    /// Version tag (default: current ISO week, e.g. 2025w07)
    #[arg(long)]
    tag: Option<String>,

    /// Install the build and update PATH afterwards
    #[arg(long)]
    install: bool,

    /// Skip the install confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[derive(Serialize)]
pub struct BuildCmdOutput {
    command: &'static str,
    build: BuildOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    install: Option<InstallStep>,
}

pub fn run(args: BuildArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<BuildCmdOutput> {
    let defaults = defaults::load_defaults();
    let tag = args.tag.unwrap_or_else(build::current_version_tag);
    let project_dir = std::env::current_dir().map_err(|e| {
        pkgsync::Error::internal_io(e.to_string(), Some("read current directory".to_string()))
    })?;

    let plan = BuildPlan::new(&project_dir, &tag, defaults.build.clone());
    let output = build::run_build(&plan)?;

    let install = if args.install {
        Some(install::auto_update(&project_dir, &tag, &defaults, args.yes)?)
    } else {
        None
    };

    Ok((
        BuildCmdOutput {
            command: "build",
            build: output,
            install,
        },
        0,
    ))
}

impl TextOutput for BuildCmdOutput {
    fn to_text(&self) -> String {
        let mut out = String::new();

        if !self.build.output.stdout.is_empty() {
            out.push_str(&self.build.output.stdout);
            if !self.build.output.stdout.ends_with('\n') {
                out.push('\n');
            }
        }
        out.push_str(&format!("Renamed to: {}\n", self.build.artifact));
        for path in &self.build.cleaned {
            out.push_str(&format!("Removed {}\n", path));
        }
        out.push_str("Build complete!\n");

        if let Some(step) = &self.install {
            out.push_str(&install::step_text(step));
        }

        out
    }
}
