use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use pkgsync::defaults;
use pkgsync::local_files;
use pkgsync::refactor::{self, ChangeKind, FixOptions, FixReport};

use super::{CmdResult, TextOutput};

#[derive(Args)]
pub struct FixArgs {
    /// Root directory of the source tree
    #[arg(long, default_value = ".")]
    path: String,

    /// Report changes without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Print only the summary
    #[arg(short, long)]
    quiet: bool,

    /// Source file extension, overriding the configured language
    #[arg(long)]
    extension: Option<String>,
}

#[derive(Serialize)]
pub struct FixOutput {
    command: &'static str,
    #[serde(flatten)]
    report: FixReport,
    #[serde(skip)]
    quiet: bool,
}

pub fn run(args: FixArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<FixOutput> {
    let root = absolute_root(&args.path)?;
    refactor::validate_root(&root)?;

    let defaults = defaults::load_defaults();
    let mut options = FixOptions::from_defaults(&defaults, args.dry_run);
    if let Some(extension) = args.extension {
        let extension = extension.trim_start_matches('.').to_string();
        options.language.extension = extension.clone();
        options.filter.extension = extension;
    }

    let report = refactor::fix_tree(&local_files::local(), &root, &options)?;

    Ok((
        FixOutput {
            command: "fix",
            report,
            quiet: args.quiet,
        },
        0,
    ))
}

fn absolute_root(path: &str) -> pkgsync::Result<PathBuf> {
    let path = Path::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir().map_err(|e| {
        pkgsync::Error::internal_io(e.to_string(), Some("read current directory".to_string()))
    })?;
    Ok(cwd.join(path))
}

impl TextOutput for FixOutput {
    fn to_text(&self) -> String {
        let report = &self.report;
        let mut out = String::new();

        if !self.quiet {
            for change in report.changes() {
                let file = change.file.display();
                let before = change.before.as_deref().unwrap_or("(none)");
                match change.kind {
                    ChangeKind::Package => {
                        out.push_str(&format!("{}: {}\n", change.kind.label(), file))
                    }
                    _ => out.push_str(&format!("{} in {}\n", change.kind.label(), file)),
                }
                out.push_str(&format!("    {} -> {}\n", before, change.after));
            }
            if !out.is_empty() {
                out.push('\n');
            }
        }

        out.push_str(&format!(
            "{} of {} files changed\n",
            report.changed, report.scanned
        ));

        if report.dry_run {
            out.push_str("Dry run complete. No files were modified.\n");
        } else {
            out.push_str("All done!\n");
        }

        out
    }
}
