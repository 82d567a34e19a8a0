use clap::{Args, Subcommand};
use serde::Serialize;

use pkgsync::defaults::{self, Defaults, PkgsyncConfig};

use super::{CmdResult, TextOutput};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display configuration (merged defaults + file)
    Show {
        /// Show only built-in defaults (ignore pkgsync.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Reset configuration to built-in defaults (deletes pkgsync.json)
    Reset,
    /// Show the path to pkgsync.json
    Path,
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<PkgsyncConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defaults: Option<Defaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
}

impl ConfigOutput {
    fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            config: None,
            defaults: None,
            path: None,
            exists: None,
            deleted: None,
        }
    }
}

pub fn run(args: ConfigArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { builtin } => show(builtin),
        ConfigCommand::Reset => reset(),
        ConfigCommand::Path => path(),
    }
}

fn show(builtin: bool) -> CmdResult<ConfigOutput> {
    let mut output = ConfigOutput::new("config.show");
    if builtin {
        output.defaults = Some(Defaults::default());
    } else {
        output.config = Some(defaults::load_config());
    }
    Ok((output, 0))
}

fn reset() -> CmdResult<ConfigOutput> {
    let mut output = ConfigOutput::new("config.reset");
    output.path = Some(defaults::config_path()?);
    output.deleted = Some(defaults::reset_config()?);
    Ok((output, 0))
}

fn path() -> CmdResult<ConfigOutput> {
    let mut output = ConfigOutput::new("config.path");
    output.path = Some(defaults::config_path()?);
    output.exists = Some(defaults::config_exists());
    Ok((output, 0))
}

impl TextOutput for ConfigOutput {
    fn to_text(&self) -> String {
        if let Some(value) = self.config.as_ref().map(serde_json::to_string_pretty) {
            return value.map(|v| format!("{}\n", v)).unwrap_or_default();
        }
        if let Some(value) = self.defaults.as_ref().map(serde_json::to_string_pretty) {
            return value.map(|v| format!("{}\n", v)).unwrap_or_default();
        }

        let path = self.path.as_deref().unwrap_or_default();
        match (self.exists, self.deleted) {
            (Some(true), _) => format!("{}\n", path),
            (Some(false), _) => format!("{} (not created; using built-in defaults)\n", path),
            (_, Some(true)) => format!("Deleted {}\n", path),
            (_, Some(false)) => format!("No config at {}; already using defaults\n", path),
            (None, None) => String::new(),
        }
    }
}
