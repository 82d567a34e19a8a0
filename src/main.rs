use clap::{Parser, Subcommand};

use commands::GlobalArgs;

#[derive(Debug, Clone, Copy)]
enum ResponseMode {
    Json,
    Raw(RawOutputMode),
}

#[derive(Debug, Clone, Copy)]
enum RawOutputMode {
    Text,
}

mod commands;
mod output;
mod tty;

use commands::{build, config, fix, install};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "pkgsync")]
#[command(version = VERSION)]
#[command(about = "Align package declarations with directories and update imports to match")]
struct Cli {
    /// Print the JSON response envelope instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite package declarations from file paths, then fix imports
    Fix(fix::FixArgs),
    /// Package the tool as a versioned standalone executable
    Build(build::BuildArgs),
    /// Install a build and point the user PATH at it
    Install(install::InstallArgs),
    /// Manage global pkgsync configuration
    Config(config::ConfigArgs),
}

fn response_mode(cli: &Cli) -> ResponseMode {
    if cli.json {
        ResponseMode::Json
    } else {
        ResponseMode::Raw(RawOutputMode::Text)
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = response_mode(&cli);
    let global = GlobalArgs {};

    match mode {
        ResponseMode::Json => {
            let (json_result, exit_code) = commands::run_json(cli.command, &global);
            let _ = output::print_json_result(json_result);
            std::process::ExitCode::from(exit_code_to_u8(exit_code))
        }
        ResponseMode::Raw(RawOutputMode::Text) => match commands::run_text(cli.command, &global) {
            Ok((content, exit_code)) => {
                print!("{}", content);
                std::process::ExitCode::from(exit_code_to_u8(exit_code))
            }
            Err(err) => {
                output::print_error_text(&err);
                let exit_code = output::exit_code_for_error(err.code);
                std::process::ExitCode::from(exit_code_to_u8(exit_code))
            }
        },
    }
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
