pub type CmdResult<T> = pkgsync::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

/// Human-readable rendering used when `--json` is not given.
pub(crate) trait TextOutput {
    fn to_text(&self) -> String;
}

pub mod build;
pub mod config;
pub mod fix;
pub mod install;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

/// Dispatch a command to its handler and render the result as text.
macro_rules! dispatch_text {
    ($args:expr, $global:expr, $module:ident) => {
        render_text($module::run($args, $global))
    };
}

fn render_text<T: TextOutput>(result: CmdResult<T>) -> pkgsync::Result<(String, i32)> {
    result.map(|(output, exit_code)| (output.to_text(), exit_code))
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (pkgsync::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Fix(args) => dispatch!(args, global, fix),
        crate::Commands::Build(args) => dispatch!(args, global, build),
        crate::Commands::Install(args) => dispatch!(args, global, install),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}

pub(crate) fn run_text(
    command: crate::Commands,
    global: &GlobalArgs,
) -> pkgsync::Result<(String, i32)> {
    match command {
        crate::Commands::Fix(args) => dispatch_text!(args, global, fix),
        crate::Commands::Build(args) => dispatch_text!(args, global, build),
        crate::Commands::Install(args) => dispatch_text!(args, global, install),
        crate::Commands::Config(args) => dispatch_text!(args, global, config),
    }
}
