//! Terminal I/O utilities for CLI.
//!
//! Provides TTY detection and user prompting.

use std::io::{self, BufRead, IsTerminal, Write};

pub fn is_stdin_tty() -> bool {
    io::stdin().is_terminal()
}

pub fn prompt(message: &str) -> pkgsync::Result<String> {
    eprint!("{}", message);
    io::stderr().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line).map_err(|e| {
        pkgsync::Error::new(
            pkgsync::ErrorCode::InternalIoError,
            format!("Failed to read input: {}", e),
            serde_json::Value::Null,
        )
    })?;

    Ok(line.trim().to_string())
}

/// Ask a yes/no question; only `y` (any case) counts as yes.
pub fn confirm(message: &str) -> pkgsync::Result<bool> {
    Ok(prompt(message)?.eq_ignore_ascii_case("y"))
}

// log_status! macro is defined in lib.rs (#[macro_export]) and available crate-wide.
