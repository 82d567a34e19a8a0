//! CLI response formatting and output.
//!
//! Provides JSON envelope, text error printing, and exit code mapping.

use pkgsync::error::Hint;
use pkgsync::{Error, ErrorCode, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
                retryable: err.retryable,
            }),
        }
    }
}

fn print_response<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    use std::io::{self, Write};

    let payload = response.to_json()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

pub fn print_success<T: Serialize>(data: T) -> Result<()> {
    print_response(&CliResponse::success(data))
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

pub fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationInvalidArgument => 2,

        ErrorCode::BuildFailed => 20,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalUnexpected => 1,
    }
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    match result {
        Ok(data) => print_success(data),
        Err(err) => print_response(&CliResponse::<()>::from_error(&err)),
    }
}

/// Text-mode error: `Error: <message>`, then details and hints, on stderr.
pub fn print_error_text(err: &Error) {
    eprintln!("Error: {}", err.message);

    if let serde_json::Value::Object(map) = &err.details {
        for (key, value) in map {
            match value {
                serde_json::Value::String(text) if text.contains('\n') => {
                    eprintln!("------ {} ------", key);
                    eprintln!("{}", text.trim_end());
                }
                serde_json::Value::String(text) => eprintln!("  {}: {}", key, text),
                other => eprintln!("  {}: {}", key, other),
            }
        }
    }

    for hint in &err.hints {
        eprintln!("Hint: {}", hint.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_failure_maps_to_exit_20() {
        let err = Error::build_failed(pkgsync::error::BuildFailedDetails {
            command: "pyinstaller --onefile main.py".to_string(),
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "boom".to_string(),
        });
        let (json, code) = map_cmd_result_to_json::<()>(Err(err));
        assert!(json.is_err());
        assert_eq!(code, 20);
    }

    #[test]
    fn invalid_root_maps_to_exit_2() {
        let err = Error::validation_invalid_argument("path", "not a dir", None, None);
        let (_, code) = map_cmd_result_to_json::<()>(Err(err));
        assert_eq!(code, 2);
    }

    #[test]
    fn error_envelope_carries_code_and_hints() {
        let err = Error::internal_unexpected("x").with_hint("try again");
        let response = CliResponse::<()>::from_error(&err);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "internal.unexpected");
        assert_eq!(value["error"]["hints"][0]["message"], "try again");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn success_passes_exit_code_through() {
        let (json, code) = map_cmd_result_to_json(Ok((serde_json::json!({"changed": 2}), 0)));
        assert_eq!(json.unwrap()["changed"], 2);
        assert_eq!(code, 0);
    }
}
