//! A source file as a sequence of lines plus the line ending it was written with.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::local_files::FileSystem;

/// The three recognised line terminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineEnding {
    #[serde(rename = "crlf")]
    CrLf,
    #[serde(rename = "cr")]
    Cr,
    #[serde(rename = "lf")]
    Lf,
}

impl LineEnding {
    /// CRLF if present anywhere, else CR if present anywhere, else LF.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else if text.contains('\r') {
            LineEnding::Cr
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
            LineEnding::Lf => "\n",
        }
    }
}

/// Split on `\r\n`, `\r` or `\n`, dropping the terminators.
///
/// A terminator at the very end does not produce a trailing empty line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find(|c| c == '\r' || c == '\n') {
            Some(idx) => {
                lines.push(rest[..idx].to_string());
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }

    lines
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub line_ending: LineEnding,
    pub lines: Vec<String>,
}

impl SourceFile {
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Self {
        Self {
            path: path.into(),
            line_ending: LineEnding::detect(content),
            lines: split_lines(content),
        }
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs.read(path)?;
        Ok(Self::parse(path, &content))
    }

    /// Lines joined with the detected ending, always terminated.
    pub fn render(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut out = self.lines.join(ending);
        out.push_str(ending);
        out
    }

    pub fn save(&self, fs: &dyn FileSystem) -> Result<()> {
        fs.write(&self.path, &self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_prefers_crlf_then_cr() {
        assert_eq!(LineEnding::detect("a\r\nb\nc"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\rb\nc"), LineEnding::Cr);
        assert_eq!(LineEnding::detect("a\nb"), LineEnding::Lf);
        assert_eq!(LineEnding::detect(""), LineEnding::Lf);
    }

    #[test]
    fn split_handles_all_terminators() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), vec![""]);
    }

    #[test]
    fn render_reapplies_detected_ending_uniformly() {
        let file = SourceFile::parse("/t/A.java", "package a;\r\nclass A {}\nint x;");
        assert_eq!(file.line_ending, LineEnding::CrLf);
        assert_eq!(file.render(), "package a;\r\nclass A {}\r\nint x;\r\n");
    }

    #[test]
    fn render_appends_missing_trailing_ending() {
        let file = SourceFile::parse("/t/A.java", "package a;\rclass A {}");
        assert_eq!(file.render(), "package a;\rclass A {}\r");
    }

    #[test]
    fn render_round_trips_terminated_text() {
        let text = "// header\n\npackage a;\n\nclass A {}\n";
        assert_eq!(SourceFile::parse("/t/A.java", text).render(), text);
    }
}
