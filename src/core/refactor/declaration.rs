//! Declaration pass: make every file's namespace declaration match its directory.

use std::path::Path;

use super::namespace::{namespace_for, symbol_name, NamespaceMapping};
use super::source_file::SourceFile;
use super::{Change, ChangeKind};
use crate::defaults::LanguageProfile;
use crate::error::Result;
use crate::local_files::{FileSystem, SourceFilter};

/// Outcome of normalizing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationEdit {
    Unchanged,
    Renamed {
        symbol: String,
        old_namespace: Option<String>,
        new_namespace: String,
    },
}

/// Everything the declaration pass produced.
#[derive(Debug, Default)]
pub struct DeclarationPass {
    pub mapping: NamespaceMapping,
    pub changes: Vec<Change>,
    pub scanned: usize,
}

/// Namespace named by a declaration line, or None if `line` is not one.
///
/// A declaration is any line whose trimmed text starts with `<keyword> `.
pub fn declared_namespace(line: &str, keyword: &str) -> Option<String> {
    let rest = line.trim().strip_prefix(keyword)?.strip_prefix(' ')?;
    Some(rest.trim_end_matches(';').trim().to_string())
}

pub fn declaration_line(keyword: &str, namespace: &str) -> String {
    format!("{} {};", keyword, namespace)
}

fn is_code_line(line: &str, comment_prefix: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with(comment_prefix)
}

/// Rewrite or insert the declaration of `file` in memory.
///
/// Leading blank and `//` lines stay above an inserted declaration. Block
/// comments are not tracked.
pub fn normalize_declaration(
    file: &mut SourceFile,
    namespace: &str,
    profile: &LanguageProfile,
) -> DeclarationEdit {
    let keyword = profile.declaration_keyword.as_str();
    let new_line = declaration_line(keyword, namespace);
    let mut old_namespace = None;

    let position = file.lines.iter().enumerate().find_map(|(i, line)| {
        if let Some(current) = declared_namespace(line, keyword) {
            Some((i, Some(current)))
        } else if is_code_line(line, &profile.comment_prefix) {
            Some((i, None))
        } else {
            None
        }
    });

    match position {
        Some((i, Some(current))) => {
            if current == namespace {
                return DeclarationEdit::Unchanged;
            }
            file.lines[i] = new_line;
            old_namespace = Some(current);
        }
        Some((i, None)) => file.lines.insert(i, new_line),
        None => file.lines.insert(0, new_line),
    }

    DeclarationEdit::Renamed {
        symbol: symbol_name(&file.path),
        old_namespace,
        new_namespace: namespace.to_string(),
    }
}

/// Normalize every eligible file under `root`, returning the rename mapping.
///
/// The mapping is filled in dry-run mode too, so a dry-run import pass
/// reports the same changes a real run would make.
pub fn normalize_tree(
    fs: &dyn FileSystem,
    root: &Path,
    filter: &SourceFilter,
    profile: &LanguageProfile,
    dry_run: bool,
) -> Result<DeclarationPass> {
    let mut pass = DeclarationPass::default();

    for path in fs.walk(root, filter)? {
        pass.scanned += 1;
        let namespace = namespace_for(root, &path, &profile.namespace_separator);
        let mut file = SourceFile::load(fs, &path)?;

        let DeclarationEdit::Renamed {
            symbol,
            old_namespace,
            new_namespace,
        } = normalize_declaration(&mut file, &namespace, profile)
        else {
            continue;
        };

        if !dry_run {
            file.save(fs)?;
        }

        pass.changes.push(Change {
            kind: ChangeKind::Package,
            file: path.clone(),
            before: old_namespace.clone(),
            after: new_namespace.clone(),
        });
        pass.mapping.record(symbol, old_namespace, new_namespace);
    }

    Ok(pass)
}
