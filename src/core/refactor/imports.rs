//! Import pass: point imports of renamed symbols at their new namespaces.
//!
//! Each line is tokenized once by a single matcher and the symbol is looked
//! up in the mapping, so the cost per line does not grow with the number of
//! renamed symbols.

use regex::Regex;
use std::path::{Path, PathBuf};

use super::namespace::NamespaceMapping;
use super::source_file::SourceFile;
use super::{Change, ChangeKind};
use crate::defaults::LanguageProfile;
use crate::error::{Error, Result};
use crate::local_files::{FileSystem, SourceFilter};

/// An import line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRef<'a> {
    /// `import a.b.Foo;`
    Single { namespace: &'a str, symbol: &'a str },
    /// `import static a.b.Foo.member;` (path is everything after the keywords)
    Static { path: &'a str, tail: &'a str },
    /// `import a.b.*;`
    Wildcard { namespace: &'a str },
}

pub struct ImportMatcher {
    pattern: Regex,
    import_keyword: String,
    static_keyword: String,
    separator: String,
    truncate_static_members: bool,
}

impl ImportMatcher {
    pub fn new(profile: &LanguageProfile) -> Result<Self> {
        if profile.namespace_separator.is_empty() {
            return Err(Error::config_invalid_value(
                "language.namespace_separator",
                None,
                "Namespace separator cannot be empty",
            ));
        }

        let separator_chars: String = profile
            .namespace_separator
            .chars()
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        let source = format!(
            r"^{}\s+({}\s+)?([\w{}]+)(.*)$",
            regex::escape(&profile.import_keyword),
            regex::escape(&profile.static_keyword),
            separator_chars,
        );
        let pattern = Regex::new(&source).map_err(|e| {
            Error::config_invalid_value("language.import_keyword", Some(source.clone()), e.to_string())
        })?;

        Ok(Self {
            pattern,
            import_keyword: profile.import_keyword.clone(),
            static_keyword: profile.static_keyword.clone(),
            separator: profile.namespace_separator.clone(),
            truncate_static_members: profile.truncate_static_members,
        })
    }

    /// Tokenize an already-trimmed line.
    pub fn parse<'a>(&self, line: &'a str) -> Option<ImportRef<'a>> {
        let caps = self.pattern.captures(line)?;
        let is_static = caps.get(1).is_some();
        let path = caps.get(2)?.as_str();
        let tail = caps.get(3).map(|m| m.as_str()).unwrap_or("");

        if is_static {
            return Some(ImportRef::Static { path, tail });
        }

        if let Some(namespace) = path.strip_suffix(self.separator.as_str()) {
            if tail.starts_with("*;") && !namespace.is_empty() {
                return Some(ImportRef::Wildcard { namespace });
            }
            return None;
        }

        if !tail.starts_with(';') {
            return None;
        }
        let (namespace, symbol) = path.rsplit_once(self.separator.as_str())?;
        if namespace.is_empty() || symbol.is_empty() {
            return None;
        }
        Some(ImportRef::Single { namespace, symbol })
    }

    /// Rewritten form of `line` (trimmed) if it imports a renamed symbol.
    pub fn rewrite(&self, line: &str, mapping: &NamespaceMapping) -> Option<(ChangeKind, String)> {
        match self.parse(line)? {
            ImportRef::Single { namespace, symbol } => {
                let target = mapping.resolve(symbol, namespace)?;
                Some((
                    ChangeKind::Import,
                    format!("{} {}{}{};", self.import_keyword, target, self.separator, symbol),
                ))
            }
            ImportRef::Static { path, tail } => self.rewrite_static(path, tail, mapping),
            ImportRef::Wildcard { namespace } => {
                let target = mapping.wildcard_target(namespace, &self.separator)?;
                Some((
                    ChangeKind::WildcardImport,
                    format!("{} {}{}*;", self.import_keyword, target, self.separator),
                ))
            }
        }
    }

    /// The symbol is the first known segment that has a namespace before it
    /// and a member after it.
    fn rewrite_static(
        &self,
        path: &str,
        tail: &str,
        mapping: &NamespaceMapping,
    ) -> Option<(ChangeKind, String)> {
        let segments = segments(path, &self.separator);
        let last = segments.len().checked_sub(1)?;

        let (start, symbol) = segments
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(i, _)| *i < last)
            .map(|(_, seg)| *seg)
            .find(|(_, seg)| mapping.contains(seg))?;

        let namespace = &path[..start - self.separator.len()];
        if namespace.is_empty() {
            return None;
        }
        let target = mapping.resolve(symbol, namespace)?;

        let rewritten = if self.truncate_static_members {
            format!(
                "{} {} {}{}{}{}",
                self.import_keyword, self.static_keyword, target, self.separator, symbol, self.separator
            )
        } else {
            format!(
                "{} {} {}{}{}{}",
                self.import_keyword,
                self.static_keyword,
                target,
                self.separator,
                &path[start..],
                tail
            )
        };

        Some((ChangeKind::StaticImport, rewritten))
    }
}

/// Segments of `path` with their byte offsets.
fn segments<'a>(path: &'a str, separator: &str) -> Vec<(usize, &'a str)> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, _) in path.match_indices(separator) {
        out.push((start, &path[start..idx]));
        start = idx + separator.len();
    }
    out.push((start, &path[start..]));
    out
}

/// Rewrite matching import lines of `file` in memory.
pub fn propagate_file(
    file: &mut SourceFile,
    matcher: &ImportMatcher,
    mapping: &NamespaceMapping,
) -> Vec<Change> {
    let mut changes = Vec::new();

    for line in file.lines.iter_mut() {
        let trimmed = line.trim();
        let Some((kind, rewritten)) = matcher.rewrite(trimmed, mapping) else {
            continue;
        };

        changes.push(Change {
            kind,
            file: file.path.clone(),
            before: Some(trimmed.to_string()),
            after: rewritten.clone(),
        });
        *line = rewritten;
    }

    changes
}

/// Everything the import pass produced.
#[derive(Debug, Default)]
pub struct ImportPass {
    pub changes: Vec<Change>,
    pub files: Vec<PathBuf>,
}

/// Rewrite imports across the tree using the finished mapping.
///
/// Files without a matching import are never written.
pub fn propagate_tree(
    fs: &dyn FileSystem,
    root: &Path,
    filter: &SourceFilter,
    profile: &LanguageProfile,
    mapping: &NamespaceMapping,
    dry_run: bool,
) -> Result<ImportPass> {
    let mut pass = ImportPass::default();
    if mapping.is_empty() {
        return Ok(pass);
    }

    let matcher = ImportMatcher::new(profile)?;

    for path in fs.walk(root, filter)? {
        let mut file = SourceFile::load(fs, &path)?;
        let changes = propagate_file(&mut file, &matcher, mapping);
        if changes.is_empty() {
            continue;
        }

        if !dry_run {
            file.save(fs)?;
        }
        pass.changes.extend(changes);
        pass.files.push(path);
    }

    Ok(pass)
}
