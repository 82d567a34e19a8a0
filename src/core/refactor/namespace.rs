//! Path-derived namespaces and the symbol → namespace mapping handed from
//! the declaration pass to the import pass.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Namespace implied by a file's directory relative to `root`.
///
/// `root/a/b/Foo.java` → `a.b`; a file directly under `root` → `""`.
pub fn namespace_for(root: &Path, file: &Path, separator: &str) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .parent()
        .map(|dir| {
            dir.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join(separator)
        })
        .unwrap_or_default()
}

/// File name without its final extension.
pub fn symbol_name(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Last segment of a namespace (`a.b.c` → `c`).
pub fn leaf_segment<'a>(namespace: &'a str, separator: &str) -> &'a str {
    namespace.rsplit(separator).next().unwrap_or(namespace)
}

/// One recorded move of a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceRename {
    /// Namespace the file declared before normalization (None if it had no declaration).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_namespace: Option<String>,
    pub new_namespace: String,
}

/// Symbol name → renames recorded for files with that base name.
///
/// Several files may share a base name; each keeps its own entry so the
/// import pass can tell them apart by the namespace an import names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NamespaceMapping {
    entries: BTreeMap<String, Vec<NamespaceRename>>,
}

impl NamespaceMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        symbol: impl Into<String>,
        old_namespace: Option<String>,
        new_namespace: impl Into<String>,
    ) {
        self.entries
            .entry(symbol.into())
            .or_default()
            .push(NamespaceRename {
                old_namespace,
                new_namespace: new_namespace.into(),
            });
    }

    /// Record a move whose previous namespace is unknown.
    pub fn insert(&mut self, symbol: impl Into<String>, new_namespace: impl Into<String>) {
        self.record(symbol, None, new_namespace);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    /// The most recently recorded rename for `symbol`.
    pub fn latest(&self, symbol: &str) -> Option<&NamespaceRename> {
        self.entries.get(symbol).and_then(|r| r.last())
    }

    /// Namespace an import of `symbol` from `referenced` should be rewritten to.
    ///
    /// None when the symbol is unknown or `referenced` already names one of
    /// its new namespaces. Otherwise the rename that moved the symbol out of
    /// `referenced` wins, falling back to the latest rename.
    pub fn resolve(&self, symbol: &str, referenced: &str) -> Option<&str> {
        let renames = self.entries.get(symbol)?;
        if renames.iter().any(|r| r.new_namespace == referenced) {
            return None;
        }

        renames
            .iter()
            .rev()
            .find(|r| r.old_namespace.as_deref() == Some(referenced))
            .or_else(|| renames.last())
            .map(|r| r.new_namespace.as_str())
    }

    /// New namespace for a wildcard import of `referenced`.
    ///
    /// First rename (symbol order, then record order) whose new namespace
    /// shares `referenced`'s leaf segment but is not equal to it.
    pub fn wildcard_target(&self, referenced: &str, separator: &str) -> Option<&str> {
        let leaf = leaf_segment(referenced, separator);
        self.iter()
            .map(|(_, rename)| rename.new_namespace.as_str())
            .find(|new| leaf_segment(new, separator) == leaf && *new != referenced)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamespaceRename)> {
        self.entries
            .iter()
            .flat_map(|(symbol, renames)| renames.iter().map(move |r| (symbol.as_str(), r)))
    }
}
