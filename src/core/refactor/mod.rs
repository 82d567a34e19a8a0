//! Package/import fixer: align declarations with directories, then follow
//! the renames into imports.
//!
//! Runs as a two-stage pipeline: the declaration pass returns a
//! [`NamespaceMapping`], and only once it is complete does the import pass
//! use it, since any file may import a symbol renamed anywhere in the tree.

mod declaration;
mod imports;
mod namespace;
mod source_file;

pub use declaration::{
    declaration_line, declared_namespace, normalize_declaration, normalize_tree,
    DeclarationEdit, DeclarationPass,
};
pub use imports::{propagate_file, propagate_tree, ImportMatcher, ImportPass, ImportRef};
pub use namespace::{
    leaf_segment, namespace_for, symbol_name, NamespaceMapping, NamespaceRename,
};
pub use source_file::{split_lines, LineEnding, SourceFile};

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::defaults::{Defaults, LanguageProfile};
use crate::error::{Error, Result};
use crate::local_files::{FileSystem, SourceFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Package,
    Import,
    StaticImport,
    WildcardImport,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Package => "Package change",
            ChangeKind::Import | ChangeKind::StaticImport => "Import update",
            ChangeKind::WildcardImport => "Wildcard import update",
        }
    }
}

/// One reported edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub file: PathBuf,
    /// Previous namespace (declarations) or previous line (imports).
    pub before: Option<String>,
    pub after: String,
}

/// Inputs to a fixer run.
#[derive(Debug, Clone)]
pub struct FixOptions {
    pub language: LanguageProfile,
    pub filter: SourceFilter,
    pub dry_run: bool,
}

impl FixOptions {
    pub fn from_defaults(defaults: &Defaults, dry_run: bool) -> Self {
        Self {
            language: defaults.language.clone(),
            filter: SourceFilter::new(defaults.language.extension.clone(), &defaults.walk),
            dry_run,
        }
    }
}

impl Default for FixOptions {
    fn default() -> Self {
        Self::from_defaults(&Defaults::default(), false)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FixReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub scanned: usize,
    pub changed: usize,
    pub declarations: Vec<Change>,
    pub imports: Vec<Change>,
    pub mapping: NamespaceMapping,
}

impl FixReport {
    /// Declaration changes followed by import changes, in the order made.
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.declarations.iter().chain(self.imports.iter())
    }
}

/// Check that `root` is an existing directory before any file is touched.
pub fn validate_root(root: &Path) -> Result<()> {
    if root.is_dir() {
        return Ok(());
    }

    Err(Error::validation_invalid_argument(
        "path",
        format!("Path '{}' is not a valid directory.", root.display()),
        Some(root.display().to_string()),
        None,
    ))
}

/// Run both passes over `root`.
pub fn fix_tree(fs: &dyn FileSystem, root: &Path, options: &FixOptions) -> Result<FixReport> {
    log_status!("fix", "Scanning under: {}", root.display());
    let declarations = normalize_tree(
        fs,
        root,
        &options.filter,
        &options.language,
        options.dry_run,
    )?;

    log_status!(
        "fix",
        "Second pass: updating imports ({} renamed symbols)",
        declarations.mapping.len()
    );
    let imports = propagate_tree(
        fs,
        root,
        &options.filter,
        &options.language,
        &declarations.mapping,
        options.dry_run,
    )?;

    let changed: BTreeSet<&PathBuf> = declarations
        .changes
        .iter()
        .map(|c| &c.file)
        .chain(imports.files.iter())
        .collect();
    let changed = changed.len();

    Ok(FixReport {
        root: root.to_path_buf(),
        dry_run: options.dry_run,
        scanned: declarations.scanned,
        changed,
        declarations: declarations.changes,
        imports: imports.changes,
        mapping: declarations.mapping,
    })
}
