use pkgsync::local_files::LocalFs;
use pkgsync::refactor::{fix_tree, validate_root, ChangeKind, FixOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, content) in files {
        write(dir.path(), rel, content);
    }
    dir
}

fn dry_run() -> FixOptions {
    FixOptions {
        dry_run: true,
        ..FixOptions::default()
    }
}

#[test]
fn aligned_tree_is_left_untouched() {
    let dir = tree(&[
        ("a/Foo.java", "package a;\n\npublic class Foo {}\n"),
        ("b/Bar.java", "package b;\n\nimport a.Foo;\n\npublic class Bar {}\n"),
    ]);

    let report = fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.changed, 0);
    assert!(report.mapping.is_empty());
    assert_eq!(read(dir.path(), "b/Bar.java"), "package b;\n\nimport a.Foo;\n\npublic class Bar {}\n");
}

#[test]
fn undeclared_file_gets_declaration_and_matching_import_stays() {
    let dir = tree(&[
        ("a/Foo.java", "public class Foo {}\n"),
        ("b/Bar.java", "package b;\n\nimport a.Foo;\n"),
    ]);

    let report = fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();

    assert!(read(dir.path(), "a/Foo.java").starts_with("package a;\n"));
    assert_eq!(read(dir.path(), "b/Bar.java"), "package b;\n\nimport a.Foo;\n");
    assert_eq!(report.declarations[0].before, None);
    assert!(report.imports.is_empty());
}

#[test]
fn undeclared_file_moved_to_c_rewrites_the_import() {
    let dir = tree(&[
        ("c/Foo.java", "public class Foo {}\n"),
        ("b/Bar.java", "package b;\n\nimport a.Foo;\n"),
    ]);

    fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();

    assert_eq!(read(dir.path(), "c/Foo.java"), "package c;\npublic class Foo {}\n");
    assert_eq!(read(dir.path(), "b/Bar.java"), "package b;\n\nimport c.Foo;\n");
}

#[test]
fn moved_file_updates_declaration_and_importers() {
    let dir = tree(&[
        ("c/Foo.java", "package a;\n\npublic class Foo {}\n"),
        ("b/Bar.java", "package b;\n\nimport a.Foo;\n\npublic class Bar {}\n"),
    ]);

    let report = fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();

    assert_eq!(read(dir.path(), "c/Foo.java"), "package c;\n\npublic class Foo {}\n");
    assert_eq!(read(dir.path(), "b/Bar.java"), "package b;\n\nimport c.Foo;\n\npublic class Bar {}\n");
    assert_eq!(report.changed, 2);

    assert_eq!(report.declarations.len(), 1);
    assert_eq!(report.declarations[0].before.as_deref(), Some("a"));
    assert_eq!(report.declarations[0].after, "c");
    assert_eq!(report.imports.len(), 1);
    assert_eq!(report.imports[0].kind, ChangeKind::Import);
}

#[test]
fn missing_declaration_is_inserted_after_leading_comments() {
    let dir = tree(&[("x/y/Util.java", "// header\n\npublic class Util {}\n")]);

    fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();

    assert_eq!(
        read(dir.path(), "x/y/Util.java"),
        "// header\n\npackage x.y;\npublic class Util {}\n"
    );
}

#[test]
fn crlf_files_keep_their_line_endings() {
    let dir = tree(&[
        ("c/Foo.java", "package a;\r\npublic class Foo {}\r\n"),
        ("b/Bar.java", "package b;\r\nimport a.Foo;\r\n"),
    ]);

    fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();

    assert_eq!(read(dir.path(), "c/Foo.java"), "package c;\r\npublic class Foo {}\r\n");
    assert_eq!(read(dir.path(), "b/Bar.java"), "package b;\r\nimport c.Foo;\r\n");
}

#[test]
fn dry_run_leaves_every_byte_in_place() {
    let files = [
        ("c/Foo.java", "package a;\n\npublic class Foo {}\n"),
        ("b/Bar.java", "package b;\nimport a.Foo;\nimport static a.Foo.MAX;\n"),
    ];
    let dry = tree(&files);
    let real = tree(&files);

    let previewed = fix_tree(&LocalFs::new(), dry.path(), &dry_run()).unwrap();
    for (rel, content) in files {
        assert_eq!(read(dry.path(), rel), content);
    }

    let applied = fix_tree(&LocalFs::new(), real.path(), &FixOptions::default()).unwrap();
    assert_eq!(previewed.changed, applied.changed);
    assert_eq!(previewed.imports.len(), applied.imports.len());
    assert_eq!(previewed.mapping, applied.mapping);
}

#[test]
fn second_run_changes_nothing() {
    let dir = tree(&[
        ("c/Foo.java", "package a;\n"),
        ("b/Bar.java", "package b;\nimport a.Foo;\n"),
        ("Root.java", "public class Root {}\n"),
    ]);

    fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();
    let snapshot: Vec<String> = ["c/Foo.java", "b/Bar.java", "Root.java"]
        .iter()
        .map(|rel| read(dir.path(), rel))
        .collect();

    let again = fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();

    assert_eq!(again.changed, 0);
    for (rel, before) in ["c/Foo.java", "b/Bar.java", "Root.java"].iter().zip(snapshot) {
        assert_eq!(read(dir.path(), rel), before);
    }
}

#[test]
fn vcs_directories_and_other_extensions_are_ignored() {
    let dir = tree(&[
        (".git/hooks/Hook.java", "package nope;\n"),
        ("a/notes.txt", "package nope;\n"),
        ("a/Foo.java", "package a;\n"),
    ]);

    let report = fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();

    assert_eq!(report.scanned, 1);
    assert_eq!(read(dir.path(), ".git/hooks/Hook.java"), "package nope;\n");
    assert_eq!(read(dir.path(), "a/notes.txt"), "package nope;\n");
}

#[test]
#[cfg(unix)]
fn symlinked_directory_does_not_rename_its_target() {
    let dir = tree(&[
        ("a/Foo.java", "package a;\nclass Foo {}\n"),
        ("b/Bar.java", "package b;\nimport a.Foo;\n"),
    ]);
    std::os::unix::fs::symlink(dir.path().join("a"), dir.path().join("link")).unwrap();

    let report = fix_tree(&LocalFs::new(), dir.path(), &FixOptions::default()).unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.changed, 0);
    assert_eq!(read(dir.path(), "a/Foo.java"), "package a;\nclass Foo {}\n");
    assert_eq!(read(dir.path(), "b/Bar.java"), "package b;\nimport a.Foo;\n");
}

#[test]
fn invalid_root_fails_before_any_io() {
    let dir = tree(&[("File.java", "package x;\n")]);
    let err = validate_root(&dir.path().join("File.java")).unwrap_err();
    assert_eq!(err.code.as_str(), "validation.invalid_argument");
}
