//! Data Source I/O Tests
//!
//! Reading and writing tables through the working-root boundary:
//! - Traversal out of the root is rejected before any file is touched
//! - Nested relative paths resolve under the root
//! - Tar members are read by normalized name
//! - Writes reorder columns by name and never misalign

use std::fs;
use std::path::Path;

use tableschema::datasource::{
    ColumnPolicy, Origin, PathResolver, SecurityError, SourceError, StructuralError,
    TabularDataSource,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn write_tar(path: &Path, members: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut builder = tar::Builder::new(file);
    for (name, body) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, body.as_bytes()).unwrap();
    }
    builder.finish().unwrap();
}

// =============================================================================
// Path Containment Tests
// =============================================================================

/// Parent segments that climb out of the root are rejected.
#[test]
fn test_traversal_out_of_root_rejected() {
    let resolver = PathResolver::new("/data");
    let err = resolver.resolve("../../etc/passwd").unwrap_err();
    assert!(matches!(err, SecurityError::EscapesRoot { .. }));
}

/// Absolute paths elsewhere are rejected.
#[test]
fn test_absolute_outside_root_rejected() {
    let resolver = PathResolver::new("/data");
    let err = resolver.resolve("/etc/passwd").unwrap_err();
    assert!(matches!(err, SecurityError::OutsideRoot { .. }));
}

/// A nested relative path lands under the root.
#[test]
fn test_nested_relative_path_resolves() {
    let resolver = PathResolver::new("/data");
    let resolved = resolver.resolve("sub/dir/file.csv").unwrap();
    assert_eq!(resolved.as_path(), Path::new("/data/sub/dir/file.csv"));

    let resolved = resolver.resolve("sub/../file.csv").unwrap();
    assert_eq!(resolved.as_path(), Path::new("/data/file.csv"));
}

/// A traversal source fails with a security error, not an I/O error.
#[test]
fn test_source_traversal_is_security_error() {
    let dir = TempDir::new().unwrap();
    let source = TabularDataSource::from_file("../outside.csv", dir.path());
    let err = source.data().unwrap_err();
    assert!(err.is_security());
}

/// A symlinked directory inside the root cannot carry a write outside it.
#[cfg(unix)]
#[test]
fn test_write_through_symlinked_directory_rejected() {
    let outside = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();

    let source = TabularDataSource::new(Origin::Inline("a\n1\n".into()), root.path());
    let err = source.write_to_path("link/escaped.csv", None).unwrap_err();

    assert!(err.is_security());
    assert!(!outside.path().join("escaped.csv").exists());
}

// =============================================================================
// Archive Tests
// =============================================================================

/// A member of a tar archive reads like any other table.
#[test]
fn test_read_tar_member() {
    let dir = TempDir::new().unwrap();
    write_tar(
        &dir.path().join("bundle.tar"),
        &[
            ("readme.txt", "not a table"),
            ("tables/people.csv", "id,name\n1,Ada\n2,Grace\n"),
        ],
    );

    let source = TabularDataSource::from_archive("bundle.tar", "./tables/people.csv", dir.path());
    assert_eq!(source.header().unwrap(), names(&["id", "name"]).as_slice());
    assert_eq!(
        source.data().unwrap(),
        vec![names(&["1", "Ada"]), names(&["2", "Grace"])]
    );
}

/// Missing members report the entry name.
#[test]
fn test_tar_member_not_found() {
    let dir = TempDir::new().unwrap();
    write_tar(&dir.path().join("bundle.tar"), &[("a.csv", "x\n1\n")]);

    let source = TabularDataSource::from_archive("bundle.tar", "b.csv", dir.path());
    assert!(matches!(
        source.data().unwrap_err(),
        SourceError::EntryNotFound { .. }
    ));
}

/// Entry names that climb out of the archive are rejected.
#[test]
fn test_tar_entry_traversal_rejected() {
    let dir = TempDir::new().unwrap();
    write_tar(&dir.path().join("bundle.tar"), &[("a.csv", "x\n1\n")]);

    let source = TabularDataSource::from_archive("bundle.tar", "../a.csv", dir.path());
    assert!(source.data().unwrap_err().is_security());
}

// =============================================================================
// Write Tests
// =============================================================================

/// Columns follow the output header by name.
#[test]
fn test_write_reorders_by_name() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.csv"), "b,a,c\n2,1,3\n5,4,6\n").unwrap();

    let source = TabularDataSource::from_file("in.csv", dir.path());
    let rows = source
        .write_to_path("out.csv", Some(&names(&["a", "b", "c"])))
        .unwrap();

    assert_eq!(rows, 2);
    let written = fs::read_to_string(dir.path().join("out.csv")).unwrap();
    assert_eq!(written, "a,b,c\r\n1,2,3\r\n4,5,6\r\n");
}

/// An output header that drops a column fails unless subsets are allowed.
#[test]
fn test_write_missing_column() {
    let source = TabularDataSource::from_inline("a,b,c\n1,2,3\n");
    let output = names(&["a", "b"]);

    let err = source.write(Vec::new(), Some(&output)).unwrap_err();
    match err {
        SourceError::Structural(StructuralError::ColumnMismatch { missing, .. }) => {
            assert_eq!(missing, names(&["c"]));
        }
        other => panic!("unexpected error {:?}", other),
    }

    let mut out = Vec::new();
    source
        .write_with(&mut out, Some(&output), ColumnPolicy::Subset)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "a,b\r\n1,2\r\n");
}

/// Unknown output columns always fail.
#[test]
fn test_write_unknown_column() {
    let source = TabularDataSource::from_inline("a,b\n1,2\n");
    let err = source
        .write_with(Vec::new(), Some(&names(&["a", "z"])), ColumnPolicy::Subset)
        .unwrap_err();
    assert!(matches!(
        err,
        SourceError::Structural(StructuralError::ColumnMismatch { .. })
    ));
}

/// A ragged row part way through a file write leaves no output behind.
#[test]
fn test_write_to_path_is_all_or_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("in.csv"), "a,b\n1,2\n3,4\n5\n").unwrap();

    let source = TabularDataSource::from_file("in.csv", dir.path());
    assert!(source.write_to_path("out.csv", None).is_err());
    assert!(!dir.path().join("out.csv").exists());
}

/// A ragged row aborts the write instead of shifting cells.
#[test]
fn test_write_ragged_row_fails() {
    let source = TabularDataSource::from_inline("a,b\n1,2\n3\n");
    let err = source.write(Vec::new(), None).unwrap_err();
    assert!(matches!(
        err,
        SourceError::Structural(StructuralError::RowWidth { row: 2, .. })
    ));
}
