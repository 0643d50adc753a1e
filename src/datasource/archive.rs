//! Reading a single member out of a tar or zip archive
//!
//! Archive parsing belongs to the `tar` and `zip` crates. This module picks
//! the format from the leading bytes and finds the member whose normalized
//! name matches the resolved entry.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use tar::Archive;
use zip::ZipArchive;

use super::errors::{SourceError, SourceResult};
use super::path::{PathResolver, ResolvedPath};

/// Local file header or end-of-directory record of an empty zip
const ZIP_MAGIC: [&[u8; 4]; 2] = [b"PK\x03\x04", b"PK\x05\x06"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Sniffs the format and rewinds `file` to the start.
    fn detect(file: &mut File) -> std::io::Result<Self> {
        let mut magic = [0u8; 4];
        let mut read = 0;
        while read < magic.len() {
            match file.read(&mut magic[read..])? {
                0 => break,
                n => read += n,
            }
        }
        file.seek(SeekFrom::Start(0))?;

        if read == magic.len() && ZIP_MAGIC.iter().any(|m| **m == magic) {
            Ok(ArchiveFormat::Zip)
        } else {
            Ok(ArchiveFormat::Tar)
        }
    }
}

/// Reads the bytes of `entry` from the archive at `archive_path`.
///
/// The archive handle is dropped before returning, on success and on
/// every error path. `entry` must already be normalized with
/// `PathResolver::archive_entry`.
pub fn read_entry(archive_path: ResolvedPath, entry: &str) -> SourceResult<Vec<u8>> {
    let display = archive_path.as_path().display().to_string();
    let mut file = archive_path
        .open()
        .map_err(|e| SourceError::io(&display, e))?;

    let format = ArchiveFormat::detect(&mut file).map_err(|e| SourceError::io(&display, e))?;
    let found = match format {
        ArchiveFormat::Tar => read_tar_entry(file, &display, entry)?,
        ArchiveFormat::Zip => read_zip_entry(file, &display, entry)?,
    };

    found.ok_or_else(|| SourceError::EntryNotFound {
        archive: display,
        entry: entry.to_string(),
    })
}

/// Members whose names would escape the archive never match.
fn matches_entry(name: &str, entry: &str) -> bool {
    PathResolver::archive_entry(name)
        .map(|normalized| normalized == entry)
        .unwrap_or(false)
}

fn read_tar_entry(file: File, display: &str, entry: &str) -> SourceResult<Option<Vec<u8>>> {
    let mut archive = Archive::new(file);
    let entries = archive
        .entries()
        .map_err(|e| SourceError::io(display, e))?;

    for member in entries {
        let mut member = member.map_err(|e| SourceError::io(display, e))?;
        if !member.header().entry_type().is_file() {
            continue;
        }

        let name = member
            .path()
            .map_err(|e| SourceError::io(display, e))?
            .to_string_lossy()
            .into_owned();
        if !matches_entry(&name, entry) {
            continue;
        }

        let mut bytes = Vec::new();
        member
            .read_to_end(&mut bytes)
            .map_err(|e| SourceError::io(format!("{}:{}", display, entry), e))?;
        return Ok(Some(bytes));
    }

    Ok(None)
}

fn read_zip_entry(file: File, display: &str, entry: &str) -> SourceResult<Option<Vec<u8>>> {
    let archive_failed = |e: zip::result::ZipError| SourceError::Archive {
        path: display.to_string(),
        reason: e.to_string(),
    };
    let mut archive = ZipArchive::new(file).map_err(archive_failed)?;

    for index in 0..archive.len() {
        let mut member = archive.by_index(index).map_err(archive_failed)?;
        if member.is_dir() || !matches_entry(member.name(), entry) {
            continue;
        }

        let mut bytes = Vec::new();
        member
            .read_to_end(&mut bytes)
            .map_err(|e| SourceError::io(format!("{}:{}", display, entry), e))?;
        return Ok(Some(bytes));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tar::{Builder, Header};
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_archive(dir: &TempDir, members: &[(&str, &[u8])]) {
        let file = File::create(dir.path().join("bundle.tar")).unwrap();
        let mut builder = Builder::new(file);
        for (name, data) in members {
            let mut header = Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.finish().unwrap();
    }

    fn build_zip(dir: &TempDir, name: &str, members: &[(&str, &[u8])]) {
        let file = File::create(dir.path().join(name)).unwrap();
        let mut writer = ZipWriter::new(file);
        for (member, data) in members {
            writer.start_file(*member, FileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_reads_matching_member() {
        let dir = TempDir::new().unwrap();
        build_archive(&dir, &[("other.csv", b"x\n"), ("data/table.csv", b"a,b\n1,2\n")]);

        let resolver = PathResolver::new(dir.path());
        let path = resolver.resolve("bundle.tar").unwrap();
        let bytes = read_entry(path, "data/table.csv").unwrap();
        assert_eq!(bytes, b"a,b\n1,2\n");
    }

    #[test]
    fn test_missing_member() {
        let dir = TempDir::new().unwrap();
        build_archive(&dir, &[("a.csv", b"x\n")]);

        let resolver = PathResolver::new(dir.path());
        let path = resolver.resolve("bundle.tar").unwrap();
        let err = read_entry(path, "b.csv").unwrap_err();
        assert!(matches!(err, SourceError::EntryNotFound { .. }));
    }

    #[test]
    fn test_missing_archive_is_io_error() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        let path = resolver.resolve("absent.tar").unwrap();
        assert!(matches!(read_entry(path, "a.csv"), Err(SourceError::Io { .. })));
    }

    #[test]
    fn test_reads_zip_member() {
        let dir = TempDir::new().unwrap();
        build_zip(&dir, "bundle.zip", &[("other.csv", b"x\n"), ("data\\table.csv", b"a,b\n1,2\n")]);

        let resolver = PathResolver::new(dir.path());
        let path = resolver.resolve("bundle.zip").unwrap();
        let bytes = read_entry(path, "data/table.csv").unwrap();
        assert_eq!(bytes, b"a,b\n1,2\n");
    }

    #[test]
    fn test_zip_detected_by_content_not_extension() {
        let dir = TempDir::new().unwrap();
        build_zip(&dir, "bundle.dat", &[("a.csv", b"x\n1\n")]);

        let resolver = PathResolver::new(dir.path());
        let path = resolver.resolve("bundle.dat").unwrap();
        assert_eq!(read_entry(path, "a.csv").unwrap(), b"x\n1\n");

        let path = resolver.resolve("bundle.dat").unwrap();
        assert!(matches!(read_entry(path, "b.csv"), Err(SourceError::EntryNotFound { .. })));
    }

    #[test]
    fn test_zip_member_escaping_archive_never_matches() {
        let dir = TempDir::new().unwrap();
        build_zip(&dir, "bundle.zip", &[("../evil.csv", b"x\n")]);

        let resolver = PathResolver::new(dir.path());
        let path = resolver.resolve("bundle.zip").unwrap();
        assert!(matches!(read_entry(path, "evil.csv"), Err(SourceError::EntryNotFound { .. })));
    }
}
