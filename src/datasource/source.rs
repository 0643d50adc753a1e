//! Tabular data source
//!
//! Wraps one origin (file, URL, tar or zip member, or inline text) and exposes its
//! header and rows as raw strings. Rows are read lazily and every call to
//! `rows()` reopens the origin, so a source can be iterated more than once.

use std::cell::OnceCell;
use std::fmt;
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use crate::observability::{log_event_with_fields, Event};

use super::archive::read_entry;
use super::dialect::Dialect;
use super::errors::{SourceError, SourceResult};
use super::path::PathResolver;
use super::writer::{column_permutation, write_rows, ColumnPolicy};

/// Where the raw table lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// File path, relative to the working root or absolute inside it
    File(PathBuf),
    /// `http` or `https` URL
    Url(String),
    /// Member of a tar or zip archive
    Archive { archive: PathBuf, entry: String },
    /// Table text held in memory
    Inline(String),
}

impl Origin {
    fn kind(&self) -> &'static str {
        match self {
            Origin::File(_) => "file",
            Origin::Url(_) => "url",
            Origin::Archive { .. } => "archive",
            Origin::Inline(_) => "inline",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Url(url) => write!(f, "{}", url),
            Origin::Archive { archive, entry } => write!(f, "{}!{}", archive.display(), entry),
            Origin::Inline(_) => write!(f, "<inline>"),
        }
    }
}

/// Lazy iterator over raw rows, header row excluded.
///
/// Owns the open origin; the handle is released when the iterator drops.
pub struct RowIter {
    records: csv::StringRecordsIntoIter<Box<dyn Read>>,
}

impl Iterator for RowIter {
    type Item = SourceResult<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(SourceError::from)
        })
    }
}

impl fmt::Debug for RowIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowIter").finish_non_exhaustive()
    }
}

/// A readable and writable table rooted in a working directory
#[derive(Debug)]
pub struct TabularDataSource {
    origin: Origin,
    resolver: PathResolver,
    dialect: Dialect,
    declared_header: Option<Vec<String>>,
    data_header: OnceCell<Vec<String>>,
}

impl TabularDataSource {
    pub fn new(origin: Origin, working_root: impl Into<PathBuf>) -> Self {
        Self {
            origin,
            resolver: PathResolver::new(working_root),
            dialect: Dialect::default(),
            declared_header: None,
            data_header: OnceCell::new(),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>, working_root: impl Into<PathBuf>) -> Self {
        Self::new(Origin::File(path.into()), working_root)
    }

    pub fn from_url(url: impl Into<String>, working_root: impl Into<PathBuf>) -> Self {
        Self::new(Origin::Url(url.into()), working_root)
    }

    pub fn from_archive(
        archive: impl Into<PathBuf>,
        entry: impl Into<String>,
        working_root: impl Into<PathBuf>,
    ) -> Self {
        Self::new(
            Origin::Archive {
                archive: archive.into(),
                entry: entry.into(),
            },
            working_root,
        )
    }

    /// In-memory table; writes still resolve against the current directory.
    pub fn from_inline(text: impl Into<String>) -> Self {
        Self::new(Origin::Inline(text.into()), ".")
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.set_dialect(dialect);
        self
    }

    /// Replaces the dialect; the cached data header is read again.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.dialect = dialect;
        self.data_header = OnceCell::new();
    }

    /// Declares the header used in place of the data's own header row.
    pub fn with_header(mut self, header: Vec<String>) -> Self {
        self.declared_header = Some(header);
        self
    }

    pub fn set_header(&mut self, header: Option<Vec<String>>) {
        self.declared_header = header;
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn working_root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// The declared header if one was set, otherwise the data header.
    pub fn header(&self) -> SourceResult<&[String]> {
        match &self.declared_header {
            Some(header) => Ok(header),
            None => self.data_header(),
        }
    }

    /// Column names in natural data order.
    ///
    /// Read from the first raw row once and cached. Without a header row
    /// the names are `field1`, `field2`, ... up to the first row's width.
    pub fn data_header(&self) -> SourceResult<&[String]> {
        if let Some(header) = self.data_header.get() {
            return Ok(header);
        }
        let header = self.read_data_header()?;
        Ok(self.data_header.get_or_init(|| header))
    }

    fn read_data_header(&self) -> SourceResult<Vec<String>> {
        let reader = self.dialect.reader_builder().from_reader(self.open_reader()?);
        let first = match reader.into_records().next() {
            Some(record) => record?,
            None => return Ok(Vec::new()),
        };

        if self.dialect.has_header {
            Ok(first.iter().map(str::to_string).collect())
        } else {
            Ok((1..=first.len()).map(|i| format!("field{}", i)).collect())
        }
    }

    /// Lazy iterator over the data rows.
    ///
    /// Each call reopens the origin and starts from the first data row.
    pub fn rows(&self) -> SourceResult<RowIter> {
        let reader = self.dialect.reader_builder().from_reader(self.open_reader()?);
        let mut records = reader.into_records();
        if self.dialect.has_header {
            if let Some(header) = records.next() {
                header?;
            }
        }
        Ok(RowIter { records })
    }

    /// Reads every data row into memory.
    pub fn data(&self) -> SourceResult<Vec<Vec<String>>> {
        self.rows()?.collect()
    }

    /// Writes the table to `out` with columns in `output_header` order
    /// (default: `header()`). Every data column must be named exactly once.
    pub fn write<W: Write>(&self, out: W, output_header: Option<&[String]>) -> SourceResult<usize> {
        self.write_with(out, output_header, ColumnPolicy::Exact)
    }

    pub fn write_with<W: Write>(
        &self,
        out: W,
        output_header: Option<&[String]>,
        policy: ColumnPolicy,
    ) -> SourceResult<usize> {
        let output_header = match output_header {
            Some(header) => header,
            None => self.header()?,
        };
        self.write_columns(out, output_header, None, policy)
    }

    /// Like `write`, but the header row carries `labels` (one per output
    /// column) instead of the names used to match data columns.
    pub fn write_labeled<W: Write>(
        &self,
        out: W,
        output_header: &[String],
        labels: &[String],
    ) -> SourceResult<usize> {
        self.write_columns(out, output_header, Some(labels), ColumnPolicy::Exact)
    }

    /// Writes the table to a file inside the working root.
    ///
    /// The column check runs before anything is created, and rows go to a
    /// temporary sibling that replaces `path` only once every row is
    /// written. A failed write leaves `path` untouched.
    pub fn write_to_path(
        &self,
        path: impl AsRef<Path>,
        output_header: Option<&[String]>,
    ) -> SourceResult<usize> {
        let output_header = match output_header {
            Some(header) => header,
            None => self.header()?,
        };
        self.write_file(path.as_ref(), output_header, None)
    }

    /// `write_labeled` into a file inside the working root, with the same
    /// all-or-nothing guarantee as `write_to_path`.
    pub fn write_labeled_to_path(
        &self,
        path: impl AsRef<Path>,
        output_header: &[String],
        labels: &[String],
    ) -> SourceResult<usize> {
        self.write_file(path.as_ref(), output_header, Some(labels))
    }

    fn write_columns<W: Write>(
        &self,
        out: W,
        output_header: &[String],
        labels: Option<&[String]>,
        policy: ColumnPolicy,
    ) -> SourceResult<usize> {
        let data_header = self.data_header()?;
        self.check_columns(data_header, output_header, policy)?;

        let columns = output_header.len().to_string();
        log_event_with_fields(Event::WriteBegin, &[("columns", columns.as_str())]);

        let written = write_rows(
            out,
            &self.dialect,
            data_header,
            output_header,
            labels,
            policy,
            self.rows()?,
        )
        .map_err(|e| self.rejected(e))?;

        let rows = written.to_string();
        log_event_with_fields(Event::WriteComplete, &[("rows", rows.as_str())]);
        Ok(written)
    }

    fn write_file(
        &self,
        path: &Path,
        output_header: &[String],
        labels: Option<&[String]>,
    ) -> SourceResult<usize> {
        self.check_columns(self.data_header()?, output_header, ColumnPolicy::Exact)?;

        let resolved = self.resolver.resolve(path)?;
        let display = resolved.as_path().display().to_string();
        let mut staged = resolved
            .stage()
            .map_err(|e| SourceError::io(&display, e))?;

        let written = {
            let mut out = BufWriter::new(staged.file());
            let written = self.write_columns(&mut out, output_header, labels, ColumnPolicy::Exact)?;
            out.flush().map_err(|e| SourceError::io(&display, e))?;
            written
        };

        staged.commit().map_err(|e| SourceError::io(&display, e))?;
        Ok(written)
    }

    fn check_columns(
        &self,
        data_header: &[String],
        output_header: &[String],
        policy: ColumnPolicy,
    ) -> SourceResult<()> {
        column_permutation(data_header, output_header, policy)
            .map(|_| ())
            .map_err(|e| self.rejected(e.into()))
    }

    fn rejected(&self, err: SourceError) -> SourceError {
        if let SourceError::Structural(structural) = &err {
            let reason = structural.to_string();
            log_event_with_fields(Event::WriteRejected, &[("reason", reason.as_str())]);
        }
        err
    }

    /// Opens the origin for one pass. File and archive paths go through the
    /// resolver on every open.
    fn open_reader(&self) -> SourceResult<Box<dyn Read>> {
        self.dialect.validate().map_err(SourceError::InvalidDialect)?;

        let reader: Box<dyn Read> = match &self.origin {
            Origin::File(path) => {
                let resolved = self.resolver.resolve(path)?;
                let display = resolved.as_path().display().to_string();
                let file = resolved
                    .open()
                    .map_err(|e| SourceError::io(&display, e))?;
                Box::new(file)
            }
            Origin::Url(url) => Box::new(fetch(url)?),
            Origin::Archive { archive, entry } => {
                let entry = PathResolver::archive_entry(entry).map_err(|e| {
                    let reason = e.to_string();
                    log_event_with_fields(Event::PathRejected, &[("reason", reason.as_str())]);
                    e
                })?;
                let resolved = self.resolver.resolve(archive)?;
                Box::new(Cursor::new(read_entry(resolved, &entry)?))
            }
            Origin::Inline(text) => Box::new(Cursor::new(text.clone().into_bytes())),
        };

        let origin = self.origin.to_string();
        log_event_with_fields(
            Event::SourceOpened,
            &[("kind", self.origin.kind()), ("origin", origin.as_str())],
        );
        Ok(reader)
    }
}

/// Starts a streaming GET; the response body is read as rows are pulled.
fn fetch(url: &str) -> SourceResult<reqwest::blocking::Response> {
    let parsed = reqwest::Url::parse(url).map_err(|e| SourceError::Http {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SourceError::UnsupportedUrl(url.to_string()));
    }

    reqwest::blocking::get(parsed)
        .and_then(|response| response.error_for_status())
        .map_err(|e| SourceError::Http {
            url: url.to_string(),
            reason: e.to_string(),
        })
}
