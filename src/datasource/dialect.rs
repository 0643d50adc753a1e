//! CSV dialect settings handed to the `csv` reader and writer
//!
//! The default is RFC 4180: comma, double quote, CRLF, header row first.

use serde::{Deserialize, Serialize};

/// Record terminator used on write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    #[default]
    Crlf,
    Lf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dialect {
    pub delimiter: char,
    pub quote: char,
    pub line_terminator: LineTerminator,
    /// Whether the first raw row is the header
    pub has_header: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            line_terminator: LineTerminator::Crlf,
            has_header: true,
        }
    }
}

impl Dialect {
    pub fn with_line_terminator(mut self, terminator: LineTerminator) -> Self {
        self.line_terminator = terminator;
        self
    }

    /// Delimiter and quote must be distinct single-byte ASCII characters.
    pub fn validate(&self) -> Result<(), String> {
        if !self.delimiter.is_ascii() || !self.quote.is_ascii() {
            return Err("delimiter and quote must be ASCII characters".into());
        }
        if self.delimiter == self.quote {
            return Err("delimiter and quote must differ".into());
        }
        if matches!(self.delimiter, '\r' | '\n') {
            return Err("delimiter cannot be a line break".into());
        }
        Ok(())
    }

    /// Reader over raw rows. The header row is handled by the data source,
    /// so the `csv` reader sees every row as a record. Rows of differing
    /// width are passed through; width is checked against the header later.
    pub(crate) fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.delimiter as u8)
            .quote(self.quote as u8)
            .has_headers(false)
            .flexible(true);
        builder
    }

    pub(crate) fn writer_builder(&self) -> csv::WriterBuilder {
        let terminator = match self.line_terminator {
            LineTerminator::Crlf => csv::Terminator::CRLF,
            LineTerminator::Lf => csv::Terminator::Any(b'\n'),
        };
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(self.delimiter as u8)
            .quote(self.quote as u8)
            .terminator(terminator)
            .flexible(false);
        builder
    }
}
