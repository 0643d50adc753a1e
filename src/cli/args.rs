//! CLI argument definitions using clap
//!
//! Commands:
//! - tableschema infer <input> [--out <schema.json>]
//! - tableschema validate <input> --schema <schema.json>
//! - tableschema convert <input> --out <table.csv> [--header a,b,c]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// tableschema - typed validation and safe I/O for tabular data
#[derive(Parser, Debug)]
#[command(name = "tableschema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the table comes from and which settings apply
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Table file (inside the working root), tar/zip archive with --entry, or http(s) URL
    pub input: String,

    /// Member of the tar or zip archive given as input
    #[arg(long)]
    pub entry: Option<String>,

    /// Working root; overrides the config file
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Declared header replacing the data's own header row
    #[arg(long, value_delimiter = ',')]
    pub header: Option<Vec<String>>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Infer a schema from a sample of the table
    Infer {
        #[command(flatten)]
        source: SourceArgs,

        /// Save the inferred schema document here (inside the working root)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Rows to sample; overrides the config file
        #[arg(long)]
        sample_rows: Option<usize>,
    },

    /// Validate a table against a schema document
    Validate {
        #[command(flatten)]
        source: SourceArgs,

        /// Schema document (inside the working root)
        #[arg(long)]
        schema: PathBuf,

        /// Stop at the first violation
        #[arg(long)]
        fail_fast: bool,
    },

    /// Rewrite a table with columns reordered by name
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (inside the working root)
        #[arg(long)]
        out: PathBuf,

        /// Output column order; defaults to the declared or data header
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Take the output column order from a schema document
        #[arg(long, conflicts_with = "columns")]
        schema: Option<PathBuf>,

        /// Write LF line endings instead of CRLF
        #[arg(long)]
        lf: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from([
            "tableschema",
            "validate",
            "people.csv",
            "--schema",
            "people.json",
            "--root",
            "/data",
            "--fail-fast",
        ])
        .unwrap();

        match cli.command {
            Command::Validate {
                source,
                schema,
                fail_fast,
            } => {
                assert_eq!(source.input, "people.csv");
                assert_eq!(source.root, Some(PathBuf::from("/data")));
                assert_eq!(schema, PathBuf::from("people.json"));
                assert!(fail_fast);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_convert_columns() {
        let cli = Cli::try_parse_from([
            "tableschema",
            "convert",
            "in.csv",
            "--out",
            "out.csv",
            "--columns",
            "a,b,c",
        ])
        .unwrap();

        match cli.command {
            Command::Convert { columns, lf, .. } => {
                assert_eq!(columns, Some(vec!["a".into(), "b".into(), "c".into()]));
                assert!(!lf);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_columns_conflict_with_schema() {
        let result = Cli::try_parse_from([
            "tableschema",
            "convert",
            "in.csv",
            "--out",
            "out.csv",
            "--columns",
            "a",
            "--schema",
            "s.json",
        ]);
        assert!(result.is_err());
    }
}
