//! CLI-specific error types
//!
//! Library errors keep their own codes; failures that only exist at the
//! command line get `TABLE_CLI_*` codes.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::datasource::SourceError;
use crate::schema::{SchemaError, SchemaErrorCode};

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout)
    IoError,
    /// Table could not be read or written
    SourceError,
    /// Validation finished with violations
    ValidationFailed,
    /// Schema error, carrying the schema code
    Schema(SchemaErrorCode),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TABLE_CLI_CONFIG_ERROR",
            Self::IoError => "TABLE_CLI_IO_ERROR",
            Self::SourceError => "TABLE_CLI_SOURCE_ERROR",
            Self::ValidationFailed => "TABLE_CLI_VALIDATION_FAILED",
            Self::Schema(code) => code.code(),
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Validation found violations
    pub fn validation_failed(violations: usize) -> Self {
        Self::new(
            CliErrorCode::ValidationFailed,
            format!("validation found {} violation(s)", violations),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::Schema(e.code()), e.message())
    }
}

impl From<SourceError> for CliError {
    fn from(e: SourceError) -> Self {
        if e.is_security() {
            return Self::new(CliErrorCode::Schema(SchemaErrorCode::TablePathRejected), e.to_string());
        }
        Self::new(CliErrorCode::SourceError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
