//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events in a cast/validate/read/write session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Schema document loaded
    SchemaLoaded,
    /// Schema document saved
    SchemaSaved,

    // Inference
    /// Type inference started
    InferBegin,
    /// Type inference complete
    InferComplete,
    /// Sampled row could not be decoded and was left out
    InferRowSkipped,

    // Validation
    /// Validation pass started
    ValidationBegin,
    /// Validation pass complete
    ValidationComplete,
    /// Validation stopped at the first violation
    ValidationFailFast,

    // Data source
    /// Origin opened for reading
    SourceOpened,
    /// Path or archive entry rejected by the resolver
    PathRejected,
    /// Write started
    WriteBegin,
    /// Write complete
    WriteComplete,
    /// Write refused because of a column set mismatch
    WriteRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::SchemaSaved => "SCHEMA_SAVED",

            Event::InferBegin => "INFER_BEGIN",
            Event::InferComplete => "INFER_COMPLETE",
            Event::InferRowSkipped => "INFER_ROW_SKIPPED",

            Event::ValidationBegin => "VALIDATION_BEGIN",
            Event::ValidationComplete => "VALIDATION_COMPLETE",
            Event::ValidationFailFast => "VALIDATION_FAIL_FAST",

            Event::SourceOpened => "SOURCE_OPENED",
            Event::PathRejected => "PATH_REJECTED",
            Event::WriteBegin => "WRITE_BEGIN",
            Event::WriteComplete => "WRITE_COMPLETE",
            Event::WriteRejected => "WRITE_REJECTED",
        }
    }

    /// Returns true if this event reports a refused operation
    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::PathRejected | Event::WriteRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
