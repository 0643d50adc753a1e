//! Observability for tableschema
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here changes cast or validation
//! outcomes.
//!
//! ```ignore
//! use tableschema::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::InferComplete, &[("columns", "3")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
///
/// Rejections are logged at WARN, everything else at INFO.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_rejection() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
