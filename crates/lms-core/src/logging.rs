//! Logging setup for lms-rs.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-request spans.

use crate::settings::Settings;

/// Installs the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level` and falls back to `info` when
/// it does not parse. Debug mode uses the pretty human-readable format;
/// otherwise output is structured JSON. Installing twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for an HTTP request.
///
/// # Examples
///
/// ```
/// use lms_core::logging::request_span;
///
/// let span = request_span("abc-123");
/// let _guard = span.enter();
/// tracing::info!("handling request");
/// ```
pub fn request_span(request_id: &str) -> tracing::Span {
    tracing::info_span!("request", id = request_id)
}

/// Creates a tracing span for one instructor student query.
pub fn query_span(course_id: &str, criteria: usize) -> tracing::Span {
    tracing::debug_span!("students_query", course_id, criteria)
}
