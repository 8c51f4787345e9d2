use log::info;

/// Cross-cutting observer for pipeline orchestration events.
///
/// Decouples the use cases from a specific output mechanism so callers
/// can watch stage behavior without changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Record how long a named pipeline stage took.
    fn stage(&mut self, name: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. segment count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);
}

/// Silent logger that discards all events. Used by tests and callers
/// with their own progress reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn stage(&mut self, _name: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Forwards events to the `log` facade at info level.
pub struct LogPipelineLogger;

impl PipelineLogger for LogPipelineLogger {
    fn stage(&mut self, name: &str, duration_ms: f64) {
        info!("{name}: {duration_ms:.1} ms");
    }

    fn metric(&mut self, name: &str, value: f64) {
        info!("{name}: {value:.3}");
    }

    fn info(&mut self, message: &str) {
        info!("{message}");
    }
}
