//! Progress Reporting
//!
//! A progress sink receives human-readable status updates with a coarse
//! percentage. Notifications are fire-and-forget: a sink returns nothing, so a
//! slow or broken observer can never fail the operation that reports to it.

/// Observer for progress notifications.
pub trait ProgressSink: Send + Sync {
    /// Deliver a notification. Implementations must not block.
    fn notify(&self, message: &str, progress: u8);
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn notify(&self, _message: &str, _progress: u8) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&str, u8) + Send + Sync,
{
    fn notify(&self, message: &str, progress: u8) {
        self(message, progress)
    }
}
