// Progress reporting for bulk device writes

/// Snapshot handed to a [`ProgressCallback`] after every physical write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteProgress<'a> {
    /// Identifier of the device being written, as supplied by the caller
    pub device: &'a str,
    /// Bytes written since the current operation started
    pub bytes_written: u64,
    /// Total bytes the current operation will write
    pub total_bytes: u64,
}

impl WriteProgress<'_> {
    /// Percentage complete (0-100)
    pub fn percentage(&self) -> f32 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        (self.bytes_written as f32 / self.total_bytes as f32) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_written >= self.total_bytes
    }
}

/// Observer invoked inline on the writing thread.
///
/// Implementations must return promptly; the writer is blocked until they do.
pub trait ProgressCallback {
    fn on_progress(&self, progress: &WriteProgress<'_>);
}

/// No-op progress callback (does nothing)
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _progress: &WriteProgress<'_>) {}
}

/// Logging progress callback
pub struct LoggingProgress;

impl ProgressCallback for LoggingProgress {
    fn on_progress(&self, progress: &WriteProgress<'_>) {
        tracing::trace!(
            "{}: {}/{} bytes ({:.1}%)",
            progress.device,
            progress.bytes_written,
            progress.total_bytes,
            progress.percentage()
        );
    }
}

/// Function-based progress callback
pub struct FnProgress<F>
where
    F: Fn(&WriteProgress<'_>),
{
    callback: F,
}

impl<F> FnProgress<F>
where
    F: Fn(&WriteProgress<'_>),
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressCallback for FnProgress<F>
where
    F: Fn(&WriteProgress<'_>),
{
    fn on_progress(&self, progress: &WriteProgress<'_>) {
        (self.callback)(progress);
    }
}
