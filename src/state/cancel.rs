use tokio_util::sync::CancellationToken;

/// Run-scoped cancellation signal
///
/// A thin wrapper over [`CancellationToken`]. Cloning yields another handle
/// to the same flag. Once raised it stays raised; the coordinator checks it
/// before starting every fetch.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    token: CancellationToken,
}

impl CancellationFlag {
    /// Creates a flag that has not been raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag and wakes everyone waiting in [`cancelled`](Self::cancelled)
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any handle
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the flag is raised
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
