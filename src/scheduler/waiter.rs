use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, trace};

const LOG_TARGET: &str = "jiho::scheduler::waiter";

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// A suspension point that can be cut short by cancellation.
#[async_trait]
pub trait Waiter: Send {
    async fn wait(&mut self, span: Duration) -> WaitOutcome;
}

/// Sleeps on the tokio timer, returning early when a shutdown signal arrives
/// or the shutdown sender is dropped. Cancellation is sticky.
pub struct ShutdownWaiter {
    shutdown_rx: broadcast::Receiver<()>,
    cancelled: bool,
}

impl ShutdownWaiter {
    pub fn new(shutdown_rx: broadcast::Receiver<()>) -> Self {
        Self { shutdown_rx, cancelled: false }
    }
}

#[async_trait]
impl Waiter for ShutdownWaiter {
    async fn wait(&mut self, span: Duration) -> WaitOutcome {
        if self.cancelled {
            return WaitOutcome::Cancelled;
        }
        trace!(target: LOG_TARGET, "Waiting {:?}", span);

        tokio::select! {
            biased;

            received = self.shutdown_rx.recv() => {
                match received {
                    Ok(()) | Err(RecvError::Lagged(_)) => debug!(target: LOG_TARGET, "Shutdown signal received during wait."),
                    Err(RecvError::Closed) => debug!(target: LOG_TARGET, "Shutdown channel closed during wait."),
                }
                self.cancelled = true;
                WaitOutcome::Cancelled
            }
            _ = tokio::time::sleep(span) => WaitOutcome::Elapsed,
        }
    }
}
