//! Injectable timing capability for the worker loop.
//!
//! Every backoff pause goes through a [`Sleeper`] so tests can observe
//! requested durations without real wall-clock cost, and so shutdown can
//! interrupt a pool that is mid-backoff: the sleep point is each worker
//! loop's designated cancellation point.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

/// Outcome of a cancellable sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration elapsed.
    Completed,
    /// The sleep was interrupted; the worker loop must stop.
    Interrupted,
}

/// A cancellable, substitutable sleep.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleeps for `duration`, or less if interrupted.
    async fn sleep(&self, duration: Duration) -> SleepOutcome;
}

/// Real-time sleeper with no interruption channel.
///
/// Suitable for workers whose lifetime is the process lifetime; prefer
/// [`ShutdownSleeper`] when the pool must stop before the process exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) -> SleepOutcome {
        tokio::time::sleep(duration).await;
        SleepOutcome::Completed
    }
}

/// Sleeper that completes immediately, for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) -> SleepOutcome {
        SleepOutcome::Completed
    }
}

/// Handle that interrupts every sleep performed through the paired
/// [`ShutdownSleeper`].
///
/// Dropping the handle has the same effect as calling
/// [`shutdown`](Self::shutdown): a pool whose owner is gone should stop.
#[derive(Debug)]
pub struct ShutdownHandle {
    sender: watch::Sender<bool>,
}

impl ShutdownHandle {
    /// Creates a connected handle/sleeper pair.
    #[must_use]
    pub fn new() -> (Self, ShutdownSleeper) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, ShutdownSleeper { shutdown: receiver })
    }

    /// Interrupts in-flight and future sleeps.
    pub fn shutdown(&self) {
        let _ = self.sender.send(true);
    }
}

/// Real-time sleeper interruptible through a [`ShutdownHandle`].
#[derive(Debug, Clone)]
pub struct ShutdownSleeper {
    shutdown: watch::Receiver<bool>,
}

#[async_trait]
impl Sleeper for ShutdownSleeper {
    async fn sleep(&self, duration: Duration) -> SleepOutcome {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow() {
            return SleepOutcome::Interrupted;
        }

        tokio::select! {
            () = tokio::time::sleep(duration) => SleepOutcome::Completed,
            // A closed channel means the handle was dropped; stop either way.
            _ = shutdown.changed() => SleepOutcome::Interrupted,
        }
    }
}
