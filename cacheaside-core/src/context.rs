//! Execution context threaded through every store call and fallback invocation.
//!
//! A [`Context`] bounds an operation with an optional deadline and an optional
//! cancellation signal. Clones share the same signal, so cancelling through a
//! [`CancelHandle`] aborts every in-flight operation that was handed a clone.

use crate::error::{CacheError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellable, deadline-bearing execution context.
///
/// # Examples
///
/// ```
/// use cacheaside_core::Context;
/// use std::time::Duration;
///
/// let ctx = Context::background();
/// assert!(ctx.err().is_none());
///
/// let (ctx, handle) = Context::with_cancel();
/// handle.cancel();
/// assert!(ctx.err().is_some());
///
/// # let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
/// # rt.block_on(async {
/// let ctx = Context::with_timeout(Duration::from_secs(5));
/// assert!(ctx.remaining().unwrap() <= Duration::from_secs(5));
/// # });
/// ```
#[derive(Clone, Debug, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Handle that trips the cancellation signal of a [`Context`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels every clone of the associated context.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    ///
    /// Must be called from within a tokio runtime with the time driver enabled.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    /// A cancellable context and the handle that cancels it.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            deadline: None,
            cancel: Some(rx),
        };
        (ctx, CancelHandle { tx })
    }

    /// Derives a context that keeps this context's cancellation signal and uses the
    /// earlier of the two deadlines.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(current) if current < candidate => current,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            cancel: self.cancel.clone(),
        }
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` when no deadline is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Reports why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<CacheError> {
        if let Some(rx) = &self.cancel {
            if *rx.borrow() {
                return Some(CacheError::Cancelled);
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CacheError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    ///
    /// Never resolves for [`Context::background`].
    pub async fn done(&self) -> CacheError {
        let cancelled = async {
            match &self.cancel {
                Some(rx) => {
                    let mut rx = rx.clone();
                    loop {
                        if *rx.borrow_and_update() {
                            return CacheError::Cancelled;
                        }
                        if rx.changed().await.is_err() {
                            // Handle dropped without cancelling: can no longer fire.
                            return std::future::pending::<CacheError>().await;
                        }
                    }
                }
                None => std::future::pending::<CacheError>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => {
                    tokio::time::sleep_until(deadline).await;
                    CacheError::DeadlineExceeded
                }
                None => std::future::pending::<CacheError>().await,
            }
        };

        tokio::select! {
            err = cancelled => err,
            err = expired => err,
        }
    }

    /// Runs `fut` unless the context finishes first.
    ///
    /// A context that is already done fails without polling `fut`. Cancellation
    /// wins ties so that a cancelled call never reports success.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        if self.deadline.is_none() && self.cancel.is_none() {
            return fut.await;
        }

        tokio::select! {
            biased;
            err = self.done() => Err(err),
            res = fut => res,
        }
    }
}
