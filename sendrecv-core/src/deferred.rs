//! Single-use handoff for the result of an asynchronous operation.
//!
//! A [`Completer`] is handed to whoever produces the result (typically a
//! library callback) and a [`Deferred`] to whoever consumes it. Both sides are
//! consumed by value, so a result is produced once and read once, and the read
//! cannot happen before the completion.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeferredError {
    #[error("completer dropped before producing a result")]
    Abandoned,
}

/// Result of a non-blocking or bounded read.
pub enum Status<T> {
    Ready(T),
    Pending(Deferred<T>),
}

impl<T> Status<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Status::Ready(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for Status<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Status::Pending(_) => f.write_str("Pending"),
        }
    }
}

type Continuation<T> = Box<dyn FnOnce(Result<T, DeferredError>) + Send>;

enum Sink<T> {
    Channel(SyncSender<T>),
    Continuation(Continuation<T>),
}

/// Producing half. Dropping it without calling [`complete`](Self::complete)
/// resolves the consumer with [`DeferredError::Abandoned`].
pub struct Completer<T> {
    sink: Option<Sink<T>>,
}

impl<T> Completer<T> {
    pub fn complete(mut self, value: T) {
        match self.sink.take() {
            // A dropped consumer just means nobody is interested any more.
            Some(Sink::Channel(tx)) => {
                let _ = tx.send(value);
            }
            Some(Sink::Continuation(f)) => f(Ok(value)),
            None => {}
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(Sink::Continuation(f)) = self.sink.take() {
            f(Err(DeferredError::Abandoned));
        }
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.sink {
            Some(Sink::Channel(_)) => "channel",
            Some(Sink::Continuation(_)) => "continuation",
            None => "spent",
        };
        f.debug_struct("Completer").field("sink", &kind).finish()
    }
}

/// Consuming half.
pub struct Deferred<T> {
    rx: Receiver<T>,
}

impl<T> Deferred<T> {
    /// Blocks the calling thread until the result arrives.
    pub fn wait(self) -> Result<T, DeferredError> {
        self.rx.recv().map_err(|_| DeferredError::Abandoned)
    }

    /// Blocks for at most `timeout`. On timeout the token is handed back.
    pub fn wait_timeout(self, timeout: Duration) -> Result<Status<T>, DeferredError> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Ok(Status::Ready(value)),
            Err(RecvTimeoutError::Timeout) => Ok(Status::Pending(self)),
            Err(RecvTimeoutError::Disconnected) => Err(DeferredError::Abandoned),
        }
    }

    pub fn try_take(self) -> Result<Status<T>, DeferredError> {
        match self.rx.try_recv() {
            Ok(value) => Ok(Status::Ready(value)),
            Err(TryRecvError::Empty) => Ok(Status::Pending(self)),
            Err(TryRecvError::Disconnected) => Err(DeferredError::Abandoned),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred")
    }
}

pub fn channel<T>() -> (Completer<T>, Deferred<T>) {
    let (tx, rx) = mpsc::sync_channel(1);
    (
        Completer {
            sink: Some(Sink::Channel(tx)),
        },
        Deferred { rx },
    )
}

/// A completer that runs `f` on the completing thread instead of waking a
/// waiting consumer.
pub fn continuation<T, F>(f: F) -> Completer<T>
where
    F: FnOnce(Result<T, DeferredError>) + Send + 'static,
{
    Completer {
        sink: Some(Sink::Continuation(Box::new(f))),
    }
}
