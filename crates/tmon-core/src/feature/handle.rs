use std::{
    any::Any,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    thread,
};

use thiserror::Error;
use tokio::sync::oneshot;

/// Sending half that delivers a task's outcome to its [`TaskHandle`].
pub(crate) type Completion<T> = oneshot::Sender<thread::Result<T>>;

/// Failure to obtain a task's own return value.
#[derive(Debug, Error)]
pub enum JoinError {
    /// The task body panicked; the original payload is kept.
    #[error("task panicked: {}", panic_message(.0).unwrap_or("<non-string payload>"))]
    Panicked(Box<dyn Any + Send + 'static>),

    /// The job was dropped by the executor without running to completion.
    #[error("task was dropped before completion")]
    Dropped,
}

impl JoinError {
    pub fn is_panic(&self) -> bool {
        matches!(self, JoinError::Panicked(_))
    }

    /// Panic message, if the payload is a string.
    pub fn panic_message(&self) -> Option<&str> {
        match self {
            JoinError::Panicked(payload) => panic_message(payload),
            JoinError::Dropped => None,
        }
    }

    /// Take the original panic payload, e.g. to `std::panic::resume_unwind` it.
    pub fn into_panic(self) -> Option<Box<dyn Any + Send + 'static>> {
        match self {
            JoinError::Panicked(payload) => Some(payload),
            JoinError::Dropped => None,
        }
    }
}

// By box reference: a `&dyn Any` parameter would unsize the Box itself and never downcast.
#[allow(clippy::borrowed_box)]
fn panic_message<'a>(payload: &'a Box<dyn Any + Send + 'static>) -> Option<&'a str> {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

/// Completion handle of a submitted task.
///
/// Yields the task's own return value unchanged. Await it from async code,
/// or call [`TaskHandle::join`] from a plain thread.
#[derive(Debug)]
#[must_use = "dropping the handle discards the task's result"]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<thread::Result<T>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn channel() -> (Completion<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Block the current thread until the task completes.
    ///
    /// # Panics
    /// When called from within an asynchronous execution context; `.await` the handle there instead.
    pub fn join(self) -> Result<T, JoinError> {
        flatten(self.rx.blocking_recv())
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(flatten)
    }
}

fn flatten<T>(res: Result<thread::Result<T>, oneshot::error::RecvError>) -> Result<T, JoinError> {
    match res {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(payload)) => Err(JoinError::Panicked(payload)),
        Err(_) => Err(JoinError::Dropped),
    }
}
