//! Worker-thread tasks polled from the UI loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::debug;

/// Set by the owning task; the worker checks it before delivering.
#[derive(Clone, Debug, Default)]
struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

#[derive(Debug, PartialEq)]
pub enum TaskPoll<T> {
    Pending,
    Ready(T),
    /// The worker went away without a result, or the task was cancelled.
    Gone,
}

/// A unit of blocking work on its own thread with a typed result.
///
/// Dropping the task cancels it; a result produced after cancellation is
/// never delivered.
pub struct BackgroundTask<T> {
    label: &'static str,
    rx: Receiver<T>,
    cancel: CancelFlag,
    finished: bool,
}

impl<T: Send + 'static> BackgroundTask<T> {
    pub fn spawn<F>(label: &'static str, work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let cancel = CancelFlag::default();
        let worker_cancel = cancel.clone();

        debug!(task = label, "spawning background task");
        thread::spawn(move || {
            let result = work();
            if worker_cancel.is_cancelled() {
                debug!(task = label, "discarding result of cancelled task");
                return;
            }
            let _ = tx.send(result);
        });

        Self {
            label,
            rx,
            cancel,
            finished: false,
        }
    }
}

impl<T> BackgroundTask<T> {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn poll(&mut self) -> TaskPoll<T> {
        if self.finished || self.cancel.is_cancelled() {
            return TaskPoll::Gone;
        }

        match self.rx.try_recv() {
            Ok(result) => {
                self.finished = true;
                TaskPoll::Ready(result)
            }
            Err(TryRecvError::Empty) => TaskPoll::Pending,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                TaskPoll::Gone
            }
        }
    }

    pub fn cancel(&self) {
        if !self.finished {
            debug!(task = self.label, "cancelling background task");
        }
        self.cancel.cancel();
    }
}

impl<T> Drop for BackgroundTask<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    use super::*;

    fn wait_for<T>(task: &mut BackgroundTask<T>) -> TaskPoll<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match task.poll() {
                TaskPoll::Pending if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(2));
                }
                other => return other,
            }
        }
    }

    #[test]
    fn delivers_result_once() {
        let mut task = BackgroundTask::spawn("sum", || 2 + 2);
        assert_eq!(wait_for(&mut task), TaskPoll::Ready(4));
        assert_eq!(task.poll(), TaskPoll::Gone);
        assert_eq!(task.label(), "sum");
    }

    #[test]
    fn cancelled_task_never_delivers() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let mut task = BackgroundTask::spawn("blocked", move || {
            let _ = release_rx.recv();
            7u8
        });

        task.cancel();
        let _ = release_tx.send(());

        assert_eq!(task.poll(), TaskPoll::Gone);
    }

    #[test]
    fn panicking_worker_reports_gone() {
        let mut task: BackgroundTask<u8> =
            BackgroundTask::spawn("boom", || panic!("worker failed"));
        assert_eq!(wait_for(&mut task), TaskPoll::Gone);
    }
}
