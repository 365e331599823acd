//! Shared work queue between the sequencer and the render workers

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::domain::model::Frame;

/// FIFO of frames ready to render, guarded by a mutex and a condition
/// variable
#[derive(Debug, Default)]
pub struct WorkQueue {
    frames: Mutex<VecDeque<Frame>>,
    available: Condvar,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Frame>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue a frame and wake one waiting worker
    pub fn push(&self, frame: Frame) {
        self.lock().push_back(frame);
        self.available.notify_one();
    }

    /// Wake every waiting worker. The lock is taken first so a worker that
    /// has just evaluated its predicate cannot miss the notification.
    pub fn wake_all(&self) {
        let _guard = self.lock();
        self.available.notify_all();
    }

    /// Block until the queue holds a frame or `finished()` is true.
    ///
    /// The wait predicate is "queue non-empty OR finished". Returns the next
    /// frame when one is queued, `None` once the queue is empty and
    /// `finished()` holds. `finished` is evaluated under the queue lock, so
    /// whoever flips the state it reads must call [`WorkQueue::wake_all`]
    /// afterwards.
    pub fn pop_when<F>(&self, finished: F) -> Option<Frame>
    where
        F: Fn() -> bool,
    {
        let guard = self.lock();
        let mut guard = self
            .available
            .wait_while(guard, |queue| queue.is_empty() && !finished())
            .unwrap_or_else(PoisonError::into_inner);
        guard.pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = WorkQueue::new();
        queue.push(Frame::new(1, "a.png"));
        queue.push(Frame::new(2, "b.png"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_when(|| false).map(|f| f.index), Some(1));
        assert_eq!(queue.pop_when(|| false).map(|f| f.index), Some(2));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_finished_empty_queue_returns_none() {
        let queue = WorkQueue::new();
        assert_eq!(queue.pop_when(|| true), None);
    }

    #[test]
    fn test_waiting_worker_is_released_by_finish() {
        let queue = WorkQueue::new();
        let done = AtomicBool::new(false);

        thread::scope(|s| {
            let worker = s.spawn(|| {
                let mut seen = Vec::new();
                while let Some(frame) = queue.pop_when(|| done.load(Ordering::SeqCst)) {
                    seen.push(frame.index);
                }
                seen
            });

            thread::sleep(Duration::from_millis(20));
            queue.push(Frame::new(1, "a.png"));
            thread::sleep(Duration::from_millis(20));
            done.store(true, Ordering::SeqCst);
            queue.wake_all();

            assert_eq!(worker.join().unwrap(), vec![1]);
        });
    }
}
