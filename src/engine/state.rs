//! Per-run shared pipeline state

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::error;

use crate::engine::queue::WorkQueue;

/// Flags, counters and the work queue shared by every worker of one run.
/// A fresh value is created for each rebuild.
#[derive(Debug)]
pub struct PipelineState {
    error: AtomicBool,
    first_error: Mutex<Option<String>>,
    extraction_done: AtomicBool,
    sequencing_done: AtomicBool,
    segments_done: Vec<AtomicBool>,
    frames_prepared: AtomicUsize,
    frames_rendered: AtomicUsize,
    queue: WorkQueue,
}

impl PipelineState {
    /// State for a run with `segment_count` extraction segments
    pub fn new(segment_count: usize) -> Self {
        Self {
            error: AtomicBool::new(false),
            first_error: Mutex::new(None),
            extraction_done: AtomicBool::new(false),
            sequencing_done: AtomicBool::new(false),
            segments_done: (0..segment_count).map(|_| AtomicBool::new(false)).collect(),
            frames_prepared: AtomicUsize::new(0),
            frames_rendered: AtomicUsize::new(0),
            queue: WorkQueue::new(),
        }
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    pub fn segment_count(&self) -> usize {
        self.segments_done.len()
    }

    /// Set the error flag and wake every waiting worker. Only the first
    /// message is kept.
    pub fn raise_error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        {
            let mut first = self
                .first_error
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if first.is_none() {
                *first = Some(message);
            }
        }
        self.error.store(true, Ordering::SeqCst);
        self.queue.wake_all();
    }

    pub fn has_error(&self) -> bool {
        self.error.load(Ordering::SeqCst)
    }

    /// Message of the first raised error
    pub fn error_message(&self) -> Option<String> {
        self.first_error
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn mark_segment_done(&self, index: usize) {
        if let Some(flag) = self.segments_done.get(index) {
            flag.store(true, Ordering::SeqCst);
        }
    }

    pub fn is_segment_done(&self, index: usize) -> bool {
        self.segments_done
            .get(index)
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(true)
    }

    pub fn mark_extraction_done(&self) {
        self.extraction_done.store(true, Ordering::SeqCst);
    }

    pub fn is_extraction_done(&self) -> bool {
        self.extraction_done.load(Ordering::SeqCst)
    }

    /// Mark sequencing finished and release every waiting render worker
    pub fn finish_sequencing(&self) {
        self.sequencing_done.store(true, Ordering::SeqCst);
        self.queue.wake_all();
    }

    pub fn is_sequencing_done(&self) -> bool {
        self.sequencing_done.load(Ordering::SeqCst)
    }

    /// Render workers may stop once the queue is drained
    pub fn render_finished(&self) -> bool {
        self.is_sequencing_done() || self.has_error()
    }

    pub fn record_prepared(&self) -> usize {
        self.frames_prepared.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_rendered(&self) -> usize {
        self.frames_rendered.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn frames_prepared(&self) -> usize {
        self.frames_prepared.load(Ordering::SeqCst)
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = PipelineState::new(3);
        assert_eq!(state.segment_count(), 3);
        assert!(!state.has_error());
        assert!(!state.is_segment_done(0));
        assert!(state.is_segment_done(3));
        assert!(!state.render_finished());
    }

    #[test]
    fn test_first_error_is_kept() {
        let state = PipelineState::new(1);
        state.raise_error("decoder failed on segment 0");
        state.raise_error("second failure");

        assert!(state.has_error());
        assert!(state.render_finished());
        assert_eq!(
            state.error_message().as_deref(),
            Some("decoder failed on segment 0")
        );
    }

    #[test]
    fn test_counters() {
        let state = PipelineState::new(1);
        assert_eq!(state.record_prepared(), 1);
        assert_eq!(state.record_prepared(), 2);
        assert_eq!(state.record_rendered(), 1);
        assert_eq!(state.frames_prepared(), 2);
        assert_eq!(state.frames_rendered(), 1);

        state.finish_sequencing();
        assert!(state.render_finished());
    }
}
