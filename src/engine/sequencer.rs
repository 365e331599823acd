//! Sequencer: merges per-segment frame numbering into one global stream

use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::model::{Frame, Segment};
use crate::engine::state::PipelineState;
use crate::utils::path::PathUtils;

/// Sleep between polls when no frame became ready
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30);

/// The only assigner of global frame indices.
///
/// Segments are drained strictly in index order. A local frame `n` is ready
/// once `n + 1` exists (the decoder writes files in order) or its segment is
/// done. Ready frames are renamed into the merged directory under the next
/// global index and queued for rendering.
pub struct Sequencer<'a> {
    state: &'a PipelineState,
    segments: &'a [Segment],
    merged_dir: &'a Path,
    poll_interval: Duration,
    paths: PathUtils,
}

impl<'a> Sequencer<'a> {
    pub fn new(state: &'a PipelineState, segments: &'a [Segment], merged_dir: &'a Path) -> Self {
        Self {
            state,
            segments,
            merged_dir,
            poll_interval: DEFAULT_POLL_INTERVAL,
            paths: PathUtils::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run until every segment is exhausted or the error flag is set.
    /// Returns the number of frames dispatched.
    pub fn run(&self) -> usize {
        let mut current = 0usize;
        let mut next_local = 1usize;
        let mut global = 0usize;
        let mut segment_first_global = 0usize;

        while current < self.segments.len() {
            if self.state.has_error() {
                warn!("Sequencer stopping: pipeline error");
                break;
            }

            let segment = &self.segments[current];
            let mut progressed = false;

            loop {
                // Read the done flag before looking at files: a done segment
                // whose next file is absent will never produce it.
                let done = self.state.is_segment_done(segment.index);
                let local = segment
                    .output_dir
                    .join(self.paths.frame_file_name(next_local, "png"));

                if !local.exists() {
                    if done {
                        self.log_segment_drift(
                            segment,
                            global - segment_first_global,
                            segment_first_global,
                        );
                        current += 1;
                        next_local = 1;
                        segment_first_global = global;
                        progressed = true;
                    }
                    break;
                }

                let successor = segment
                    .output_dir
                    .join(self.paths.frame_file_name(next_local + 1, "png"));
                if !done && !successor.exists() {
                    break;
                }

                let index = global + 1;
                let merged = self
                    .merged_dir
                    .join(self.paths.frame_file_name(index, "png"));
                match std::fs::rename(&local, &merged) {
                    Ok(()) => {
                        global = index;
                        self.state.queue().push(Frame::new(index, &merged));
                        self.state.record_prepared();
                    }
                    Err(e) => warn!(
                        "Dropping frame {} of segment {}: rename to {} failed: {}",
                        next_local,
                        segment.index,
                        merged.display(),
                        e
                    ),
                }
                next_local += 1;
                progressed = true;
            }

            if !progressed {
                thread::sleep(self.poll_interval);
            }
        }

        info!("Sequencer dispatched {} frames", global);
        self.state.finish_sequencing();
        global
    }

    fn log_segment_drift(&self, segment: &Segment, actual: usize, first_global: usize) {
        debug!(
            "Segment {} exhausted: {} frames (estimated {}), started at global {} (estimated {})",
            segment.index, actual, segment.estimated_frames, first_global, segment.base_offset
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn segments(root: &Path, counts: &[usize]) -> Vec<Segment> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let dir = root.join(format!("segment_{}", i));
                std::fs::create_dir_all(&dir).unwrap();
                for n in 1..=count {
                    let name = format!("{:09}.png", n);
                    std::fs::write(dir.join(name), format!("{}:{}", i, n)).unwrap();
                }
                Segment {
                    index: i,
                    start: i as f64,
                    duration: 1.0,
                    output_dir: dir,
                    base_offset: i * 10,
                    estimated_frames: 10,
                }
            })
            .collect()
    }

    fn merged_dir(temp_dir: &TempDir) -> PathBuf {
        let dir = temp_dir.path().join("final_pngs");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_merges_uneven_segments_contiguously() {
        let temp_dir = TempDir::new().unwrap();
        let segs = segments(temp_dir.path(), &[3, 0, 2]);
        let merged = merged_dir(&temp_dir);
        let state = PipelineState::new(segs.len());
        for s in &segs {
            state.mark_segment_done(s.index);
        }

        let dispatched = Sequencer::new(&state, &segs, &merged).run();

        assert_eq!(dispatched, 5);
        assert_eq!(state.frames_prepared(), 5);
        assert!(state.is_sequencing_done());
        for (index, expected) in [(1, "0:1"), (3, "0:3"), (4, "2:1"), (5, "2:2")] {
            let content =
                std::fs::read_to_string(merged.join(format!("{:09}.png", index))).unwrap();
            assert_eq!(content, expected);
        }
        let queued: Vec<usize> = std::iter::from_fn(|| state.queue().pop_when(|| true))
            .map(|f| f.index)
            .collect();
        assert_eq!(queued, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_waits_for_successor_or_done_flag() {
        let temp_dir = TempDir::new().unwrap();
        let segs = segments(temp_dir.path(), &[1]);
        let merged = merged_dir(&temp_dir);
        let state = PipelineState::new(1);

        let (before_successor, after_successor, dispatched) = thread::scope(|s| {
            let handle = s.spawn(|| {
                Sequencer::new(&state, &segs, &merged)
                    .with_poll_interval(Duration::from_millis(5))
                    .run()
            });

            thread::sleep(Duration::from_millis(100));
            let before_successor = state.frames_prepared();

            std::fs::write(segs[0].output_dir.join("000000002.png"), "0:2").unwrap();
            thread::sleep(Duration::from_millis(100));
            let after_successor = state.frames_prepared();

            state.mark_segment_done(0);
            (before_successor, after_successor, handle.join().unwrap())
        });

        assert_eq!(before_successor, 0);
        assert_eq!(after_successor, 1);
        assert_eq!(dispatched, 2);
    }

    #[test]
    fn test_stops_on_error() {
        let temp_dir = TempDir::new().unwrap();
        let segs = segments(temp_dir.path(), &[2]);
        let merged = merged_dir(&temp_dir);
        let state = PipelineState::new(1);
        state.raise_error("decoder failed");

        let dispatched = Sequencer::new(&state, &segs, &merged).run();
        assert_eq!(dispatched, 0);
        assert!(state.is_sequencing_done());
    }

    #[test]
    fn test_rename_failures_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let segs = segments(temp_dir.path(), &[3]);
        let missing = temp_dir.path().join("no_such_dir");
        let state = PipelineState::new(1);
        state.mark_segment_done(0);

        let dispatched = Sequencer::new(&state, &segs, &missing).run();
        assert_eq!(dispatched, 0);
        assert_eq!(state.frames_prepared(), 0);
        assert!(state.queue().is_empty());
        assert!(segs[0].output_dir.join("000000003.png").exists());
    }
}
