//! Segment planning for parallel frame extraction

pub mod segments;

pub use segments::*;

use serde::Serialize;

use crate::domain::model::Segment;

/// Result of partitioning one input
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionPlan {
    /// Total media duration in seconds
    pub duration: f64,
    /// Frames extracted per second
    pub framerate: u32,
    /// Disjoint, contiguous segments covering `[0, duration)`
    pub segments: Vec<Segment>,
    /// Size of the render worker pool
    pub render_workers: usize,
}

impl ExtractionPlan {
    /// Sum of the per-segment frame estimates
    pub fn estimated_frames(&self) -> usize {
        self.segments.iter().map(|s| s.estimated_frames).sum()
    }
}
