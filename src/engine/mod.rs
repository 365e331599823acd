//! Asset generation engine
//!
//! Extraction workers decode segments in parallel, the sequencer merges
//! their output into one globally numbered stream and render workers turn
//! each image into a text frame. All of them share one [`PipelineState`].

pub mod audio;
pub mod calibrate;
pub mod extract;
pub mod pipeline;
pub mod queue;
pub mod render;
pub mod sequencer;
pub mod state;

pub use audio::AudioPreparer;
pub use calibrate::HeightResolver;
pub use pipeline::{AssetPipeline, PipelineReport};
pub use state::PipelineState;
