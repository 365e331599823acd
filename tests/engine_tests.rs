//! Integration tests for the extraction and rendering pipeline

mod common;

use std::time::Duration;

use anifetch::cache::CacheLayout;
use anifetch::domain::model::{CacheKey, SizeSpec};
use anifetch::engine::AssetPipeline;
use anifetch::error::AnifetchError;
use anifetch::planner::SegmentPlanner;
use tempfile::TempDir;

use common::{create_input, parameters, text_frames, FakeDecoder, FakeRenderer};

const POLL: Duration = Duration::from_millis(5);

struct Fixture {
    _temp_dir: TempDir,
    layout: CacheLayout,
    params: anifetch::ParameterSet,
}

fn fixture() -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let input = create_input(temp_dir.path(), "clip.mp4");
    let params = parameters(&input, 40, 10, 10);
    let key = CacheKey::compute(&params);
    let layout = CacheLayout::new(&temp_dir.path().join("cache"), &params.basename(), &key);
    layout.prepare_fresh().unwrap();
    Fixture {
        _temp_dir: temp_dir,
        layout,
        params,
    }
}

#[test]
fn test_pipeline_produces_contiguous_ordered_frames() {
    let fx = fixture();
    let decoder = FakeDecoder::new(10.0, 10);
    let renderer = FakeRenderer::new(10);
    let plan = SegmentPlanner::new(8)
        .plan(10.0, 10, &fx.layout.segments_root())
        .unwrap();
    assert_eq!(plan.segments.len(), 4);

    let report = AssetPipeline::new(&decoder, &renderer)
        .with_poll_interval(POLL)
        .run(&fx.params, &plan, &fx.layout, SizeSpec::new(40, 10))
        .unwrap();

    assert_eq!(report.frames, 100);
    assert_eq!(report.frames_prepared, 100);
    assert_eq!(report.frames_rendered, 100);
    assert_eq!(report.extraction_workers, 4);

    let names = text_frames(&fx.layout.ascii_dir());
    assert_eq!(names.len(), 100);
    for (i, name) in names.iter().enumerate() {
        assert_eq!(name, &format!("{:09}.txt", i + 1));
    }

    // Each text frame was rendered from the merged image of the same index
    for index in [1usize, 25, 26, 51, 100] {
        let text =
            std::fs::read_to_string(fx.layout.ascii_dir().join(format!("{:09}.txt", index))).unwrap();
        assert!(text.starts_with(&format!("{:09}.png:0", index)), "frame {}: {}", index, text);
        assert_eq!(text.lines().count(), 10);
    }
}

#[test]
fn test_pipeline_closes_gap_of_blank_frame() {
    let fx = fixture();
    let decoder = FakeDecoder::new(10.0, 10);
    let mut renderer = FakeRenderer::new(10);
    renderer.blank_for = Some("000000005.png".to_string());
    let plan = SegmentPlanner::new(4)
        .plan(10.0, 10, &fx.layout.segments_root())
        .unwrap();

    let report = AssetPipeline::new(&decoder, &renderer)
        .with_poll_interval(POLL)
        .run(&fx.params, &plan, &fx.layout, SizeSpec::new(40, 10))
        .unwrap();

    assert_eq!(report.frames, 99);
    assert_eq!(report.frames_prepared, 100);
    let names = text_frames(&fx.layout.ascii_dir());
    assert_eq!(names.len(), 99);
    assert_eq!(names.last().map(String::as_str), Some("000000099.txt"));

    let fifth = std::fs::read_to_string(fx.layout.ascii_dir().join("000000005.txt")).unwrap();
    assert!(fifth.starts_with("000000006.png"));
}

#[test]
fn test_pipeline_fails_when_a_segment_fails() {
    let fx = fixture();
    let mut decoder = FakeDecoder::new(10.0, 10);
    decoder.fail_at_start = Some(2.5);
    let renderer = FakeRenderer::new(10);
    let plan = SegmentPlanner::new(8)
        .plan(10.0, 10, &fx.layout.segments_root())
        .unwrap();

    let result = AssetPipeline::new(&decoder, &renderer)
        .with_poll_interval(POLL)
        .run(&fx.params, &plan, &fx.layout, SizeSpec::new(40, 10));

    match result {
        Err(AnifetchError::PipelineFailed { message }) => {
            assert!(message.contains("simulated decode failure"), "{}", message)
        }
        other => panic!("expected pipeline failure, got {:?}", other),
    }
}

#[test]
fn test_single_segment_for_short_video() {
    let fx = fixture();
    let decoder = FakeDecoder::new(0.5, 10);
    let renderer = FakeRenderer::new(3);
    let plan = SegmentPlanner::new(16)
        .plan(0.5, 10, &fx.layout.segments_root())
        .unwrap();
    assert_eq!(plan.segments.len(), 1);

    let report = AssetPipeline::new(&decoder, &renderer)
        .with_poll_interval(POLL)
        .run(&fx.params, &plan, &fx.layout, SizeSpec::new(40, 3))
        .unwrap();

    assert_eq!(report.frames, 5);
    assert_eq!(text_frames(&fx.layout.ascii_dir()).len(), 5);
}
