use std::io::Cursor;

use super::*;
use crate::assets::source::import_image_bytes;
use crate::layout::text::MonospaceMeasure;
use crate::project::model::{AudioRef, SpeechClip};
use crate::project::state::Action;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn two_segment_project() -> ProjectState {
    let s = ProjectState::default()
        .reduce(Action::SetScript("Hello\nWorld".to_owned()))
        .unwrap()
        .reduce(Action::SplitScript)
        .unwrap();
    let (a, b) = (s.segments[0].id, s.segments[1].id);
    let clip = |secs| SpeechClip {
        audio: AudioRef("x.wav".to_owned()),
        duration_secs: secs,
    };
    s.reduce(Action::SpeechCompleted {
        id: a,
        text: "Hello".to_owned(),
        clip: clip(2.0),
    })
    .unwrap()
    .reduce(Action::SpeechCompleted {
        id: b,
        text: "World".to_owned(),
        clip: clip(3.0),
    })
    .unwrap()
}

fn build(state: &ProjectState) -> Scene {
    let assets = PreparedAssetStore::prepare(state, ".").unwrap();
    Scene::build(state, &assets, &mut MonospaceMeasure::default()).unwrap()
}

fn texts(plan: &FramePlan) -> Vec<String> {
    plan.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text(t) => Some(
                t.lines
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        })
        .collect()
}

#[test]
fn thumbnail_phase_draws_background_and_title() {
    let state = two_segment_project();
    let scene = build(&state);
    let plan = scene.compose_frame(0.5);
    assert_eq!(plan.phase, Phase::Thumbnail);
    assert_eq!(plan.ops[0], DrawOp::Fill(Color::BLACK));
    assert_eq!(texts(&plan), ["Enter a thumbnail title"]);
}

#[test]
fn segment_phase_keeps_running_title_then_subtitle() {
    let state = two_segment_project();
    let scene = build(&state);
    let plan = scene.compose_frame(4.5);
    assert_eq!(plan.phase, Phase::Segment { index: 1 });
    assert_eq!(texts(&plan), ["Enter a thumbnail title", "World"]);
}

#[test]
fn cover_only_title_is_dropped_after_thumbnail() {
    let mut state = two_segment_project();
    state.settings.title_mode = TitleMode::CoverOnly;
    let scene = build(&state);
    assert_eq!(texts(&scene.compose_frame(1.5)), ["Hello"]);
    assert_eq!(texts(&scene.compose_frame(0.0)).len(), 1);
}

#[test]
fn hidden_title_and_missing_images_are_skipped() {
    let state = two_segment_project()
        .reduce(Action::SetThumbnailVisible(false))
        .unwrap();
    let scene = build(&state);
    let plan = scene.compose_frame(0.2);
    assert_eq!(plan.ops.len(), 1);
    let plan = scene.compose_frame(2.0);
    assert_eq!(plan.ops.len(), 2);
}

#[test]
fn images_are_contain_fitted_at_output_scale() {
    let wide = import_image_bytes(&png(300, 100), Some("wide.png")).unwrap();
    let state = two_segment_project()
        .reduce(Action::AssignImages(vec![wide.clone()]))
        .unwrap()
        .reduce(Action::SetBackground(Some(wide)))
        .unwrap();
    let scene = build(&state);
    let plan = scene.compose_frame(1.0);

    let DrawOp::Image { dest, .. } = &plan.ops[0] else {
        panic!("expected stretched background");
    };
    assert_eq!(*dest, Rect::new(0.0, 0.0, 1080.0, 1920.0));

    let seg_image = plan
        .ops
        .iter()
        .skip(1)
        .find_map(|op| match op {
            DrawOp::Image { dest, .. } => Some(*dest),
            _ => None,
        })
        .unwrap();
    // Base 450x300 output px at scale 1.5 -> 675x450 box; a 3:1 image fills the width.
    assert!((seg_image.width() - 675.0).abs() < 1e-9);
    assert!((seg_image.height() - 225.0).abs() < 1e-9);
    assert_eq!(seg_image.center(), Point::new(540.0, 960.0));
}

#[test]
fn subtitle_uses_segment_style_and_output_scale() {
    let state = two_segment_project();
    let id = state.segments[0].id;
    let state = state
        .reduce(Action::SetTextColor {
            id,
            color: Color::rgb(255, 255, 0),
        })
        .unwrap();
    let scene = build(&state);
    let plan = scene.compose_frame(1.0);
    let Some(DrawOp::Text(block)) = plan.ops.last() else {
        panic!("expected subtitle");
    };
    assert_eq!(block.fill, Color::rgb(255, 255, 0));
    assert_eq!(block.size_px, 72.0);
    assert_eq!(block.outline.map(|o| o.width_px), Some(6.0));
    let line = &block.lines[0];
    assert_eq!(line.origin.x + line.width / 2.0, 540.0);
    assert_eq!(line.origin.y + line.height / 2.0, 1440.0);
}

#[test]
fn long_subtitles_wrap_within_canvas_ratio() {
    let state = ProjectState::default()
        .reduce(Action::SetScript(
            "this subtitle is long enough that it cannot possibly fit on one line".to_owned(),
        ))
        .unwrap()
        .reduce(Action::SplitScript)
        .unwrap();
    let scene = build(&state);
    let plan = scene.compose_frame(1.5);
    let Some(DrawOp::Text(block)) = plan.ops.last() else {
        panic!("expected subtitle");
    };
    assert!(block.lines.len() > 1);
    for line in &block.lines {
        assert!(line.width <= 1080.0 * 0.8);
    }
}

#[test]
fn unprepared_image_is_an_error() {
    let img = import_image_bytes(&png(2, 2), None).unwrap();
    let state = two_segment_project()
        .reduce(Action::SetBackground(Some(img)))
        .unwrap();
    let empty = PreparedAssetStore::new(".");
    assert!(Scene::build(&state, &empty, &mut MonospaceMeasure::default()).is_err());
}

#[test]
fn compose_index_uses_frame_time() {
    let scene = build(&two_segment_project());
    let plan = scene.compose_index(FrameIndex(45), Fps::default());
    assert_eq!(plan.t, 1.5);
    assert_eq!(plan.phase, Phase::Segment { index: 0 });
}
