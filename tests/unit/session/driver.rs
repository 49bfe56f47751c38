use super::*;
use crate::compose::plan::FramePlan;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;
use crate::layout::text::MonospaceMeasure;
use crate::project::model::{AudioRef, ImageRef, SpeechClip};
use crate::project::settings::ProjectSettings;
use crate::project::state::RenderStatus;
use crate::render::backend::FrameRGBA;

struct BlankBackend;

impl RenderBackend for BlankBackend {
    fn render_plan(
        &mut self,
        _plan: &FramePlan,
        _assets: &PreparedAssetStore,
    ) -> ShortreelResult<FrameRGBA> {
        Ok(FrameRGBA {
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 255],
            premultiplied: true,
        })
    }
}

fn store(script: &str) -> ProjectStore {
    let settings = ProjectSettings {
        canvas: Canvas {
            width: 36,
            height: 64,
        },
        ..ProjectSettings::default()
    };
    let mut store = ProjectStore::new(ProjectState::new(settings));
    store.dispatch(Action::SetScript(script.to_owned())).unwrap();
    store.dispatch(Action::SplitScript).unwrap();
    store
}

async fn render_into(
    store: &mut ProjectStore,
    req: &RenderRequest,
    sink: &mut InMemorySink,
) -> ShortreelResult<RenderedVideo> {
    let mut backend = BlankBackend;
    let mut measure = MonospaceMeasure::default();
    render(
        store,
        req,
        RenderTools {
            backend: &mut backend,
            measure: &mut measure,
            sink,
        },
    )
    .await
}

#[tokio::test]
async fn successful_render_records_the_video() {
    let mut store = store("Hello\nWorld");
    let req = RenderRequest::new("out/short.mp4", ".");
    let mut sink = InMemorySink::new();

    let video = render_into(&mut store, &req, &mut sink).await.unwrap();

    assert_eq!(video.frames, 150);
    assert_eq!(video.suggested_file_name, "youtube-shorts-video.mp4");
    assert!(!video.has_audio);
    assert_eq!(sink.frames().len(), 150);
    assert!(sink.is_finished());
    assert_eq!(store.state().render, RenderStatus::Ready(video));
}

#[tokio::test]
async fn concurrent_render_is_rejected() {
    let mut store = store("Hello");
    store.dispatch(Action::RenderStarted).unwrap();
    let mut sink = InMemorySink::new();
    let err = render_into(&mut store, &RenderRequest::new("x.mp4", "."), &mut sink)
        .await
        .unwrap_err();
    assert!(err.is_user_input());
    assert_eq!(store.state().render, RenderStatus::InProgress);
    assert!(sink.config().is_none());
}

#[tokio::test]
async fn preload_failure_resets_for_retry() {
    let mut store = store("Hello");
    let id = store.state().segments[0].id;
    store
        .dispatch(Action::SetSegmentImage {
            id,
            image: Some(ImageRef::path("definitely/missing.png")),
        })
        .unwrap();

    let req = RenderRequest::new("x.webm", ".");
    let mut sink = InMemorySink::new();
    assert!(render_into(&mut store, &req, &mut sink).await.is_err());
    assert!(matches!(store.state().render, RenderStatus::Failed(_)));
    assert!(sink.config().is_none(), "no frame work before preload succeeds");

    store
        .dispatch(Action::SetSegmentImage { id, image: None })
        .unwrap();
    let video = render_into(&mut store, &req, &mut sink).await.unwrap();
    assert_eq!(video.container, Container::Webm);
    assert_eq!(video.frames, 90);
}

#[tokio::test]
async fn undecodable_speech_fails_the_render() {
    let mut store = store("Hello");
    let id = store.state().segments[0].id;
    store
        .dispatch(Action::SpeechCompleted {
            id,
            text: "Hello".to_owned(),
            clip: SpeechClip {
                audio: AudioRef("definitely/missing.wav".to_owned()),
                duration_secs: 1.0,
            },
        })
        .unwrap();

    let mut sink = InMemorySink::new();
    let req = RenderRequest::new("x.mp4", ".");
    assert!(render_into(&mut store, &req, &mut sink).await.is_err());
    assert!(matches!(store.state().render, RenderStatus::Failed(_)));

    let video = render_into(&mut store, &req.clone().with_soundtrack(false), &mut sink)
        .await
        .unwrap();
    assert_eq!(video.frames, 60);
}
