use std::path::PathBuf;
use std::sync::Arc;

use crate::assets::store::PreparedAssetStore;
use crate::compose::compositor::Scene;
use crate::encode::sink::{Container, FrameSink};
use crate::foundation::error::{ShortreelError, ShortreelResult};
use crate::layout::text::TextMeasure;
use crate::project::state::{Action, ProjectState, ProjectStore};
use crate::render::backend::RenderBackend;
use crate::session::job::{RenderJob, RenderedVideo, SoundtrackFile, write_soundtrack};

/// What to render and where.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// File the sink writes; reported back in the [`RenderedVideo`].
    pub out_path: PathBuf,
    /// Container the sink encodes.
    pub container: Container,
    /// Directory relative image and speech paths resolve against.
    pub assets_root: PathBuf,
    /// Mux segment speech into the video.
    pub soundtrack: bool,
}

impl RenderRequest {
    /// Request a render to `out_path`, picking the container from its extension (MP4 otherwise).
    pub fn new(out_path: impl Into<PathBuf>, assets_root: impl Into<PathBuf>) -> Self {
        let out_path = out_path.into();
        let container = out_path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Container::from_extension)
            .unwrap_or_default();
        Self {
            out_path,
            container,
            assets_root: assets_root.into(),
            soundtrack: true,
        }
    }

    /// Enable or disable the speech soundtrack.
    pub fn with_soundtrack(mut self, soundtrack: bool) -> Self {
        self.soundtrack = soundtrack;
        self
    }
}

/// Collaborators a render runs with.
pub struct RenderTools<'a> {
    /// Rasterizer for frame plans.
    pub backend: &'a mut dyn RenderBackend,
    /// Text measurement used for wrapping.
    pub measure: &'a mut dyn TextMeasure,
    /// Destination of the encoded frames.
    pub sink: &'a mut dyn FrameSink,
}

/// Render the current project of `store` into a video.
///
/// The store moves to `InProgress` first; a second render while one is running is rejected. Images
/// are preloaded off the async executor and any failure aborts before the first frame. The frame
/// loop yields to the runtime between frames. On success the store records the video; on any
/// failure the sink is aborted, the store records the error, and a new render may be started.
#[tracing::instrument(skip_all, fields(out = %req.out_path.display()))]
pub async fn render(
    store: &mut ProjectStore,
    req: &RenderRequest,
    tools: RenderTools<'_>,
) -> ShortreelResult<RenderedVideo> {
    store.dispatch(Action::RenderStarted)?;
    match run(store.snapshot(), req, tools).await {
        Ok(video) => {
            tracing::info!(frames = video.frames, "render finished");
            store.dispatch(Action::RenderFinished(video.clone()))?;
            Ok(video)
        }
        Err(e) => {
            tracing::warn!(error = %e, "render failed");
            store.dispatch(Action::RenderFailed(e.to_string()))?;
            Err(e)
        }
    }
}

async fn run(
    state: Arc<ProjectState>,
    req: &RenderRequest,
    tools: RenderTools<'_>,
) -> ShortreelResult<RenderedVideo> {
    let assets = {
        let state = Arc::clone(&state);
        let root = req.assets_root.clone();
        tokio::task::spawn_blocking(move || PreparedAssetStore::prepare(&state, root))
            .await
            .map_err(join_error)??
    };
    tracing::debug!(images = assets.len(), "assets preloaded");

    let scene = Scene::build(&state, &assets, tools.measure)?;
    let mut job = RenderJob::new(scene, state.settings.fps)?;

    let soundtrack: Option<SoundtrackFile> = if req.soundtrack {
        let state = Arc::clone(&state);
        let timeline = job.scene().timeline().clone();
        let fps = job.fps();
        let root = req.assets_root.clone();
        tokio::task::spawn_blocking(move || write_soundtrack(&state, &timeline, fps, &root))
            .await
            .map_err(join_error)??
    } else {
        None
    };

    let sink = tools.sink;
    sink.begin(job.sink_config(soundtrack.as_ref().map(SoundtrackFile::input_config)))?;
    tracing::info!(frames = job.total_frames(), audio = soundtrack.is_some(), "render started");

    let res = async {
        while job.step(tools.backend, &assets, sink)? {
            tokio::task::yield_now().await;
        }
        sink.end()
    }
    .await;
    if let Err(e) = res {
        sink.abort();
        return Err(e);
    }

    Ok(
        RenderedVideo::new(&req.out_path, req.container, job.rendered_frames(), job.fps())
            .with_audio(soundtrack.is_some()),
    )
}

fn join_error(e: tokio::task::JoinError) -> ShortreelError {
    ShortreelError::evaluation(format!("background task failed: {e}"))
}

#[cfg(test)]
#[path = "../../tests/unit/session/driver.rs"]
mod tests;
