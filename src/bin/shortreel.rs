use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shortreel::assets::source::import_image_file;
use shortreel::services::speech::synthesize_missing;
use shortreel::services::{ScriptRequest, ServiceResponse};
use shortreel::{
    Action, CpuBackend, CpuBackendOpts, FfmpegSink, FfmpegSinkOpts, FrameIndex, MockSpeech,
    OpenAiScriptGenerator, ParleyMeasure, Phase, PiperSpeech, PreparedAssetStore, PreparedFont,
    ProjectState, ProjectStore, RenderBackend as _, RenderRequest, RenderTools, Scene,
    ScriptService, SpeechSynthesizer, TextLayoutEngine, Timeline, Voice,
};

#[derive(Parser, Debug)]
#[command(name = "shortreel", version, about = "Assemble short vertical videos from a script")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a script into segments and write the project file.
    Split(SplitArgs),
    /// Print the timeline of a project.
    Timeline(TimelineArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the whole project to a video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Synthesize speech for every segment that has none.
    Speech(SpeechArgs),
    /// Generate a script for a topic.
    Script(ScriptArgs),
    /// Attach image files to segments, the thumbnail, or the background.
    ImportImage(ImportImageArgs),
}

#[derive(Args, Debug)]
struct ProjectArg {
    /// Project JSON file.
    #[arg(long = "project", short = 'p')]
    path: PathBuf,
}

#[derive(Parser, Debug)]
struct SplitArgs {
    #[command(flatten)]
    project: ProjectArg,

    /// Script file, one segment per line (`-` reads stdin).
    #[arg(long)]
    script: PathBuf,

    /// Start from an empty project even if the project file exists.
    #[arg(long)]
    fresh: bool,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    project: ProjectArg,

    /// Also report what is on screen at this time (seconds).
    #[arg(long)]
    at: Option<f64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    project: ProjectArg,

    /// Time in seconds.
    #[arg(long, conflicts_with = "frame")]
    t: Option<f64>,

    /// Frame index (0-based).
    #[arg(long)]
    frame: Option<u64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    project: ProjectArg,

    /// Output video path; `.webm` selects VP9/WebM, anything else H.264/MP4.
    #[arg(long)]
    out: PathBuf,

    /// Leave segment speech out of the video.
    #[arg(long)]
    no_audio: bool,
}

#[derive(Parser, Debug)]
struct SpeechArgs {
    #[command(flatten)]
    project: ProjectArg,

    /// Voice preset (female1, female2, male1, male2). Defaults to the project's voice.
    #[arg(long)]
    voice: Option<Voice>,

    /// Directory of piper voice models (`<voice>.onnx`). Without it a mock synthesizer is used.
    #[arg(long)]
    piper_models: Option<PathBuf>,

    /// Directory the synthesized WAV files are written to, relative to the project file.
    #[arg(long, default_value = "speech")]
    speech_dir: PathBuf,

    /// Mock synthesizer delay in milliseconds.
    #[arg(long, default_value_t = 3000)]
    mock_delay_ms: u64,
}

#[derive(Parser, Debug)]
struct ScriptArgs {
    /// Topic to write about.
    #[arg(long)]
    topic: String,

    /// Script tone.
    #[arg(long)]
    style: Option<String>,

    /// Store the script (or the fallback message) in this project file.
    #[arg(long)]
    project: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ImportImageArgs {
    #[command(flatten)]
    project: ProjectArg,

    /// Image files.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Attach to the segment at this 1-based position instead of filling segments without images.
    #[arg(long, conflicts_with_all = ["thumbnail", "background"])]
    segment: Option<usize>,

    /// Use the (first) image as the thumbnail cover.
    #[arg(long, conflicts_with = "background")]
    thumbnail: bool,

    /// Use the (first) image as the background.
    #[arg(long)]
    background: bool,

    /// Keep a path reference instead of embedding the bytes as a data URL.
    #[arg(long)]
    link: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Split(args) => cmd_split(args),
        Command::Timeline(args) => cmd_timeline(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args).await,
        Command::Speech(args) => cmd_speech(args).await,
        Command::Script(args) => cmd_script(args).await,
        Command::ImportImage(args) => cmd_import_image(args),
    }
}

fn load_project(path: &Path) -> anyhow::Result<ProjectState> {
    Ok(ProjectState::load(path)?)
}

fn assets_root(project: &Path) -> PathBuf {
    project
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn resolve_font(state: &ProjectState) -> anyhow::Result<PreparedFont> {
    let explicit = std::env::var_os("SHORTREEL_FONT")
        .map(PathBuf::from)
        .or_else(|| state.settings.font_path.clone());
    PreparedFont::resolve(explicit.as_deref()).context("resolve overlay font")
}

fn cmd_split(args: SplitArgs) -> anyhow::Result<()> {
    let script = if args.script.as_os_str() == "-" {
        let mut s = String::new();
        std::io::stdin()
            .read_to_string(&mut s)
            .context("read script from stdin")?;
        s
    } else {
        std::fs::read_to_string(&args.script)
            .with_context(|| format!("read script '{}'", args.script.display()))?
    };

    let base = if !args.fresh && args.project.path.exists() {
        load_project(&args.project.path)?
    } else {
        ProjectState::default()
    };
    let mut store = ProjectStore::new(base);
    store.dispatch(Action::SetScript(script))?;
    store.dispatch(Action::SplitScript)?;
    store.state().save(&args.project.path)?;

    eprintln!(
        "wrote {} ({} segments)",
        args.project.path.display(),
        store.state().segments.len()
    );
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let state = load_project(&args.project.path)?;
    let timeline = Timeline::from_project(&state)?;
    let fps = state.settings.fps;

    for (phase, iv) in timeline.intervals() {
        let label = match phase {
            Phase::Thumbnail => "thumbnail".to_owned(),
            Phase::Segment { index } => match state.segments.get(index) {
                Some(seg) => format!("segment {} \"{}\"", seg.order, seg.text),
                None => format!("segment #{index}"),
            },
        };
        println!("{:>8.3} .. {:>8.3}  {label}", iv.start, iv.end);
    }
    println!(
        "total {:.3}s, {} frames at {}/{} fps",
        timeline.total_duration(),
        timeline.frame_count(fps),
        fps.num,
        fps.den
    );

    if let Some(t) = args.at {
        let r = timeline.resolve(t);
        match r.phase {
            Phase::Thumbnail => println!("t={t}: thumbnail +{:.3}s", r.local_offset),
            Phase::Segment { index } => {
                println!("t={t}: segment index {index} +{:.3}s", r.local_offset)
            }
        }
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let state = load_project(&args.project.path)?;
    let assets = PreparedAssetStore::prepare(&state, assets_root(&args.project.path))?;
    let font = resolve_font(&state)?;

    let mut engine = TextLayoutEngine::new();
    let scene = {
        let mut measure = ParleyMeasure::new(&mut engine, &font)?;
        Scene::build(&state, &assets, &mut measure)?
    };
    let plan = match (args.t, args.frame) {
        (Some(t), _) => scene.compose_frame(t),
        (None, idx) => scene.compose_index(FrameIndex(idx.unwrap_or(0)), state.settings.fps),
    };

    let mut backend = CpuBackend::new(CpuBackendOpts::default().with_font(font));
    let frame = backend.render_plan(&plan, &assets)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} (t={:.3}s, {:?})", args.out.display(), plan.t, plan.phase);
    Ok(())
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let state = load_project(&args.project.path)?;
    let font = resolve_font(&state)?;
    let mut store = ProjectStore::new(state);

    let req = RenderRequest::new(&args.out, assets_root(&args.project.path))
        .with_soundtrack(!args.no_audio);
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&args.out));
    let mut backend = CpuBackend::new(CpuBackendOpts::default().with_font(font.clone()));
    let mut engine = TextLayoutEngine::new();
    let mut measure = ParleyMeasure::new(&mut engine, &font)?;

    let video = shortreel::render(
        &mut store,
        &req,
        RenderTools {
            backend: &mut backend,
            measure: &mut measure,
            sink: &mut sink,
        },
    )
    .await?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s{}); suggested name {}",
        video.path.display(),
        video.frames,
        video.duration_secs,
        if video.has_audio { ", with speech" } else { "" },
        video.suggested_file_name
    );
    Ok(())
}

async fn cmd_speech(args: SpeechArgs) -> anyhow::Result<()> {
    let mut store = ProjectStore::new(load_project(&args.project.path)?);
    if let Some(voice) = args.voice {
        store.dispatch(Action::SetVoice(voice))?;
    }

    // Stored clip paths are absolute.
    let speech_dir = std::path::absolute(assets_root(&args.project.path).join(&args.speech_dir))
        .context("resolve speech output directory")?;
    let synth: Box<dyn SpeechSynthesizer> = match args.piper_models {
        Some(models) => Box::new(PiperSpeech::new(models, speech_dir)),
        None => Box::new(
            MockSpeech::new(speech_dir).with_delay(Duration::from_millis(args.mock_delay_ms)),
        ),
    };
    let attached = synthesize_missing(&mut store, synth.as_ref()).await?;
    store.state().save(&args.project.path)?;

    let missing = store.state().segments_missing_audio().len();
    eprintln!("attached speech to {attached} segment(s), {missing} still without audio");
    Ok(())
}

async fn cmd_script(args: ScriptArgs) -> anyhow::Result<()> {
    let generator = OpenAiScriptGenerator::from_env()
        .context("OPENAI_API_KEY must be set to generate scripts")?;
    let service = ScriptService::new(generator);
    let res: ServiceResponse = service
        .handle(ScriptRequest {
            topic: Some(args.topic.clone()),
            style: args.style,
        })
        .await;

    println!("{}", serde_json::to_string_pretty(&res.body)?);

    if let Some(path) = args.project {
        let base = if path.exists() {
            load_project(&path)?
        } else {
            ProjectState::default()
        };
        let mut store = ProjectStore::new(base);
        store.dispatch(Action::SetTopic(args.topic))?;
        store.dispatch(Action::SetScript(res.script_or_fallback()))?;
        store.state().save(&path)?;
        eprintln!("stored script in {}", path.display());
    }

    if !res.is_success() {
        anyhow::bail!("script generation failed with status {}", res.status);
    }
    Ok(())
}

fn cmd_import_image(args: ImportImageArgs) -> anyhow::Result<()> {
    let mut store = ProjectStore::new(load_project(&args.project.path)?);

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let img = if args.link {
            shortreel::ImageRef::path(path)
        } else {
            import_image_file(path)?
        };
        images.push(img);
    }

    if args.thumbnail || args.background {
        let first = images.into_iter().next();
        if args.thumbnail {
            store.dispatch(Action::SetThumbnailImage(first))?;
        } else {
            store.dispatch(Action::SetBackground(first))?;
        }
    } else if let Some(position) = args.segment {
        let id = position
            .checked_sub(1)
            .and_then(|i| store.state().segments.get(i))
            .map(|s| s.id)
            .with_context(|| format!("no segment at position {position}"))?;
        store.dispatch(Action::SetSegmentImage {
            id,
            image: images.into_iter().next(),
        })?;
    } else {
        store.dispatch(Action::AssignImages(images))?;
    }

    store.state().save(&args.project.path)?;
    eprintln!("updated {}", args.project.path.display());
    Ok(())
}
