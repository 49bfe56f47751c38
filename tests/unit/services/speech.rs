use super::*;
use crate::project::state::ProjectState;
use std::sync::Mutex;

use crate::assets::media::wav_duration_secs;

fn store(script: &str) -> ProjectStore {
    let mut store = ProjectStore::new(ProjectState::default());
    store.dispatch(Action::SetScript(script.to_owned())).unwrap();
    store.dispatch(Action::SplitScript).unwrap();
    store
}

/// Records requests and answers with a clip whose length is the text length.
#[derive(Default)]
struct Recording {
    calls: Mutex<Vec<(String, Voice)>>,
    fail_on: Option<&'static str>,
}

#[async_trait]
impl SpeechSynthesizer for Recording {
    async fn synthesize(&self, text: &str, voice: Voice) -> ShortreelResult<SpeechClip> {
        self.calls.lock().unwrap().push((text.to_owned(), voice));
        if self.fail_on == Some(text) {
            return Err(ShortreelError::service("synthesis failed"));
        }
        Ok(SpeechClip {
            audio: AudioRef(format!("{text}.wav")),
            duration_secs: text.len() as f64,
        })
    }
}

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("shortreel-speech-{tag}-{}", std::process::id()))
}

#[tokio::test(start_paused = true)]
async fn mock_waits_then_writes_local_silent_clip() {
    let dir = temp_dir("mock");
    let start = tokio::time::Instant::now();
    let clip = MockSpeech::new(&dir)
        .synthesize("Hello", Voice::Male1)
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_secs(3));
    assert_eq!(clip.duration_secs, MockSpeech::DEFAULT_DURATION_SECS);

    let path = Path::new(clip.audio.as_str());
    assert!(path.starts_with(&dir));
    let secs = wav_duration_secs(path).unwrap();
    assert!((secs - clip.duration_secs).abs() < 1e-3);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn mock_speech_feeds_an_offline_soundtrack() {
    use crate::foundation::core::Fps;
    use crate::session::job::write_soundtrack;
    use crate::timeline::Timeline;

    let dir = temp_dir("offline");
    let mut store = store("One\nTwo");
    let synth = MockSpeech::new(dir.join("speech"))
        .with_delay(Duration::ZERO)
        .with_duration(0.5);
    assert_eq!(synthesize_missing(&mut store, &synth).await.unwrap(), 2);

    let state = store.snapshot();
    let timeline = Timeline::from_project(&state).unwrap();
    let track = write_soundtrack(&state, &timeline, Fps::default(), &dir).unwrap();
    assert!(track.is_some(), "both mock clips decode locally");
    drop(track);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn missing_speech_is_requested_in_order_with_selected_voice() {
    let mut store = store("One\nTwo\nThree");
    store.dispatch(Action::SetVoice(Voice::Female2)).unwrap();
    let synth = Recording::default();

    let n = synthesize_missing(&mut store, &synth).await.unwrap();

    assert_eq!(n, 3);
    let calls = synth.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            ("One".to_owned(), Voice::Female2),
            ("Two".to_owned(), Voice::Female2),
            ("Three".to_owned(), Voice::Female2),
        ]
    );
    for s in &store.state().segments {
        assert_eq!(s.audio_duration, Some(s.text.len() as f64));
        assert!(!s.generating);
    }
}

#[tokio::test]
async fn segments_with_audio_are_skipped() {
    let mut store = store("One\nTwo");
    let synth = Recording::default();
    synthesize_missing(&mut store, &synth).await.unwrap();
    let id = store.state().segments[1].id;
    store
        .dispatch(Action::EditSegmentText {
            id,
            text: "Changed".to_owned(),
        })
        .unwrap();

    let again = Recording::default();
    assert_eq!(synthesize_missing(&mut store, &again).await.unwrap(), 1);
    assert_eq!(again.calls.lock().unwrap().len(), 1);
    assert_eq!(again.calls.lock().unwrap()[0].0, "Changed");
}

#[tokio::test]
async fn failure_clears_generating_and_continues() {
    let mut store = store("One\nTwo");
    let synth = Recording {
        fail_on: Some("One"),
        ..Recording::default()
    };

    assert_eq!(synthesize_missing(&mut store, &synth).await.unwrap(), 1);
    let segs = &store.state().segments;
    assert!(segs[0].audio.is_none());
    assert!(!segs[0].generating);
    assert!(segs[1].audio.is_some());
}

#[tokio::test]
async fn piper_without_model_is_a_service_error() {
    let dir = std::env::temp_dir().join("shortreel-piper-missing");
    let piper = PiperSpeech::new(dir.join("models"), dir.join("out"));
    let err = piper.synthesize("Hi", Voice::Male2).await.unwrap_err();
    assert!(matches!(err, ShortreelError::Service(_)));
    assert!(piper.model_for(Voice::Male2).ends_with("male2.onnx"));
}
