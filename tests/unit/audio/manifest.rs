use super::*;
use crate::project::model::SpeechClip;
use crate::project::state::Action;

fn project_with_audio() -> ProjectState {
    let s = ProjectState::default()
        .reduce(Action::SetScript("Hello\nWorld\nAgain".to_owned()))
        .unwrap()
        .reduce(Action::SplitScript)
        .unwrap();
    let first = s.segments[0].id;
    let third = s.segments[2].id;
    s.reduce(Action::SpeechCompleted {
        id: first,
        text: "Hello".to_owned(),
        clip: SpeechClip {
            audio: AudioRef("hello.wav".to_owned()),
            duration_secs: 2.0,
        },
    })
    .unwrap()
    .reduce(Action::SpeechCompleted {
        id: third,
        text: "Again".to_owned(),
        clip: SpeechClip {
            audio: AudioRef("hello.wav".to_owned()),
            duration_secs: 1.0,
        },
    })
    .unwrap()
}

fn silence(secs: f64, sample_rate: u32) -> AudioPcm {
    AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: vec![0.0; (secs * f64::from(sample_rate)) as usize * 2],
    }
}

#[test]
fn clips_start_at_their_segment_offsets() {
    let state = project_with_audio();
    let timeline = Timeline::from_project(&state).unwrap();
    let mut calls = 0;
    let m = build_soundtrack(&state, &timeline, Fps::default(), 1_000, |_| {
        calls += 1;
        Ok(silence(2.0, 1_000))
    })
    .unwrap();

    // thumbnail 1s, then 2s + fallback 2s + 1s.
    assert_eq!(m.total_samples, 6_000);
    assert_eq!(m.clips.len(), 2);
    assert_eq!((m.clips[0].start_sample, m.clips[0].end_sample), (1_000, 3_000));
    assert_eq!((m.clips[1].start_sample, m.clips[1].end_sample), (5_000, 6_000));
    assert_eq!(calls, 1, "identical handles decode once");
}

#[test]
fn project_without_audio_is_silent() {
    let state = ProjectState::default()
        .reduce(Action::SetScript("One".to_owned()))
        .unwrap()
        .reduce(Action::SplitScript)
        .unwrap();
    let timeline = Timeline::from_project(&state).unwrap();
    let m = build_soundtrack(&state, &timeline, Fps::default(), 1_000, |_| {
        panic!("no audio to decode")
    })
    .unwrap();
    assert!(m.is_silent());
    assert_eq!(m.total_samples, 3_000);
}

#[test]
fn decode_failure_names_the_segment() {
    let state = project_with_audio();
    let timeline = Timeline::from_project(&state).unwrap();
    let first = state.segments[0].id;
    let err = build_soundtrack(&state, &timeline, Fps::default(), 1_000, |_| {
        Err(ShortreelError::asset("boom"))
    })
    .unwrap_err();
    assert!(err.to_string().contains(&first.to_string()));
}

#[test]
fn sample_rate_mismatch_is_rejected() {
    let state = project_with_audio();
    let timeline = Timeline::from_project(&state).unwrap();
    assert!(
        build_soundtrack(&state, &timeline, Fps::default(), 1_000, |_| Ok(silence(1.0, 8_000)))
            .is_err()
    );
}
