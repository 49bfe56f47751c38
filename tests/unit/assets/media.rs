use super::*;

fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames * u32::from(channels) {
        w.write_sample((i % 100) as i16).unwrap();
    }
    w.finalize().unwrap();
}

#[test]
fn wav_duration_from_header() {
    let dir = std::env::temp_dir().join(format!("shortreel-media-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("half.wav");
    write_wav(&path, 16_000, 2, 8_000);
    let secs = wav_duration_secs(&path).unwrap();
    assert!((secs - 0.5).abs() < 1e-9);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn wav_duration_missing_file_errors() {
    assert!(wav_duration_secs(Path::new("/nonexistent/a.wav")).is_err());
}

#[test]
fn pcm_duration() {
    let pcm = AudioPcm {
        sample_rate: 10,
        channels: 2,
        interleaved_f32: vec![0.0; 40],
    };
    assert_eq!(pcm.duration_secs(), 2.0);
}

#[test]
fn probe_and_decode_wav_when_tools_present() {
    if !is_ffprobe_on_path() {
        eprintln!("skipping: ffprobe not on PATH");
        return;
    }
    let dir = std::env::temp_dir().join(format!("shortreel-probe-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("one.wav");
    write_wav(&path, 8_000, 1, 8_000);
    let input = path.to_string_lossy().into_owned();
    let secs = probe_duration_secs(&input).unwrap();
    assert!((secs - 1.0).abs() < 0.01);
    let pcm = decode_audio_f32_stereo(&input, MIX_SAMPLE_RATE).unwrap();
    assert_eq!(pcm.channels, 2);
    assert!((pcm.duration_secs() - 1.0).abs() < 0.01);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn silent_wav_reads_back_without_ffmpeg() {
    let dir = std::env::temp_dir().join(format!("shortreel-silent-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("quiet.wav");
    write_silent_wav(&path, 0.25, MIX_SAMPLE_RATE).unwrap();
    assert!((wav_duration_secs(&path).unwrap() - 0.25).abs() < 1e-9);

    let pcm = decode_audio_f32_stereo(&path.to_string_lossy(), MIX_SAMPLE_RATE).unwrap();
    assert_eq!(pcm.channels, 2);
    assert_eq!(pcm.interleaved_f32.len(), 12_000 * 2);
    assert!(pcm.interleaved_f32.iter().all(|&s| s == 0.0));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn mono_wav_at_mix_rate_is_duplicated_to_stereo() {
    let dir = std::env::temp_dir().join(format!("shortreel-mono-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("mono.wav");
    write_wav(&path, MIX_SAMPLE_RATE, 1, 4);

    let pcm = read_wav_f32_stereo(&path, MIX_SAMPLE_RATE).unwrap();
    assert_eq!(pcm.interleaved_f32.len(), 8);
    assert_eq!(pcm.interleaved_f32[2], pcm.interleaved_f32[3]);
    assert!((pcm.interleaved_f32[2] - 1.0 / 32768.0).abs() < 1e-9);
    assert!(read_wav_f32_stereo(&path, 44_100).is_none(), "other rates go through ffmpeg");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn silent_wav_rejects_bad_duration() {
    let path = std::env::temp_dir().join("shortreel-never-written.wav");
    assert!(write_silent_wav(&path, f64::NAN, MIX_SAMPLE_RATE).is_err());
    assert!(write_silent_wav(&path, 1.0, 0).is_err());
}
