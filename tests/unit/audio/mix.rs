use super::*;
use crate::assets::media::AudioPcm;
use std::sync::Arc;

fn manifest(total: u64, clips: Vec<PlacedClip>) -> SoundtrackManifest {
    SoundtrackManifest {
        sample_rate: 10,
        channels: 2,
        total_samples: total,
        clips,
    }
}

fn clip(start: u64, end: u64, channels: u16, samples: Vec<f32>) -> PlacedClip {
    PlacedClip {
        start_sample: start,
        end_sample: end,
        pcm: Arc::new(AudioPcm {
            sample_rate: 10,
            channels,
            interleaved_f32: samples,
        }),
    }
}

#[test]
fn frame_to_sample_uses_rational_fps() {
    let fps = Fps {
        num: 30_000,
        den: 1001,
    };
    assert_eq!(frame_to_sample(0, fps, 48_000), 0);
    assert_eq!(frame_to_sample(30_000, fps, 48_000), 48_048_000);
    assert_eq!(frame_to_sample(180, Fps::default(), 48_000), 288_000);
}

#[test]
fn secs_to_sample_rounds_and_clamps() {
    assert_eq!(secs_to_sample(1.5, 48_000), 72_000);
    assert_eq!(secs_to_sample(-1.0, 48_000), 0);
    assert_eq!(secs_to_sample(f64::NAN, 48_000), 0);
}

#[test]
fn mono_clip_is_duplicated_to_both_channels_at_its_offset() {
    let m = manifest(4, vec![clip(1, 3, 1, vec![0.25, 0.5, 0.75])]);
    let out = mix_manifest(&m);
    assert_eq!(out, vec![0.0, 0.0, 0.25, 0.25, 0.5, 0.5, 0.0, 0.0]);
}

#[test]
fn clip_shorter_than_its_slot_leaves_silence() {
    let m = manifest(3, vec![clip(0, 3, 2, vec![0.1, 0.2])]);
    let out = mix_manifest(&m);
    assert_eq!(out, vec![0.1, 0.2, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn overlapping_clips_sum_and_clamp() {
    let m = manifest(
        1,
        vec![clip(0, 1, 2, vec![0.8, -0.8]), clip(0, 1, 2, vec![0.8, -0.8])],
    );
    assert_eq!(mix_manifest(&m), vec![1.0, -1.0]);
}

#[test]
fn write_mix_writes_little_endian_floats() {
    let dir = std::env::temp_dir().join(format!("shortreel-mix-{}", std::process::id()));
    let path = dir.join("mix.f32le");
    write_mix_to_f32le_file(&[1.0, -0.5], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), -0.5);
    let _ = std::fs::remove_dir_all(dir);
}
