use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0; 4], [0; 4]).is_err());
}

#[test]
fn container_from_out_path() {
    assert_eq!(FfmpegSinkOpts::new("a/b.webm").container, Container::Webm);
    assert_eq!(FfmpegSinkOpts::new("a/b.MP4").container, Container::Mp4);
    assert_eq!(FfmpegSinkOpts::new("a/b").container, Container::Mp4);
    assert_eq!(
        Container::Webm.suggested_file_name(),
        "youtube-shorts-video.webm"
    );
}

#[test]
fn begin_rejects_odd_sizes_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(
        std::env::temp_dir().join("shortreel-odd.mp4"),
    ));
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 4,
            fps: Fps::default(),
            audio: None,
        })
        .unwrap_err();
    assert!(err.is_user_input());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}
