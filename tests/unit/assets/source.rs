use std::io::Cursor;

use super::*;

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../a.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn resolve_keeps_absolute_paths() {
    let root = Path::new("/project");
    let abs = std::env::temp_dir().join("x.png");
    assert_eq!(resolve_path(&abs, root).unwrap(), abs);
    assert_eq!(
        resolve_path(Path::new("img/x.png"), root).unwrap(),
        root.join("img/x.png")
    );
}

#[test]
fn import_produces_decodable_data_url() {
    let bytes = png_bytes();
    let img = import_image_bytes(&bytes, Some("red.png")).unwrap();
    assert_eq!(img.name.as_deref(), Some("red.png"));
    let ImageSource::DataUrl(url) = &img.source else {
        panic!("expected data URL");
    };
    assert!(url.starts_with("data:image/png;base64,"));
    let (mime, decoded) = decode_data_url(url).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(decoded, bytes);
    assert_eq!(read_image_bytes(&img.source, Path::new(".")).unwrap(), bytes);
}

#[test]
fn import_rejects_unknown_bytes() {
    assert!(import_image_bytes(b"hello", None).is_err());
}

#[test]
fn malformed_data_urls_are_asset_errors() {
    assert!(decode_data_url("image/png;base64,AAAA").is_err());
    assert!(decode_data_url("data:image/png;base64").is_err());
    assert!(decode_data_url("data:text/plain,hello").is_err());
    assert!(decode_data_url("data:image/png;base64,@@@").is_err());
}

#[test]
fn missing_file_is_an_error() {
    let src = ImageSource::Path(PathBuf::from("definitely/missing.png"));
    assert!(read_image_bytes(&src, Path::new("/nonexistent-root")).is_err());
}

#[test]
fn audio_inputs_resolve_like_image_paths() {
    let root = Path::new("/projects/demo");
    assert_eq!(
        resolve_audio_input("speech/a.wav", root).unwrap(),
        root.join("speech/a.wav").to_string_lossy()
    );
    assert_eq!(resolve_audio_input("/tmp/b.wav", root).unwrap(), "/tmp/b.wav");
    assert_eq!(
        resolve_audio_input("https://cdn.example/c.wav", root).unwrap(),
        "https://cdn.example/c.wav"
    );
    assert!(resolve_audio_input("../c.wav", root).is_err());
}
