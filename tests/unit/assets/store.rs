use std::io::Cursor;

use super::*;
use crate::assets::source::import_image_bytes;
use crate::project::state::Action;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([0, 255, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn project_with_images(images: Vec<ImageRef>) -> ProjectState {
    ProjectState::default()
        .reduce(Action::SetScript("a\nb\nc".to_owned()))
        .unwrap()
        .reduce(Action::SplitScript)
        .unwrap()
        .reduce(Action::AssignImages(images))
        .unwrap()
}

#[test]
fn asset_ids_follow_source_identity() {
    let a = ImageSource::Path(PathBuf::from("a.png"));
    let b = ImageSource::DataUrl("a.png".to_owned());
    assert_eq!(AssetId::for_source(&a), AssetId::for_source(&a.clone()));
    assert_ne!(AssetId::for_source(&a), AssetId::for_source(&b));
}

#[test]
fn prepare_decodes_and_dedupes() {
    let red = import_image_bytes(&png(4, 2), Some("a.png")).unwrap();
    let blue = import_image_bytes(&png(2, 8), Some("b.png")).unwrap();
    let mut state = project_with_images(vec![red.clone(), blue.clone(), red.clone()]);
    state.background = Some(blue.clone());

    let store = PreparedAssetStore::prepare(&state, ".").unwrap();
    assert_eq!(store.len(), 2);
    let (_, img) = store.image_for(&blue).unwrap();
    assert_eq!((img.width, img.height), (2, 8));
    let (id, _) = store.image_for(&red).unwrap();
    assert!(store.image(id).is_ok());
    assert!(store.image(AssetId(1)).is_err());
}

#[test]
fn prepare_is_all_or_nothing() {
    let ok = import_image_bytes(&png(1, 1), None).unwrap();
    let broken = ImageRef::path("missing/nowhere.png");
    let state = project_with_images(vec![ok, broken]);
    let err = PreparedAssetStore::prepare(&state, "/nonexistent-root").unwrap_err();
    assert!(matches!(err, ShortreelError::Asset(_)));
    assert!(err.to_string().contains("nowhere.png"));
}

#[test]
fn empty_project_prepares_empty_store() {
    let store = PreparedAssetStore::prepare(&ProjectState::default(), ".").unwrap();
    assert!(store.is_empty());
    assert_eq!(store.root(), Path::new("."));
}
