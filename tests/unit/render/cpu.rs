use std::io::Cursor;

use kurbo::{Point, Rect};

use super::*;
use crate::assets::source::import_image_bytes;
use crate::compose::plan::Outline;
use crate::foundation::core::Canvas;
use crate::timeline::Phase;

fn plan(ops: Vec<DrawOp>) -> FramePlan {
    FramePlan {
        canvas: Canvas {
            width: 64,
            height: 32,
        },
        t: 0.0,
        phase: Phase::Thumbnail,
        ops,
    }
}

fn store_with_red_png() -> (PreparedAssetStore, AssetId) {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    let img = import_image_bytes(&buf, None).unwrap();
    let mut store = PreparedAssetStore::new(".");
    store.load_all([&img]).unwrap();
    let (id, _) = store.image_for(&img).unwrap();
    (store, id)
}

#[test]
fn fill_covers_canvas() {
    let mut be = CpuBackend::new(CpuBackendOpts::default());
    let frame = be
        .render_plan(
            &plan(vec![DrawOp::Fill(Color::rgb(0, 0, 255))]),
            &PreparedAssetStore::default(),
        )
        .unwrap();
    assert_eq!((frame.width, frame.height), (64, 32));
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(63, 31), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(64, 0), None);
}

#[test]
fn image_is_scaled_into_dest() {
    let (store, id) = store_with_red_png();
    let mut be = CpuBackend::new(CpuBackendOpts::default());
    let frame = be
        .render_plan(
            &plan(vec![
                DrawOp::Fill(Color::BLACK),
                DrawOp::Image {
                    asset: id,
                    dest: Rect::new(16.0, 8.0, 48.0, 24.0),
                },
            ]),
            &store,
        )
        .unwrap();
    let center = frame.pixel(32, 16).unwrap();
    assert!(center[0] > 200 && center[1] < 40);
    assert_eq!(frame.pixel(2, 2), Some([0, 0, 0, 255]));
}

#[test]
fn unknown_image_fails() {
    let mut be = CpuBackend::new(CpuBackendOpts::default());
    let err = be.render_plan(
        &plan(vec![DrawOp::Image {
            asset: AssetId(42),
            dest: Rect::new(0.0, 0.0, 1.0, 1.0),
        }]),
        &PreparedAssetStore::default(),
    );
    assert!(err.is_err());
}

fn text_plan(outline: Option<Outline>) -> FramePlan {
    plan(vec![
        DrawOp::Fill(Color::rgb(0, 0, 255)),
        DrawOp::Text(TextBlock {
            lines: vec![PlacedLine {
                text: "WW".to_owned(),
                origin: Point::new(8.0, 0.0),
                width: 48.0,
                height: 32.0,
            }],
            size_px: 28.0,
            fill: Color::WHITE,
            outline,
        }),
    ])
}

#[test]
fn text_without_font_is_an_error() {
    let mut be = CpuBackend::new(CpuBackendOpts::default());
    assert!(
        be.render_plan(&text_plan(None), &PreparedAssetStore::default())
            .is_err()
    );
}

#[test]
fn text_draws_fill_and_outline() {
    let font = match PreparedFont::system_bold_sans() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("skipping: {e}");
            return;
        }
    };
    let mut be = CpuBackend::new(CpuBackendOpts::default().with_font(font));
    let assets = PreparedAssetStore::default();

    let frame = be.render_plan(&text_plan(None), &assets).unwrap();
    let whiteish = |px: [u8; 4]| px[0] > 200 && px[1] > 200;
    let count = |f: &FrameRGBA, pred: &dyn Fn([u8; 4]) -> bool| {
        f.data
            .chunks_exact(4)
            .filter(|px| pred([px[0], px[1], px[2], px[3]]))
            .count()
    };
    assert!(count(&frame, &whiteish) > 0);

    let outlined = be
        .render_plan(
            &text_plan(Some(Outline {
                color: Color::BLACK,
                width_px: 3.0,
            })),
            &assets,
        )
        .unwrap();
    let darkish = |px: [u8; 4]| px[0] < 40 && px[1] < 40 && px[2] < 40;
    assert_eq!(count(&frame, &darkish), 0);
    assert!(count(&outlined, &darkish) > 0);
    assert!(count(&outlined, &whiteish) > 0);
}
