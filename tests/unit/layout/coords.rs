use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn to_pixel_is_linear() {
    let p = to_pixel(PctPoint::new(50.0, 75.0), Size::new(1080.0, 1920.0));
    assert_eq!(p, Point::new(540.0, 1440.0));
    assert_eq!(to_pixel(PctPoint::new(0.0, 100.0), Size::new(10.0, 20.0)), Point::new(0.0, 20.0));
}

#[test]
fn contain_wide_image_clamps_width() {
    let s = fit_contain(Size::new(1600.0, 900.0), Size::new(150.0, 100.0), 1.0).unwrap();
    assert!(approx(s.width, 150.0));
    assert!(approx(s.height, 150.0 * 900.0 / 1600.0));
}

#[test]
fn contain_tall_image_clamps_height() {
    let s = fit_contain(Size::new(500.0, 1000.0), Size::new(150.0, 100.0), 2.0).unwrap();
    assert!(approx(s.height, 200.0));
    assert!(approx(s.width, 100.0));
}

#[test]
fn contain_rejects_degenerate_inputs() {
    assert!(fit_contain(Size::new(0.0, 10.0), Size::new(1.0, 1.0), 1.0).is_none());
    assert!(fit_contain(Size::new(10.0, 10.0), Size::new(1.0, 1.0), 0.0).is_none());
    assert!(fit_contain(Size::new(10.0, f64::NAN), Size::new(1.0, 1.0), 1.0).is_none());
}

#[test]
fn contain_properties_over_grid() {
    let naturals = [(1.0, 1.0), (640.0, 480.0), (300.0, 1200.0), (7.0, 3.0)];
    let bases = [(150.0, 100.0), (100.0, 150.0), (50.0, 50.0)];
    let scales = [0.5, 1.0, 1.5, 2.0];
    for (nw, nh) in naturals {
        for (bw, bh) in bases {
            for scale in scales {
                let s = fit_contain(Size::new(nw, nh), Size::new(bw, bh), scale).unwrap();
                assert!((s.width / s.height - nw / nh).abs() < 1e-9);
                assert!(s.width <= bw * scale + 1e-9);
                assert!(s.height <= bh * scale + 1e-9);
                assert!(approx(s.width, bw * scale) || approx(s.height, bh * scale));
            }
        }
    }
}

#[test]
fn output_mapper_scales_preview_lengths() {
    let settings = ProjectSettings::default();
    let m = CoordinateMapper::for_output(&settings).unwrap();
    assert_eq!(m.surface(), Size::new(1080.0, 1920.0));
    assert_eq!(m.preview_scale(), 3.0);
    assert_eq!(m.scale_len(24.0), 72.0);
    assert_eq!(m.base_size(), Size::new(450.0, 300.0));
}

#[test]
fn preview_and_output_place_images_identically_in_percent() {
    let settings = ProjectSettings::default();
    let out = CoordinateMapper::for_output(&settings).unwrap();
    let preview = CoordinateMapper::for_preview(&settings).unwrap();
    assert_eq!(preview.surface(), Size::new(360.0, 640.0));

    let placement = ImagePlacement::new(30.0, 60.0, 1.5);
    let natural = Size::new(800.0, 600.0);
    let a = out.place_image(natural, placement).unwrap();
    let b = preview.place_image(natural, placement).unwrap();
    assert!(approx(a.x0 / 1080.0, b.x0 / 360.0));
    assert!(approx(a.y0 / 1920.0, b.y0 / 640.0));
    assert!(approx(a.width() / 3.0, b.width()));
    assert_eq!(a.center(), out.to_pixel(placement.anchor()));
}

#[test]
fn percent_roundtrip() {
    let m = CoordinateMapper::for_output(&ProjectSettings::default()).unwrap();
    let pct = PctPoint::new(12.5, 80.0);
    let back = m.to_percent(m.to_pixel(pct));
    assert!(approx(back.x, pct.x) && approx(back.y, pct.y));
}

#[test]
fn mapper_validates_settings() {
    let settings = ProjectSettings {
        preview_height: 0.0,
        ..ProjectSettings::default()
    };
    assert!(CoordinateMapper::for_output(&settings).is_err());
    assert!(CoordinateMapper::new(Size::new(1.0, 1.0), 1.0, Size::ZERO).is_err());
}
