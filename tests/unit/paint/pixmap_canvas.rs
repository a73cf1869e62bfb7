use super::*;
use crate::foundation::core::Vec2;

#[test]
fn rejects_empty_and_oversized_targets() {
    assert!(PixmapCanvas::new(0, 4).is_err());
    assert!(PixmapCanvas::new(4, 0).is_err());
    assert!(PixmapCanvas::new(70_000, 1).is_err());
    let c = PixmapCanvas::new(3, 2).unwrap();
    assert_eq!(c.size(), FrameSize::new(3, 2));
}

#[test]
fn starts_transparent() {
    let mut c = PixmapCanvas::new(4, 4).unwrap();
    let frame = c.snapshot();
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 4 * 4 * 4);
    assert!(frame.data.iter().all(|&b| b == 0));
    assert_eq!(frame.pixel(4, 0), None);
}

#[test]
fn clear_fills_whole_target_ignoring_transform() {
    let mut c = PixmapCanvas::new(4, 4).unwrap();
    c.translate(Vec2::new(10.0, 10.0));
    c.clear(Color::WHITE);
    let frame = c.snapshot();
    assert_eq!(frame.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(3, 3), Some([255, 255, 255, 255]));
}

#[test]
fn fill_rect_honors_transform() {
    let mut c = PixmapCanvas::new(8, 8).unwrap();
    c.save();
    c.translate(Vec2::new(4.0, 0.0));
    c.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::from_rgba8(0, 255, 0, 255));
    c.restore();
    assert_eq!(c.transform(), Affine::IDENTITY);
    let frame = c.snapshot();
    assert_eq!(frame.pixel(5, 1), Some([0, 255, 0, 255]));
    assert_eq!(frame.pixel(1, 1), Some([0, 0, 0, 0]));
}

#[test]
fn restore_past_first_save_is_ignored() {
    let mut c = PixmapCanvas::new(2, 2).unwrap();
    c.translate(Vec2::new(1.0, 1.0));
    c.restore();
    assert_eq!(c.save_count(), 0);
    assert_eq!(c.transform(), Affine::translate((1.0, 1.0)));
}

#[test]
fn opacity_group_scales_alpha() {
    let mut c = PixmapCanvas::new(4, 4).unwrap();
    c.push_opacity(0.5);
    c.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::WHITE);
    c.pop_opacity();
    let [_, _, _, a] = c.snapshot().pixel(1, 1).unwrap();
    assert!((i32::from(a) - 128).abs() <= 2, "alpha {a}");
}

#[test]
fn draw_image_places_pixels_at_origin() {
    let img = RasterImage::solid(4, 4, [0, 0, 255, 255]).unwrap();
    let mut c = PixmapCanvas::new(8, 8).unwrap();
    c.draw_image(&img, Point::new(2.0, 2.0));
    let frame = c.snapshot();
    let [r, g, b, a] = frame.pixel(3, 3).unwrap();
    assert!(r < 5 && g < 5 && b > 250 && a > 250, "{:?}", [r, g, b, a]);
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(7, 7), Some([0, 0, 0, 0]));
}

#[test]
fn into_image_keeps_dimensions_and_pixels() {
    let mut c = PixmapCanvas::new(3, 2).unwrap();
    c.clear(Color::BLACK);
    let img = c.into_image();
    assert_eq!((img.width(), img.height()), (3, 2));
    assert_eq!(img.byte_size(), 3 * 2 * 4);
    assert_eq!(&img.data()[..4], &[0, 0, 0, 255]);
}
