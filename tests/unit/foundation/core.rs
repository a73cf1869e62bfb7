use super::*;

fn approx_rect(a: Rect, b: Rect) -> bool {
    let eps = 1e-9;
    (a.x0 - b.x0).abs() < eps
        && (a.y0 - b.y0).abs() < eps
        && (a.x1 - b.x1).abs() < eps
        && (a.y1 - b.y1).abs() < eps
}

#[test]
fn premul_scales_color_channels_by_alpha() {
    assert_eq!(
        Color::from_rgba8(255, 128, 0, 255).to_premul_rgba8(),
        [255, 128, 0, 255]
    );
    assert_eq!(Color::from_rgba8(255, 255, 255, 0).to_premul_rgba8(), [0, 0, 0, 0]);
    assert_eq!(
        Color::from_rgba8(200, 0, 0, 128).to_premul_rgba8(),
        [100, 0, 0, 128]
    );
}

#[test]
fn with_opacity_scales_and_clamps_alpha() {
    assert_eq!(Color::WHITE.with_opacity(0.5).a, 128);
    assert_eq!(Color::WHITE.with_opacity(2.0).a, 255);
    assert_eq!(Color::WHITE.with_opacity(-1.0).a, 0);
    assert_eq!(Color::WHITE.with_opacity(0.5).r, 255);
}

#[test]
fn round_out_snaps_outward() {
    assert_eq!(
        round_out(Rect::new(0.5, 1.2, 3.1, 4.0)),
        Rect::new(0.0, 1.0, 4.0, 4.0)
    );
    assert_eq!(
        round_out(Rect::new(-0.5, -1.5, 0.5, 1.5)),
        Rect::new(-1.0, -2.0, 1.0, 2.0)
    );
}

#[test]
fn map_rect_returns_axis_aligned_bounds() {
    assert_eq!(
        map_rect(Affine::scale(2.0), Rect::new(1.0, 1.0, 2.0, 3.0)),
        Rect::new(2.0, 2.0, 4.0, 6.0)
    );
    let rotated = map_rect(
        Affine::rotate(std::f64::consts::FRAC_PI_2),
        Rect::new(0.0, 0.0, 2.0, 1.0),
    );
    assert!(approx_rect(rotated, Rect::new(-1.0, 0.0, 0.0, 2.0)), "{rotated:?}");
}

#[test]
fn frame_size_emptiness_and_rect() {
    assert!(FrameSize::new(0, 10).is_empty());
    assert!(FrameSize::new(10, 0).is_empty());
    assert!(!FrameSize::new(1, 1).is_empty());
    assert_eq!(FrameSize::new(4, 3).to_rect(), Rect::new(0.0, 0.0, 4.0, 3.0));
}

#[test]
fn unique_ids_are_never_reused() {
    let a = next_unique_id();
    let b = next_unique_id();
    assert_ne!(a, b);
    assert!(b > a);
}
