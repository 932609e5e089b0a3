#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::support::{Op, RecordingSurface};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn vp() -> Viewport {
    Viewport::new(800.0, 600.0, 1.0)
}

// --- Point ---

#[test]
fn point_distance() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);
    assert!(approx_eq(a.distance_to(b), 5.0));
    assert!(approx_eq(b.distance_to(a), 5.0));
}

#[test]
fn point_serde_shape() {
    let p = Point::new(1.5, -2.0);
    let json = serde_json::to_value(p).unwrap();
    assert_eq!(json, serde_json::json!({ "x": 1.5, "y": -2.0 }));
}

// --- Viewport ---

#[test]
fn viewport_center_is_half_size() {
    assert_eq!(vp().center(), Point::new(400.0, 300.0));
}

#[test]
fn viewport_pixel_size_scales_by_dpr() {
    let v = Viewport::new(800.0, 600.0, 2.0);
    assert_eq!(v.pixel_size(), (1600, 1200));
}

#[test]
fn viewport_pixel_size_rounds_fractional_dpr() {
    let v = Viewport::new(101.0, 51.0, 1.5);
    assert_eq!(v.pixel_size(), (152, 77));
}

#[test]
fn viewport_default_is_empty_with_unit_dpr() {
    let v = Viewport::default();
    assert_eq!(v.pixel_size(), (0, 0));
    assert_eq!(v.dpr, 1.0);
}

// --- Camera defaults ---

#[test]
fn camera_default_is_origin_unit_scale() {
    let cam = Camera::default();
    assert_eq!(cam, Camera::new(0.0, 0.0, 1.0));
}

#[test]
fn camera_serde_uses_field_names() {
    let cam: Camera = serde_json::from_str(r#"{"x":10,"y":-5,"scale":2}"#).unwrap();
    assert_eq!(cam, Camera::new(10.0, -5.0, 2.0));
}

// --- Conversions ---

#[test]
fn identity_camera_maps_center_to_origin() {
    let cam = Camera::default();
    let w = cam.screen_to_world(Point::new(400.0, 300.0), &vp());
    assert!(point_approx_eq(w, Point::new(0.0, 0.0)));
}

#[test]
fn screen_to_world_at_scale_two() {
    let cam = Camera::new(100.0, 50.0, 2.0);
    let w = cam.screen_to_world(Point::new(500.0, 300.0), &vp());
    assert!(point_approx_eq(w, Point::new(150.0, 50.0)));
}

#[test]
fn world_to_screen_inverts_screen_to_world() {
    let cam = Camera::new(-37.5, 212.25, 0.7);
    for p in [Point::new(0.0, 0.0), Point::new(123.0, 456.0), Point::new(799.0, 1.0)] {
        let back = cam.world_to_screen(cam.screen_to_world(p, &vp()), &vp());
        assert!(point_approx_eq(back, p));
    }
}

#[test]
fn camera_position_appears_at_viewport_center() {
    let cam = Camera::new(321.0, -45.0, 3.3);
    let s = cam.world_to_screen(cam.position(), &vp());
    assert!(point_approx_eq(s, vp().center()));
}

#[test]
fn screen_dist_scales_inversely() {
    let cam = Camera::new(0.0, 0.0, 4.0);
    assert!(approx_eq(cam.screen_dist_to_world(20.0), 5.0));
}

#[test]
fn visible_rect_at_unit_scale() {
    let rect = Camera::default().visible_world_rect(&vp());
    assert_eq!(rect, Rect { left: -400.0, top: -300.0, right: 400.0, bottom: 300.0 });
    assert!(approx_eq(rect.width(), 800.0));
    assert!(approx_eq(rect.height(), 600.0));
}

#[test]
fn visible_rect_shrinks_when_zoomed_in() {
    let rect = Camera::new(100.0, 100.0, 2.0).visible_world_rect(&vp());
    assert!(approx_eq(rect.left, -100.0));
    assert!(approx_eq(rect.right, 300.0));
    assert!(approx_eq(rect.top, -50.0));
    assert!(approx_eq(rect.bottom, 250.0));
}

#[test]
fn rect_expand_grows_every_side() {
    let r = Rect { left: 0.0, top: 0.0, right: 10.0, bottom: 20.0 }.expand(5.0);
    assert_eq!(r, Rect { left: -5.0, top: -5.0, right: 15.0, bottom: 25.0 });
}

// --- Pan ---

#[test]
fn pan_moves_camera_opposite_to_drag() {
    let cam = Camera::new(0.0, 0.0, 1.0).panned_by_screen_delta(10.0, -20.0);
    assert_eq!(cam, Camera::new(-10.0, 20.0, 1.0));
}

#[test]
fn pan_delta_divided_by_scale() {
    let cam = Camera::new(0.0, 0.0, 2.0).panned_by_screen_delta(10.0, 10.0);
    assert!(approx_eq(cam.x, -5.0));
    assert!(approx_eq(cam.y, -5.0));
    assert_eq!(cam.scale, 2.0);
}

#[test]
fn pan_keeps_grabbed_world_point_under_pointer() {
    let cam = Camera::new(40.0, -10.0, 1.5);
    let grab = Point::new(250.0, 180.0);
    let world = cam.screen_to_world(grab, &vp());
    let moved = cam.panned_by_screen_delta(33.0, -12.0);
    let after = moved.world_to_screen(world, &vp());
    assert!(point_approx_eq(after, Point::new(283.0, 168.0)));
}

// --- Zoom ---

#[test]
fn zoom_in_at_center_keeps_position() {
    let cam = Camera::default();
    let anchor = cam.screen_to_world(vp().center(), &vp());
    let z = cam.zoomed_at(anchor, 1.1, 0.1, 5.0);
    assert!(approx_eq(z.scale, 1.1));
    assert!(approx_eq(z.x, 0.0));
    assert!(approx_eq(z.y, 0.0));
}

#[test]
fn zoom_keeps_anchor_under_cursor() {
    let cam = Camera::new(120.0, -80.0, 1.3);
    let cursor = Point::new(640.0, 90.0);
    let anchor = cam.screen_to_world(cursor, &vp());
    for factor in [1.1, 0.9, 1.1 * 1.1, 0.5] {
        let z = cam.zoomed_at(anchor, factor, 0.1, 5.0);
        let back = z.world_to_screen(anchor, &vp());
        assert!(point_approx_eq(back, cursor), "factor {factor}: {back:?}");
    }
}

#[test]
fn zoom_clamps_to_max() {
    let cam = Camera::new(0.0, 0.0, 4.8);
    let z = cam.zoomed_at(Point::new(10.0, 10.0), 1.1, 0.1, 5.0);
    assert_eq!(z.scale, 5.0);
}

#[test]
fn zoom_clamps_to_min() {
    let cam = Camera::new(0.0, 0.0, 0.105);
    let z = cam.zoomed_at(Point::new(10.0, 10.0), 0.9, 0.1, 5.0);
    assert_eq!(z.scale, 0.1);
}

#[test]
fn zoom_at_limit_leaves_camera_still() {
    let cam = Camera::new(25.0, 75.0, 5.0);
    let z = cam.zoomed_at(Point::new(300.0, -200.0), 1.1, 0.1, 5.0);
    assert!(approx_eq(z.x, 25.0));
    assert!(approx_eq(z.y, 75.0));
    assert_eq!(z.scale, 5.0);
}

#[test]
fn clamped_zoom_still_keeps_anchor_fixed() {
    let cam = Camera::new(0.0, 0.0, 4.9);
    let cursor = Point::new(100.0, 500.0);
    let anchor = cam.screen_to_world(cursor, &vp());
    let z = cam.zoomed_at(anchor, 1.1, 0.1, 5.0);
    assert!(point_approx_eq(z.world_to_screen(anchor, &vp()), cursor));
}

#[test]
fn repeated_zoom_stays_within_bounds() {
    let mut cam = Camera::default();
    for _ in 0..100 {
        cam = cam.zoomed_at(Point::new(7.0, 3.0), 1.1, 0.1, 5.0);
    }
    assert_eq!(cam.scale, 5.0);
    for _ in 0..200 {
        cam = cam.zoomed_at(Point::new(7.0, 3.0), 0.9, 0.1, 5.0);
    }
    assert_eq!(cam.scale, 0.1);
}

// --- Surface transform ---

#[test]
fn camera_transform_issues_dpr_then_center_then_scale() {
    let mut s = RecordingSurface::new();
    let v = Viewport::new(800.0, 600.0, 2.0);
    apply_camera_transform(&mut s, &Camera::new(10.0, 20.0, 1.5), &v).unwrap();
    assert_eq!(
        s.ops,
        vec![
            Op::SetTransform([2.0, 0.0, 0.0, 2.0, 0.0, 0.0]),
            Op::Translate(400.0, 300.0),
            Op::Scale(1.5, 1.5),
            Op::Translate(-10.0, -20.0),
        ]
    );
}

#[test]
fn camera_transform_matches_world_to_screen() {
    let mut s = RecordingSurface::new();
    let v = Viewport::new(800.0, 600.0, 2.0);
    let cam = Camera::new(-55.0, 31.0, 0.8);
    apply_camera_transform(&mut s, &cam, &v).unwrap();
    let world = Point::new(12.0, -99.0);
    let css = cam.world_to_screen(world, &v);
    let device = s.to_device(world);
    assert!(point_approx_eq(device, Point::new(css.x * 2.0, css.y * 2.0)));
}

#[test]
fn camera_transform_propagates_surface_error() {
    let mut s = RecordingSurface::failing();
    let err = apply_camera_transform(&mut s, &Camera::default(), &vp()).unwrap_err();
    assert!(err.to_string().contains("surface call failed"));
}
