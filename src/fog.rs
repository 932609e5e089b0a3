//! Fog of war: an opaque layer with feathered discs cut out of it.
//!
//! Reveals are append-only and never merged. Each one erases the fog with a
//! radial alpha ramp, and overlapping reveals compound, so the remaining fog
//! opacity at a point is the product of what every reveal leaves behind.

#[cfg(test)]
#[path = "fog_test.rs"]
mod fog_test;

use crate::camera::{Point, Rect};
use crate::consts::FOG_REVEAL_FEATHER;
use crate::error::SurfaceError;
use crate::scene::FogReveal;
use crate::surface::{ColorStop, Composite, Paint, Surface};

/// Reveal strength at or above which a point counts as visible.
pub const REVEALED_THRESHOLD: f64 = 0.5;

/// Alpha ramp of a single reveal as `(offset, erase alpha)` stops along its radius.
const REVEAL_STOPS: [(f64, f64); 3] = [(0.0, 1.0), (0.8, 0.8), (1.0, 0.0)];

/// Paint the fog layer onto `surface`, whose transform already maps world coordinates.
///
/// The fog covers `visible` grown by `margin` even when there are no reveals.
///
/// # Errors
///
/// Returns `Err` if a surface call fails. The surface state is restored either way.
pub fn paint_fog<S: Surface + ?Sized>(
    surface: &mut S,
    reveals: &[FogReveal],
    visible: Rect,
    margin: f64,
) -> Result<(), SurfaceError> {
    surface.save();
    let result = paint_layers(surface, reveals, visible, margin);
    surface.restore();
    result
}

fn paint_layers<S: Surface + ?Sized>(
    surface: &mut S,
    reveals: &[FogReveal],
    visible: Rect,
    margin: f64,
) -> Result<(), SurfaceError> {
    surface.set_composite(Composite::SourceOver)?;
    surface.set_fill(&Paint::Linear {
        x0: visible.left,
        y0: visible.top,
        x1: visible.right,
        y1: visible.bottom,
        stops: vec![
            ColorStop::new(0.0, "rgba(0, 0, 0, 0.9)"),
            ColorStop::new(0.5, "rgba(0, 0, 0, 0.8)"),
            ColorStop::new(1.0, "rgba(0, 0, 0, 0.9)"),
        ],
    })?;
    let area = visible.expand(margin);
    surface.fill_rect(area.left, area.top, area.width(), area.height());

    surface.set_composite(Composite::DestinationOut)?;
    for reveal in reveals {
        surface.set_fill(&Paint::Radial {
            x: reveal.x,
            y: reveal.y,
            r0: 0.0,
            r1: reveal.radius,
            stops: REVEAL_STOPS
                .iter()
                .map(|&(offset, alpha)| ColorStop::new(offset, format!("rgba(0, 0, 0, {alpha})")))
                .collect(),
        })?;
        surface.begin_path();
        surface.circle(reveal.x, reveal.y, reveal.radius * FOG_REVEAL_FEATHER)?;
        surface.fill();
    }
    Ok(())
}

/// Erase alpha a single reveal applies at `point`, in `[0, 1]`.
#[must_use]
pub fn single_reveal_strength(reveal: &FogReveal, point: Point) -> f64 {
    if reveal.radius <= 0.0 {
        return 0.0;
    }
    let t = reveal.center().distance_to(point) / reveal.radius;
    let mut prev = REVEAL_STOPS[0];
    for &stop in &REVEAL_STOPS[1..] {
        if t <= stop.0 {
            let span = (t - prev.0) / (stop.0 - prev.0);
            return prev.1 + (stop.1 - prev.1) * span;
        }
        prev = stop;
    }
    0.0
}

/// Combined erase alpha of all reveals at `point`, in `[0, 1]`.
#[must_use]
pub fn reveal_strength(reveals: &[FogReveal], point: Point) -> f64 {
    let remaining: f64 = reveals
        .iter()
        .map(|r| 1.0 - single_reveal_strength(r, point))
        .product();
    1.0 - remaining
}

/// Whether `point` is cleared enough to see through the fog.
#[must_use]
pub fn is_revealed(reveals: &[FogReveal], point: Point) -> bool {
    reveal_strength(reveals, point) >= REVEALED_THRESHOLD
}

/// Fraction of `rect` that is revealed, sampled on a `samples × samples` grid of cell centers.
#[must_use]
pub fn revealed_fraction(reveals: &[FogReveal], rect: Rect, samples: u32) -> f64 {
    if samples == 0 {
        return 0.0;
    }
    let n = f64::from(samples);
    let step_x = rect.width() / n;
    let step_y = rect.height() / n;
    let mut hits = 0_u32;
    for row in 0..samples {
        for col in 0..samples {
            let p = Point::new(
                rect.left + (f64::from(col) + 0.5) * step_x,
                rect.top + (f64::from(row) + 0.5) * step_y,
            );
            if is_revealed(reveals, p) {
                hits += 1;
            }
        }
    }
    f64::from(hits) / (n * n)
}
