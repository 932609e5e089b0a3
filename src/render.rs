//! Rendering: the four paint passes of the battle map.
//!
//! Each pass owns one surface and runs the same preamble: size the surface
//! to the viewport in device pixels, clear it under an identity transform,
//! then map world coordinates onto it with the camera transform. Passes read
//! the store and never mutate it.
//!
//! Fallible surface calls propagate [`SurfaceError`]. The caller
//! ([`crate::layers::LayerSet`]) logs the failure and moves on to the next pass.
//! The token pass is the exception: a token that fails to paint is logged and
//! skipped so the rest of the stack still shows.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Camera, Point, Rect, Viewport, apply_camera_transform};
use crate::color::darken;
use crate::config::EngineConfig;
use crate::consts::{
    GRID_MAJOR_STROKE, GRID_MINOR_STROKE, LABEL_FONT_WORLD, LABEL_GAP_PX, LABEL_MIN_FONT_PX, MAJOR_GRID_EVERY,
    MAX_GRID_LINES, RULER_COLOR, RULER_DASH_PX, RULER_DOT_RADIUS_PX, RULER_LABEL_FILL, RULER_LABEL_H_PX,
    RULER_LABEL_W_PX, SELECTED_TOKEN_STROKE, SELECTION_GLOW_PX, TOKEN_HIGHLIGHT_FILL, TOKEN_RIM_DARKEN_PERCENT,
    TOKEN_STROKE,
};
use crate::error::SurfaceError;
use crate::fog::paint_fog;
use crate::scene::{MapStore, Ruler, Token, TokenShape};
use crate::surface::{ColorStop, Paint, Surface};

/// Per-frame inputs shared by every pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub viewport: Viewport,
    pub config: &'a EngineConfig,
}

/// Size `surface` to the viewport and clear it.
///
/// # Errors
///
/// Returns `Err` if resetting the transform fails.
pub fn prepare_surface<S: Surface + ?Sized>(surface: &mut S, viewport: &Viewport) -> Result<(), SurfaceError> {
    let (w, h) = viewport.pixel_size();
    if surface.pixel_size() != (w, h) {
        surface.set_pixel_size(w, h);
    }
    surface.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    surface.clear_rect(0.0, 0.0, f64::from(w), f64::from(h));
    Ok(())
}

fn label_font(scale: f64) -> String {
    let px = LABEL_MIN_FONT_PX.max(LABEL_FONT_WORLD / scale);
    format!("bold {px}px sans-serif")
}

// =============================================================
// Background
// =============================================================

/// Paint the base color and the background image, if any.
///
/// The image is centered on the world origin and enlarged by
/// `config.background_image_scale`.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw_background<S, M>(surface: &mut S, store: &M, ctx: &RenderContext<'_>) -> Result<(), SurfaceError>
where
    S: Surface + ?Sized,
    M: MapStore + ?Sized,
{
    let vp = ctx.viewport;
    prepare_surface(surface, &vp)?;

    surface.set_transform(vp.dpr, 0.0, 0.0, vp.dpr, 0.0, 0.0)?;
    surface.set_fill(&Paint::solid(ctx.config.background_color.as_str()))?;
    surface.fill_rect(0.0, 0.0, vp.width, vp.height);

    if let Some(image) = store.background_image() {
        apply_camera_transform(surface, &store.camera(), &vp)?;
        let w = image.width * ctx.config.background_image_scale;
        let h = image.height * ctx.config.background_image_scale;
        surface.draw_image(image, -w / 2.0, -h / 2.0, w, h)?;
    }
    Ok(())
}

// =============================================================
// Grid
// =============================================================

/// One grid line at a world offset along its axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub at: f64,
    pub major: bool,
}

/// Grid lines covering a visible world rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLines {
    /// The visible rectangle snapped outward to whole cells; lines span it.
    pub bounds: Rect,
    /// Vertical lines, by x.
    pub xs: Vec<GridLine>,
    /// Horizontal lines, by y.
    pub ys: Vec<GridLine>,
    /// Too dense to draw every cell; only major lines were kept.
    pub majors_only: bool,
}

/// Enumerate grid lines covering `visible` for cells of `grid_size` world units.
///
/// Lines sit at whole multiples of `grid_size`; every fifth line counted from
/// the world origin is major. Past [`MAX_GRID_LINES`] per axis only the major
/// lines are kept. Returns `None` for a non-positive size or when even the
/// major lines would be too many.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn grid_lines(visible: Rect, grid_size: f64) -> Option<GridLines> {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return None;
    }
    let first_x = (visible.left / grid_size).floor() as i64;
    let last_x = (visible.right / grid_size).ceil() as i64;
    let first_y = (visible.top / grid_size).floor() as i64;
    let last_y = (visible.bottom / grid_size).ceil() as i64;
    let span = last_x.saturating_sub(first_x).max(last_y.saturating_sub(first_y));
    let majors_only = span > MAX_GRID_LINES;
    if majors_only && span / MAJOR_GRID_EVERY > MAX_GRID_LINES {
        return None;
    }

    let line = |i: i64| GridLine { at: i as f64 * grid_size, major: i.rem_euclid(MAJOR_GRID_EVERY) == 0 };
    let axis = |first: i64, last: i64| -> Vec<GridLine> {
        (first..=last).map(line).filter(|l| l.major || !majors_only).collect()
    };
    Some(GridLines {
        bounds: Rect {
            left: first_x as f64 * grid_size,
            top: first_y as f64 * grid_size,
            right: last_x as f64 * grid_size,
            bottom: last_y as f64 * grid_size,
        },
        xs: axis(first_x, last_x),
        ys: axis(first_y, last_y),
        majors_only,
    })
}

/// Paint the grid. A disabled grid leaves the surface cleared.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw_grid<S, M>(surface: &mut S, store: &M, ctx: &RenderContext<'_>) -> Result<(), SurfaceError>
where
    S: Surface + ?Sized,
    M: MapStore + ?Sized,
{
    prepare_surface(surface, &ctx.viewport)?;
    if !store.grid_enabled() {
        return Ok(());
    }
    let camera = store.camera();
    let Some(lines) = grid_lines(camera.visible_world_rect(&ctx.viewport), store.grid_size()) else {
        return Ok(());
    };
    apply_camera_transform(surface, &camera, &ctx.viewport)?;

    if !lines.majors_only {
        stroke_grid(surface, &lines, false, GRID_MINOR_STROKE, (0.5 / camera.scale).max(0.5));
    }
    stroke_grid(surface, &lines, true, GRID_MAJOR_STROKE, (1.0 / camera.scale).max(1.0));
    Ok(())
}

fn stroke_grid<S: Surface + ?Sized>(surface: &mut S, lines: &GridLines, major_only: bool, color: &str, width: f64) {
    let b = lines.bounds;
    surface.set_stroke_color(color);
    surface.set_line_width(width);
    surface.begin_path();
    for line in lines.xs.iter().filter(|l| l.major || !major_only) {
        surface.move_to(line.at, b.top);
        surface.line_to(line.at, b.bottom);
    }
    for line in lines.ys.iter().filter(|l| l.major || !major_only) {
        surface.move_to(b.left, line.at);
        surface.line_to(b.right, line.at);
    }
    surface.stroke();
}

// =============================================================
// Tokens
// =============================================================

/// Paint every token in list order, so later tokens cover earlier ones.
///
/// A token whose paint is rejected is logged and skipped; the rest still draw.
///
/// # Errors
///
/// Returns `Err` if the surface cannot be prepared or transformed.
pub fn draw_tokens<S, M>(surface: &mut S, store: &M, ctx: &RenderContext<'_>) -> Result<(), SurfaceError>
where
    S: Surface + ?Sized,
    M: MapStore + ?Sized,
{
    prepare_surface(surface, &ctx.viewport)?;
    let camera = store.camera();
    apply_camera_transform(surface, &camera, &ctx.viewport)?;
    let selected = store.selected_token_id();
    for token in store.tokens() {
        if let Err(e) = draw_token(surface, token, camera.scale, selected == Some(token.id.as_str())) {
            log::warn!("token {} skipped: {e}", token.id);
        }
    }
    Ok(())
}

fn draw_token<S: Surface + ?Sized>(surface: &mut S, token: &Token, scale: f64, selected: bool) -> Result<(), SurfaceError> {
    surface.save();
    let result = paint_token(surface, token, scale, selected);
    surface.restore();
    result
}

fn paint_token<S: Surface + ?Sized>(surface: &mut S, token: &Token, scale: f64, selected: bool) -> Result<(), SurfaceError> {
    let Token { x, y, size, .. } = *token;
    let half = size / 2.0;

    if selected {
        surface.set_shadow(SELECTED_TOKEN_STROKE, SELECTION_GLOW_PX / scale);
    }

    surface.set_fill(&Paint::Radial {
        x,
        y,
        r0: 0.0,
        r1: half.max(0.0),
        stops: vec![
            ColorStop::new(0.0, token.color.as_str()),
            ColorStop::new(1.0, darken(&token.color, TOKEN_RIM_DARKEN_PERCENT)),
        ],
    })?;
    surface.set_stroke_color(if selected { SELECTED_TOKEN_STROKE } else { TOKEN_STROKE });
    surface.set_line_width((3.0 / scale).max(2.0));

    match token.shape {
        TokenShape::Circle => {
            surface.begin_path();
            surface.circle(x, y, half.max(0.0))?;
            surface.fill();
            surface.stroke();
        }
        TokenShape::Square => {
            surface.fill_rect(x - half, y - half, size, size);
            surface.stroke_rect(x - half, y - half, size, size);
        }
    }

    // Highlight
    surface.set_fill(&Paint::solid(TOKEN_HIGHLIGHT_FILL))?;
    match token.shape {
        TokenShape::Circle => {
            surface.begin_path();
            surface.circle(x, y - size / 6.0, (size / 3.0).max(0.0))?;
            surface.fill();
        }
        TokenShape::Square => surface.fill_rect(x - size / 3.0, y - size / 3.0, size / 1.5, size / 4.0),
    }

    if !token.name.is_empty() {
        surface.set_fill(&Paint::solid("#ffffff"))?;
        surface.set_stroke_color("#000000");
        surface.set_line_width((2.0 / scale).max(2.0));
        surface.set_font(&label_font(scale));
        surface.set_text_align("center");
        surface.set_text_baseline("top");
        let label_y = y + half + LABEL_GAP_PX / scale;
        surface.stroke_text(&token.name, x, label_y)?;
        surface.fill_text(&token.name, x, label_y)?;
    }
    Ok(())
}

// =============================================================
// Overlay
// =============================================================

/// Paint fog (when enabled) and then the ruler.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw_overlay<S, M>(surface: &mut S, store: &M, ctx: &RenderContext<'_>) -> Result<(), SurfaceError>
where
    S: Surface + ?Sized,
    M: MapStore + ?Sized,
{
    prepare_surface(surface, &ctx.viewport)?;
    let camera = store.camera();
    apply_camera_transform(surface, &camera, &ctx.viewport)?;

    if store.fog_enabled() {
        let visible = camera.visible_world_rect(&ctx.viewport);
        paint_fog(surface, store.fog_reveals(), visible, ctx.config.fog_margin)?;
    }

    let ruler = store.ruler();
    if ruler.is_visible() {
        draw_ruler(surface, ruler, store.grid_size(), &camera, ctx.config.feet_per_square)?;
    }
    Ok(())
}

/// A ruler reading in grid squares and feet.
#[derive(Debug, Clone, PartialEq)]
pub struct RulerMeasurement {
    /// World distance between the endpoints.
    pub distance: f64,
    /// Distance in whole grid squares, rounded to nearest.
    pub squares: f64,
    pub feet: f64,
}

impl RulerMeasurement {
    /// Label text, e.g. `"15 ft"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ft", self.feet)
    }
}

/// Measure a ruler on a grid of `grid_size`, with each square worth `feet_per_square`.
///
/// `None` when an endpoint is missing or the grid size is not positive.
#[must_use]
pub fn ruler_measurement(ruler: &Ruler, grid_size: f64, feet_per_square: f64) -> Option<RulerMeasurement> {
    if grid_size <= 0.0 {
        return None;
    }
    let distance = ruler.distance()?;
    let squares = (distance / grid_size).round();
    Some(RulerMeasurement { distance, squares, feet: squares * feet_per_square })
}

fn draw_ruler<S: Surface + ?Sized>(
    surface: &mut S,
    ruler: &Ruler,
    grid_size: f64,
    camera: &Camera,
    feet_per_square: f64,
) -> Result<(), SurfaceError> {
    let Some((start, end)) = ruler.endpoints() else {
        return Ok(());
    };
    let measurement = ruler_measurement(ruler, grid_size, feet_per_square);
    surface.save();
    let result = paint_ruler(surface, (start, end), measurement.as_ref(), camera.scale);
    surface.restore();
    result
}

fn paint_ruler<S: Surface + ?Sized>(
    surface: &mut S,
    (start, end): (Point, Point),
    measurement: Option<&RulerMeasurement>,
    s: f64,
) -> Result<(), SurfaceError> {
    surface.set_shadow(RULER_COLOR, 10.0 / s);
    surface.set_stroke_color(RULER_COLOR);
    surface.set_line_width((3.0 / s).max(3.0));
    surface.set_line_dash(&RULER_DASH_PX.map(|px| px / s))?;
    surface.begin_path();
    surface.move_to(start.x, start.y);
    surface.line_to(end.x, end.y);
    surface.stroke();

    surface.set_shadow(RULER_COLOR, 0.0);
    surface.set_line_dash(&[])?;
    surface.set_fill(&Paint::solid(RULER_COLOR))?;
    for p in [start, end] {
        surface.begin_path();
        surface.circle(p.x, p.y, RULER_DOT_RADIUS_PX / s)?;
        surface.fill();
    }

    if let Some(measurement) = measurement {
        let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        surface.set_fill(&Paint::solid(RULER_LABEL_FILL))?;
        surface.fill_rect(
            mid.x - RULER_LABEL_W_PX / 2.0 / s,
            mid.y - 25.0 / s,
            RULER_LABEL_W_PX / s,
            RULER_LABEL_H_PX / s,
        );

        let text = measurement.label();
        surface.set_fill(&Paint::solid("#ffffff"))?;
        surface.set_stroke_color(RULER_COLOR);
        surface.set_line_width(1.0 / s);
        surface.set_font(&label_font(s));
        surface.set_text_align("center");
        surface.set_text_baseline("middle");
        surface.stroke_text(&text, mid.x, mid.y)?;
        surface.fill_text(&text, mid.x, mid.y)?;
    }
    Ok(())
}
