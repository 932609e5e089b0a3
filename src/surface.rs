//! Drawing surfaces: the 2D operations the layer renderer issues.
//!
//! [`Surface`] mirrors the subset of the Canvas2D API the battle map needs.
//! [`CanvasSurface`] implements it over a browser `<canvas>` element; tests
//! implement it with a recorder so draw order and transforms can be asserted
//! without a browser.
//!
//! All fallible calls return [`SurfaceError`], converted from the `JsValue`
//! the browser throws.

use std::rc::Rc;

use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::error::{MountError, SurfaceError};
use crate::image_cache::ImageCache;
use crate::scene::BackgroundImage;

/// Canvas compositing modes used by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Normal painting.
    SourceOver,
    /// Erase destination pixels where the source is opaque.
    DestinationOut,
}

impl Composite {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::DestinationOut => "destination-out",
        }
    }
}

/// One color stop of a gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

impl ColorStop {
    #[must_use]
    pub fn new(offset: f64, color: impl Into<String>) -> Self {
        Self { offset, color: color.into() }
    }
}

/// Fill style: a flat color or a gradient in the current coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(String),
    Linear { x0: f64, y0: f64, x1: f64, y1: f64, stops: Vec<ColorStop> },
    Radial { x: f64, y: f64, r0: f64, r1: f64, stops: Vec<ColorStop> },
}

impl Paint {
    #[must_use]
    pub fn solid(color: impl Into<String>) -> Self {
        Self::Solid(color.into())
    }
}

/// A 2D drawing target with its own transform and style state.
pub trait Surface {
    /// Backing-store size in device pixels.
    fn pixel_size(&self) -> (u32, u32);
    /// Resize the backing store. Resizing clears the surface.
    fn set_pixel_size(&mut self, width: u32, height: u32);

    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), SurfaceError>;
    fn translate(&mut self, x: f64, y: f64) -> Result<(), SurfaceError>;
    fn scale(&mut self, x: f64, y: f64) -> Result<(), SurfaceError>;
    fn save(&mut self);
    fn restore(&mut self);

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn set_fill(&mut self, paint: &Paint) -> Result<(), SurfaceError>;
    fn set_stroke_color(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError>;
    fn set_shadow(&mut self, color: &str, blur: f64);
    fn set_composite(&mut self, mode: Composite) -> Result<(), SurfaceError>;

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Add a full circle to the current path.
    fn circle(&mut self, x: f64, y: f64, radius: f64) -> Result<(), SurfaceError>;
    fn fill(&mut self);
    fn stroke(&mut self);

    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError>;
    fn stroke_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError>;

    /// Draw a background image scaled into the given world rectangle.
    fn draw_image(&mut self, image: &BackgroundImage, x: f64, y: f64, w: f64, h: f64) -> Result<(), SurfaceError>;
}

// =============================================================
// Browser canvas
// =============================================================

/// A decoded `<img>` plus the load callback that keeps it alive.
struct DecodedImage {
    element: HtmlImageElement,
    _onload: Option<Closure<dyn FnMut()>>,
}

/// [`Surface`] over a browser `<canvas>` element.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: ImageCache<DecodedImage>,
    on_image_load: Option<Rc<dyn Fn()>>,
}

impl CanvasSurface {
    /// Wrap a canvas element, acquiring its 2D context.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::NoContext`] if the element has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, MountError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(MountError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| MountError::NoContext)?;
        Ok(Self { canvas, ctx, images: ImageCache::new(), on_image_load: None })
    }

    /// Callback invoked when a newly decoded image finishes loading.
    ///
    /// The first paint of a fresh image happens before the browser has the
    /// pixels; the host uses this to schedule another redraw.
    pub fn set_on_image_load(&mut self, callback: Rc<dyn Fn()>) {
        self.on_image_load = Some(callback);
    }

    /// The underlying canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn decode(source: &str, on_load: Option<&Rc<dyn Fn()>>) -> Result<DecodedImage, SurfaceError> {
        let element = HtmlImageElement::new()?;
        let onload = on_load.map(|callback| {
            let callback = Rc::clone(callback);
            Closure::wrap(Box::new(move || callback()) as Box<dyn FnMut()>)
        });
        if let Some(closure) = &onload {
            element.set_onload(Some(closure.as_ref().unchecked_ref()));
        }
        element.set_src(source);
        log::debug!("decoding background image ({} bytes of source)", source.len());
        Ok(DecodedImage { element, _onload: onload })
    }
}

impl Surface for CanvasSurface {
    fn pixel_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_pixel_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<(), SurfaceError> {
        Ok(self.ctx.set_transform(a, b, c, d, e, f)?)
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), SurfaceError> {
        Ok(self.ctx.translate(x, y)?)
    }

    fn scale(&mut self, x: f64, y: f64) -> Result<(), SurfaceError> {
        Ok(self.ctx.scale(x, y)?)
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.clear_rect(x, y, w, h);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn set_fill(&mut self, paint: &Paint) -> Result<(), SurfaceError> {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(color),
            Paint::Linear { x0, y0, x1, y1, stops } => {
                let gradient = self.ctx.create_linear_gradient(*x0, *y0, *x1, *y1);
                for stop in stops {
                    gradient.add_color_stop(stop.offset as f32, &stop.color)?;
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
            Paint::Radial { x, y, r0, r1, stops } => {
                let gradient = self.ctx.create_radial_gradient(*x, *y, *r0, *x, *y, *r1)?;
                for stop in stops {
                    gradient.add_color_stop(stop.offset as f32, &stop.color)?;
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
        Ok(())
    }

    fn set_stroke_color(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), SurfaceError> {
        let dash_array = js_sys::Array::new();
        for segment in segments {
            dash_array.push(&(*segment).into());
        }
        Ok(self.ctx.set_line_dash(&dash_array)?)
    }

    fn set_shadow(&mut self, color: &str, blur: f64) {
        self.ctx.set_shadow_color(color);
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_shadow_offset_x(0.0);
        self.ctx.set_shadow_offset_y(0.0);
    }

    fn set_composite(&mut self, mode: Composite) -> Result<(), SurfaceError> {
        Ok(self.ctx.set_global_composite_operation(mode.as_str())?)
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn circle(&mut self, x: f64, y: f64, radius: f64) -> Result<(), SurfaceError> {
        Ok(self.ctx.arc(x, y, radius, 0.0, std::f64::consts::TAU)?)
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn set_text_align(&mut self, align: &str) {
        self.ctx.set_text_align(align);
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ctx.set_text_baseline(baseline);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        Ok(self.ctx.fill_text(text, x, y)?)
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), SurfaceError> {
        Ok(self.ctx.stroke_text(text, x, y)?)
    }

    fn draw_image(&mut self, image: &BackgroundImage, x: f64, y: f64, w: f64, h: f64) -> Result<(), SurfaceError> {
        let on_load = self.on_image_load.clone();
        let decoded = self
            .images
            .get_or_decode(&image.data_url, |source| Self::decode(source, on_load.as_ref()))?;
        Ok(self
            .ctx
            .draw_image_with_html_image_element_and_dw_and_dh(&decoded.element, x, y, w, h)?)
    }
}
