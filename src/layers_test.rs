use super::*;
use crate::config::EngineConfig;
use crate::scene::SceneStore;
use crate::support::{Op, RecordingSurface};

fn ctx(config: &EngineConfig) -> RenderContext<'_> {
    RenderContext { viewport: Viewport::new(200.0, 100.0, 2.0), config }
}

fn full_set() -> LayerSet<RecordingSurface> {
    LayerSet::with_surfaces(
        RecordingSurface::new(),
        RecordingSurface::new(),
        RecordingSurface::new(),
        RecordingSurface::new(),
    )
}

#[test]
fn layer_order_is_bottom_to_top() {
    let names: Vec<&str> = Layer::ALL.iter().map(|l| l.name()).collect();
    assert_eq!(names, ["background", "grid", "tokens", "overlay"]);
}

#[test]
fn empty_set_renders_nothing() {
    let cfg = EngineConfig::default();
    let mut layers: LayerSet<RecordingSurface> = LayerSet::new();
    for layer in Layer::ALL {
        assert!(!layers.render_layer(layer, &SceneStore::new(), &ctx(&cfg)).unwrap());
    }
    assert!(layers.render_all(&SceneStore::new(), &ctx(&cfg)).is_empty());
}

#[test]
fn render_all_paints_every_surface() {
    let cfg = EngineConfig::default();
    let mut layers = full_set();
    let failed = layers.render_all(&SceneStore::new(), &ctx(&cfg));
    assert!(failed.is_empty());
    for layer in Layer::ALL {
        let s = layers.surface(layer).unwrap();
        assert_eq!(s.pixel_size(), (400, 200), "{}", layer.name());
        assert!(s.has(|op| matches!(op, Op::ClearRect(..))));
    }
    assert!(layers.surface(Layer::Background).unwrap().has(|op| matches!(op, Op::FillRect(..))));
    assert!(layers.surface(Layer::Grid).unwrap().has(|op| *op == Op::Stroke));
}

#[test]
fn failing_pass_does_not_stop_the_rest() {
    let cfg = EngineConfig::default();
    let mut layers = full_set();
    layers.attach(Layer::Grid, RecordingSurface::failing());
    let failed = layers.render_all(&SceneStore::new(), &ctx(&cfg));
    assert_eq!(failed, [Layer::Grid]);
    assert!(layers.surface(Layer::Tokens).unwrap().has(|op| matches!(op, Op::ClearRect(..))));
    assert!(layers.surface(Layer::Overlay).unwrap().has(|op| matches!(op, Op::ClearRect(..))));
}

#[test]
fn detached_layer_is_skipped() {
    let cfg = EngineConfig::default();
    let mut layers = full_set();
    let removed = layers.detach(Layer::Tokens);
    assert!(removed.is_some());
    assert!(layers.surface(Layer::Tokens).is_none());
    assert!(!layers.render_layer(Layer::Tokens, &SceneStore::new(), &ctx(&cfg)).unwrap());
}

#[test]
fn render_layer_touches_only_that_surface() {
    let cfg = EngineConfig::default();
    let mut layers = full_set();
    assert!(layers.render_layer(Layer::Overlay, &SceneStore::new(), &ctx(&cfg)).unwrap());
    assert!(!layers.surface(Layer::Overlay).unwrap().ops.is_empty());
    for layer in [Layer::Background, Layer::Grid, Layer::Tokens] {
        assert!(layers.surface(layer).unwrap().ops.is_empty());
    }
}

#[test]
fn resize_all_sizes_by_dpr_once() {
    let mut layers = full_set();
    let vp = Viewport::new(300.0, 150.0, 1.5);
    layers.resize_all(&vp);
    layers.resize_all(&vp);
    for layer in Layer::ALL {
        let s = layers.surface(layer).unwrap();
        assert_eq!(s.pixel_size(), (450, 225));
        assert_eq!(s.count(|op| matches!(op, Op::Resize(..))), 1);
    }
}
