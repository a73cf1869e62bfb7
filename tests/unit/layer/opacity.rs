use super::*;
use crate::foundation::core::{Color, Point, Size};
use crate::layer::display_list_layer::DisplayListLayer;
use crate::layer::texture_layer::TextureLayer;
use crate::paint::canvas::Canvas;
use crate::paint::display_list::{DisplayList, DisplayListBuilder};
use crate::paint::pixmap_canvas::PixmapCanvas;
use crate::raster_cache::RasterCache;
use crate::texture::TextureRegistry;
use std::sync::Arc;

fn striped_list() -> Arc<DisplayList> {
    let mut b = DisplayListBuilder::new();
    b.fill_rect(Rect::new(0.0, 0.0, 4.0, 2.0), Color::WHITE);
    b.fill_rect(Rect::new(0.0, 2.0, 4.0, 4.0), Color::WHITE);
    b.build()
}

fn badge(opacity: f32) -> OpacityLayer {
    OpacityLayer::with_unique_id(opacity, Vec2::new(2.0, 2.0), 40)
        .with_child(DisplayListLayer::new(Vec2::ZERO, striped_list()))
}

/// Preroll, then paint into a recorder, then sweep: one frame.
fn run_frame(
    layer: &mut dyn Layer,
    cache: &mut RasterCache,
    registry: &TextureRegistry,
) -> (bool, Arc<DisplayList>) {
    let has_texture_layer = {
        let mut ctx = PrerollContext {
            raster_cache: Some(&mut *cache),
            texture_registry: registry,
            gr_context: None,
            has_texture_layer: false,
        };
        layer.preroll(&mut ctx, Affine::IDENTITY);
        ctx.has_texture_layer
    };
    let mut recorder = DisplayListBuilder::new();
    {
        let mut ctx = PaintContext {
            canvas: &mut recorder,
            raster_cache: Some(&*cache),
            texture_registry: registry,
            gr_context: None,
        };
        layer.paint(&mut ctx);
    }
    cache.sweep_after_frame();
    (has_texture_layer, recorder.build())
}

#[test]
fn opacity_is_clamped() {
    assert_eq!(OpacityLayer::new(1.5, Vec2::ZERO).opacity(), 1.0);
    assert_eq!(OpacityLayer::new(-1.0, Vec2::ZERO).opacity(), 0.0);
}

#[test]
fn bounds_include_offset_and_transparent_layers_skip_painting() {
    let registry = TextureRegistry::new();
    let mut cache = RasterCache::default();
    let mut layer = badge(0.5);
    run_frame(&mut layer, &mut cache, &registry);
    assert_eq!(layer.paint_bounds(), Rect::new(2.0, 2.0, 6.0, 6.0));
    assert!(layer.needs_painting());
    assert_eq!(layer.unique_id(), 40);

    let mut invisible = badge(0.0);
    run_frame(&mut invisible, &mut cache, &registry);
    assert!(!invisible.needs_painting());
}

#[test]
fn children_are_cached_after_access_threshold_frames() {
    let registry = TextureRegistry::new();
    let mut cache = RasterCache::default();
    let mut layer = badge(0.5);

    for frame in 1..=2 {
        let (_, painted) = run_frame(&mut layer, &mut cache, &registry);
        assert!(layer.children_cache_id().is_none(), "frame {frame}");
        assert_eq!(painted.op_count(), 2, "frame {frame} paints live");
    }

    let (_, painted) = run_frame(&mut layer, &mut cache, &registry);
    let id = layer.children_cache_id().expect("cached on third frame");
    assert_eq!(id.kind(), crate::raster_cache::RasterCacheKeyKind::LayerChildren);
    assert_eq!(painted.op_count(), 1, "single cached blit");
    assert_eq!(painted.bounds(), Rect::new(2.0, 2.0, 6.0, 6.0));
    assert_eq!(cache.layer_cached_entries_count(), 1);

    let (_, painted) = run_frame(&mut layer, &mut cache, &registry);
    assert_eq!(painted.op_count(), 1);
    assert_eq!(cache.cached_entries_count(), 1);
}

#[test]
fn cached_paint_matches_live_paint() {
    let registry = TextureRegistry::new();
    let mut cache = RasterCache::default();
    let mut layer = badge(0.5);
    for _ in 0..3 {
        run_frame(&mut layer, &mut cache, &registry);
    }
    assert!(layer.children_cache_id().is_some());

    let mut cached = PixmapCanvas::new(8, 8).unwrap();
    layer.paint(&mut PaintContext {
        canvas: &mut cached,
        raster_cache: Some(&cache),
        texture_registry: &registry,
        gr_context: None,
    });
    let mut live = PixmapCanvas::new(8, 8).unwrap();
    layer.paint(&mut PaintContext {
        canvas: &mut live,
        raster_cache: None,
        texture_registry: &registry,
        gr_context: None,
    });

    let (cached, live) = (cached.snapshot(), live.snapshot());
    for (x, y) in [(3, 3), (5, 5), (0, 0), (7, 7)] {
        let (c, l) = (cached.pixel(x, y).unwrap(), live.pixel(x, y).unwrap());
        for ch in 0..4 {
            assert!(c[ch].abs_diff(l[ch]) <= 2, "({x},{y}) cached {c:?} live {l:?}");
        }
    }
    let [_, _, _, a] = live.pixel(3, 3).unwrap();
    assert!(a.abs_diff(128) <= 2);
}

#[test]
fn texture_subtree_is_never_cached() {
    let registry = TextureRegistry::new();
    let mut cache = RasterCache::default();
    let mut layer = badge(0.5).with_child(TextureLayer::new(
        1,
        Point::new(0.0, 0.0),
        Size::new(4.0, 4.0),
    ));
    for _ in 0..5 {
        let (has_texture, _) = run_frame(&mut layer, &mut cache, &registry);
        assert!(has_texture, "flag propagates to the parent");
    }
    assert!(layer.children_cache_id().is_none());
    assert_eq!(cache.cached_entries_count(), 0);
}

#[test]
fn sibling_texture_does_not_block_caching() {
    let registry = TextureRegistry::new();
    let mut cache = RasterCache::default();
    let mut root = crate::layer::container::ContainerLayer::new()
        .with_child(TextureLayer::new(1, Point::ZERO, Size::new(4.0, 4.0)))
        .with_child(badge(0.5));
    for _ in 0..3 {
        run_frame(&mut root, &mut cache, &registry);
    }
    assert_eq!(cache.layer_cached_entries_count(), 1);
}

#[test]
fn bypassed_cache_is_left_untouched() {
    let registry = TextureRegistry::new();
    let mut layer = badge(0.5);
    for _ in 0..4 {
        let mut ctx = PrerollContext {
            raster_cache: None,
            texture_registry: &registry,
            gr_context: None,
            has_texture_layer: false,
        };
        layer.preroll(&mut ctx, Affine::IDENTITY);
    }
    assert!(layer.children_cache_id().is_none());
}
