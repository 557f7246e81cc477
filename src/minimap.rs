//! Overview of the whole forest with a brush marking the visible region.
//!
//! The brush lives in forest layout units. Converting between the main
//! chart (layout scaled by the current zoom `k`) and the brush goes through
//! a pair of linear scales rebuilt for every `k`. Brush moves that the
//! minimap makes itself in response to zooming are tagged
//! [`BrushSource::Zoom`] and never turned back into a pan.

use serde::Serialize;

use crate::layout::ForestBound;
use crate::view::{Transform, Viewport};

/// Linear map from `domain` onto `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f32, f32),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f32) -> f32 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 {
            return self.range.0;
        }
        let t = (value - self.domain.0) / span;
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    pub fn invert(&self, value: f32) -> f32 {
        let span = self.range.1 - self.range.0;
        if span == 0.0 {
            return self.domain.0;
        }
        let t = (value - self.range.0) / span;
        self.domain.0 + t * (self.domain.1 - self.domain.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BrushRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BrushSource {
    /// Dragged by the user.
    User,
    /// Moved by the minimap to follow a zoom or pan of the main view.
    Zoom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushEvent {
    pub selection: BrushRect,
    pub source: BrushSource,
}

/// Area the brush may be dragged within, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BrushExtent {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// What the host draws for the minimap, in minimap pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinimapView {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub brush: BrushRect,
}

#[derive(Debug, Clone)]
pub struct MinimapController {
    bound: ForestBound,
    viewport: Viewport,
    minimap_scale: f32,
    brush: BrushRect,
}

impl MinimapController {
    pub fn new(bound: ForestBound, viewport: Viewport, minimap_scale: f32) -> Self {
        Self {
            bound,
            viewport,
            minimap_scale,
            brush: BrushRect {
                x: 0.0,
                y: 0.0,
                width: viewport.width,
                height: viewport.height,
            },
        }
    }

    pub fn set_bound(&mut self, bound: ForestBound) {
        self.bound = bound;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn brush(&self) -> BrushRect {
        self.brush
    }

    /// Layout length to main-chart length at zoom `k`, horizontally.
    pub fn scale_x(&self, k: f32) -> LinearScale {
        LinearScale::new((0.0, self.bound.width), (0.0, self.bound.width * k))
    }

    pub fn scale_y(&self, k: f32) -> LinearScale {
        LinearScale::new((0.0, self.bound.height), (0.0, self.bound.height * k))
    }

    pub fn extent(&self) -> BrushExtent {
        BrushExtent {
            x0: -self.viewport.width / 2.0,
            y0: -self.viewport.height / 2.0,
            x1: self.bound.width + self.viewport.width / 2.0,
            y1: self.bound.height + self.viewport.height / 2.0,
        }
    }

    /// Moves the brush over the region the main view currently shows.
    ///
    /// The returned event is tagged [`BrushSource::Zoom`]; feeding it back
    /// into [`Self::on_brush_event`] does nothing.
    pub fn sync_to_transform(&mut self, transform: &Transform) -> BrushEvent {
        let sx = self.scale_x(transform.k);
        let sy = self.scale_y(transform.k);
        self.brush = BrushRect {
            x: sx.invert(-transform.x),
            y: sy.invert(-transform.y),
            width: sx.invert(self.viewport.width) - sx.invert(0.0),
            height: sy.invert(self.viewport.height) - sy.invert(0.0),
        };
        BrushEvent {
            selection: self.brush,
            source: BrushSource::Zoom,
        }
    }

    /// Handles a brush move. User drags are clamped to [`Self::extent`] and
    /// produce the main-view translation `(x, y)` to pan to; the zoom is not
    /// affected. Zoom-tagged events are ignored.
    pub fn on_brush_event(
        &mut self,
        event: BrushEvent,
        transform: &Transform,
    ) -> Option<(f32, f32)> {
        if event.source == BrushSource::Zoom {
            tracing::trace!("ignored brush move triggered by zoom");
            return None;
        }
        let selection = event.selection;
        if !(selection.x.is_finite() && selection.y.is_finite()) {
            return None;
        }
        let extent = self.extent();
        let x = selection
            .x
            .min(extent.x1 - selection.width)
            .max(extent.x0);
        let y = selection
            .y
            .min(extent.y1 - selection.height)
            .max(extent.y0);
        self.brush = BrushRect { x, y, ..selection };
        let sx = self.scale_x(transform.k);
        let sy = self.scale_y(transform.k);
        Some((-sx.map(x), -sy.map(y)))
    }

    /// Builds a user drag that places the brush's top-left corner at a point
    /// given in minimap pixels, keeping its current size.
    pub fn drag_to(&self, minimap_x: f32, minimap_y: f32) -> BrushEvent {
        let scale = self.minimap_scale.max(f32::EPSILON);
        BrushEvent {
            selection: BrushRect {
                x: minimap_x / scale,
                y: minimap_y / scale,
                ..self.brush
            },
            source: BrushSource::User,
        }
    }

    pub fn view(&self) -> MinimapView {
        let s = self.minimap_scale;
        MinimapView {
            width: self.bound.width * s,
            height: self.bound.height * s,
            scale: s,
            brush: BrushRect {
                x: self.brush.x * s,
                y: self.brush.y * s,
                width: self.brush.width * s,
                height: self.brush.height * s,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> MinimapController {
        MinimapController::new(
            ForestBound {
                width: 2000.0,
                height: 1000.0,
            },
            Viewport::new(800.0, 600.0),
            0.1,
        )
    }

    #[test]
    fn scale_round_trips_for_many_zoom_levels() {
        let minimap = controller();
        for k in [0.2f32, 0.5, 1.0, 1.37, 3.0, 5.0] {
            let scale = minimap.scale_x(k);
            for x in [0.0f32, 1.0, 333.3, 1999.0, -250.0, 2600.0] {
                let back = scale.invert(scale.map(x));
                assert!((back - x).abs() <= 1e-3 * x.abs().max(1.0), "k={k} x={x}");
            }
            let scale = minimap.scale_y(k);
            assert!((scale.invert(scale.map(512.0)) - 512.0).abs() < 1e-2);
        }
    }

    #[test]
    fn degenerate_scale_does_not_divide_by_zero() {
        let scale = LinearScale::new((0.0, 0.0), (0.0, 0.0));
        assert_eq!(scale.map(5.0), 0.0);
        assert_eq!(scale.invert(5.0), 0.0);
    }

    #[test]
    fn brush_follows_transform() {
        let mut minimap = controller();
        let event = minimap.sync_to_transform(&Transform::new(-200.0, -100.0, 2.0));
        assert_eq!(event.source, BrushSource::Zoom);
        let brush = minimap.brush();
        assert!((brush.x - 100.0).abs() < 1e-3);
        assert!((brush.y - 50.0).abs() < 1e-3);
        assert!((brush.width - 400.0).abs() < 1e-3);
        assert!((brush.height - 300.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_tagged_events_are_ignored() {
        let mut minimap = controller();
        let transform = Transform::new(-200.0, -100.0, 2.0);
        let event = minimap.sync_to_transform(&transform);
        assert_eq!(minimap.on_brush_event(event, &transform), None);
    }

    #[test]
    fn user_drag_pans_without_touching_zoom() {
        let mut minimap = controller();
        let transform = Transform::new(0.0, 0.0, 2.0);
        minimap.sync_to_transform(&transform);
        let event = minimap.drag_to(30.0, 20.0);
        let (x, y) = minimap.on_brush_event(event, &transform).unwrap();
        // brush at (300, 200) layout units -> main chart at k = 2
        assert!((x + 600.0).abs() < 1e-3);
        assert!((y + 400.0).abs() < 1e-3);
        // round trip: syncing to the resulting transform lands on the same brush
        let dragged = minimap.brush();
        minimap.sync_to_transform(&Transform::new(x, y, 2.0));
        assert!((minimap.brush().x - dragged.x).abs() < 1e-3);
        assert!((minimap.brush().y - dragged.y).abs() < 1e-3);
    }

    #[test]
    fn drag_is_clamped_to_extent() {
        let mut minimap = controller();
        let transform = Transform::new(0.0, 0.0, 1.0);
        minimap.sync_to_transform(&transform);
        let far = BrushEvent {
            selection: BrushRect {
                x: 1.0e6,
                y: -1.0e6,
                width: 800.0,
                height: 600.0,
            },
            source: BrushSource::User,
        };
        minimap.on_brush_event(far, &transform).unwrap();
        let extent = minimap.extent();
        let brush = minimap.brush();
        assert_eq!(brush.x, extent.x1 - 800.0);
        assert_eq!(brush.y, extent.y0);
        assert_eq!(extent.x0, -400.0);
        assert_eq!(extent.y1, 1300.0);
    }

    #[test]
    fn view_is_scaled_to_minimap_pixels() {
        let mut minimap = controller();
        minimap.sync_to_transform(&Transform::new(0.0, 0.0, 1.0));
        let view = minimap.view();
        assert!((view.width - 200.0).abs() < 1e-3);
        assert!((view.height - 100.0).abs() < 1e-3);
        assert!((view.brush.width - 80.0).abs() < 1e-3);
        assert!((view.brush.height - 60.0).abs() < 1e-3);
    }
}
