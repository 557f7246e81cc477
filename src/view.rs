//! Pan/zoom state of the main view.

use serde::{Deserialize, Serialize};

use crate::events::{ListenerId, Listeners};
use crate::layout::{ForestBound, fit_transform};

/// Screen = layout * k + (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn new(x: f32, y: f32, k: f32) -> Self {
        Self { x, y, k }
    }

    pub fn apply(&self, point: (f32, f32)) -> (f32, f32) {
        (point.0 * self.k + self.x, point.1 * self.k + self.y)
    }

    pub fn invert(&self, point: (f32, f32)) -> (f32, f32) {
        ((point.0 - self.x) / self.k, (point.1 - self.y) / self.k)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.k.is_finite()
    }

    /// SVG `transform` attribute value.
    pub fn to_svg(&self) -> String {
        format!("translate({:.2},{:.2}) scale({:.4})", self.x, self.y, self.k)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleExtent {
    pub min: f32,
    pub max: f32,
}

impl ScaleExtent {
    /// Bounds are reordered if given the wrong way round.
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn clamp(&self, k: f32) -> f32 {
        k.max(self.min).min(self.max)
    }
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self { min: 0.2, max: 5.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

/// Incoming pan/zoom input from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Drag by a screen-space delta.
    Pan { dx: f32, dy: f32 },
    /// Wheel or pinch: multiply the scale, keeping the screen point fixed.
    ZoomAt { factor: f32, x: f32, y: f32 },
    /// A full transform computed by the host's gesture handling.
    Set(Transform),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    Gesture,
    Brush,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformChange {
    pub previous: Transform,
    pub transform: Transform,
    pub source: ChangeSource,
}

/// Single owner of the main view transform. `k` always stays inside the
/// scale extent.
#[derive(Debug, Default)]
pub struct ViewController {
    transform: Transform,
    extent: ScaleExtent,
    listeners: Listeners<TransformChange>,
}

impl ViewController {
    pub fn new(extent: ScaleExtent) -> Self {
        Self {
            transform: Transform {
                k: extent.clamp(1.0),
                ..Transform::IDENTITY
            },
            extent,
            listeners: Listeners::new(),
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn extent(&self) -> ScaleExtent {
        self.extent
    }

    pub fn set_extent(&mut self, extent: ScaleExtent) -> Option<TransformChange> {
        self.extent = extent;
        let next = Transform {
            k: extent.clamp(self.transform.k),
            ..self.transform
        };
        self.commit(next, ChangeSource::Reset)
    }

    /// Merges a gesture into the current transform. Returns the change, or
    /// `None` when the result equals the current transform (repeated
    /// identical input is a no-op) or the input is not finite.
    pub fn apply_gesture(&mut self, gesture: Gesture) -> Option<TransformChange> {
        let current = self.transform;
        let next = match gesture {
            Gesture::Pan { dx, dy } => Transform {
                x: current.x + dx,
                y: current.y + dy,
                k: current.k,
            },
            Gesture::ZoomAt { factor, x, y } => {
                if !(factor.is_finite() && factor > 0.0) {
                    return None;
                }
                let k = self.extent.clamp(current.k * factor);
                let (lx, ly) = current.invert((x, y));
                Transform {
                    x: x - lx * k,
                    y: y - ly * k,
                    k,
                }
            }
            Gesture::Set(transform) if transform.is_finite() => Transform {
                k: self.extent.clamp(transform.k),
                ..transform
            },
            Gesture::Set(_) => return None,
        };
        self.commit(next, ChangeSource::Gesture)
    }

    /// Pans to an absolute translation; the scale is untouched.
    pub fn pan_to(&mut self, x: f32, y: f32, source: ChangeSource) -> Option<TransformChange> {
        let next = Transform {
            x,
            y,
            k: self.transform.k,
        };
        self.commit(next, source)
    }

    pub fn reset_to_fit(
        &mut self,
        bound: ForestBound,
        viewport: Viewport,
    ) -> Option<TransformChange> {
        let next = fit_transform(bound, viewport, self.extent);
        tracing::debug!(x = next.x, y = next.y, k = next.k, "reset view to fit");
        self.commit(next, ChangeSource::Reset)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TransformChange) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// While muted, transform changes still apply but nobody is notified.
    pub fn set_listeners_muted(&mut self, muted: bool) {
        self.listeners.set_muted(muted);
    }

    fn commit(&mut self, next: Transform, source: ChangeSource) -> Option<TransformChange> {
        if !next.is_finite() {
            tracing::trace!(?next, "ignored non-finite transform");
            return None;
        }
        if next == self.transform {
            tracing::trace!(?source, "transform unchanged");
            return None;
        }
        let change = TransformChange {
            previous: self.transform,
            transform: next,
            source,
        };
        self.transform = next;
        self.listeners.emit(&change);
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn zoom_is_clamped_to_extent() {
        let mut view = ViewController::new(ScaleExtent::default());
        for _ in 0..50 {
            view.apply_gesture(Gesture::ZoomAt {
                factor: 1.7,
                x: 10.0,
                y: 20.0,
            });
        }
        assert_eq!(view.transform().k, 5.0);
        for _ in 0..100 {
            view.apply_gesture(Gesture::ZoomAt {
                factor: 0.3,
                x: 500.0,
                y: 0.0,
            });
        }
        assert_eq!(view.transform().k, 0.2);
        view.apply_gesture(Gesture::Set(Transform::new(1.0, 2.0, 99.0)));
        assert_eq!(view.transform(), Transform::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut view = ViewController::new(ScaleExtent::default());
        view.apply_gesture(Gesture::Pan { dx: 40.0, dy: -10.0 });
        let anchor = (300.0, 200.0);
        let before = view.transform().invert(anchor);
        view.apply_gesture(Gesture::ZoomAt {
            factor: 2.0,
            x: anchor.0,
            y: anchor.1,
        });
        let after = view.transform().invert(anchor);
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
        assert_eq!(view.transform().k, 2.0);
    }

    #[test]
    fn repeated_identical_set_is_a_no_op() {
        let mut view = ViewController::new(ScaleExtent::default());
        let target = Transform::new(5.0, 6.0, 1.5);
        assert!(view.apply_gesture(Gesture::Set(target)).is_some());
        assert!(view.apply_gesture(Gesture::Set(target)).is_none());
        assert!(view.apply_gesture(Gesture::Pan { dx: 0.0, dy: 0.0 }).is_none());
        assert!(
            view.apply_gesture(Gesture::Set(Transform::new(f32::NAN, 0.0, 1.0)))
                .is_none()
        );
        assert!(
            view.apply_gesture(Gesture::ZoomAt {
                factor: 0.0,
                x: 0.0,
                y: 0.0
            })
            .is_none()
        );
        assert_eq!(view.transform(), target);
    }

    #[test]
    fn listeners_see_changes_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut view = ViewController::new(ScaleExtent::default());
        let sink = Rc::clone(&seen);
        let id = view.subscribe(move |change| sink.borrow_mut().push(change.source));
        view.apply_gesture(Gesture::Pan { dx: 1.0, dy: 0.0 });
        view.pan_to(3.0, 3.0, ChangeSource::Brush);
        view.reset_to_fit(
            ForestBound {
                width: 100.0,
                height: 100.0,
            },
            Viewport::new(200.0, 200.0),
        );
        assert!(view.unsubscribe(id));
        view.apply_gesture(Gesture::Pan { dx: 1.0, dy: 0.0 });
        assert_eq!(
            *seen.borrow(),
            vec![ChangeSource::Gesture, ChangeSource::Brush, ChangeSource::Reset]
        );
    }

    #[test]
    fn narrowing_extent_reclamps_scale() {
        let mut view = ViewController::new(ScaleExtent::default());
        view.apply_gesture(Gesture::Set(Transform::new(0.0, 0.0, 4.0)));
        view.set_extent(ScaleExtent::new(2.0, 0.5));
        assert_eq!(view.extent(), ScaleExtent { min: 0.5, max: 2.0 });
        assert_eq!(view.transform().k, 2.0);
    }

    #[test]
    fn transform_round_trips_points() {
        let t = Transform::new(12.0, -4.0, 0.75);
        let p = (123.0, 456.0);
        let back = t.invert(t.apply(p));
        assert!((back.0 - p.0).abs() < 1e-3 && (back.1 - p.1).abs() < 1e-3);
        assert!(t.to_svg().starts_with("translate(12.00,-4.00)"));
    }
}
