//! The forest diagram component: owns the collapse state, per-tree layout
//! caches, the composed forest, the main view transform and the minimap,
//! and routes user input between them.

use crate::collapse::{CollapseMachine, ToggleOutcome};
use crate::config::DiagramConfig;
use crate::events::{ListenerId, Listeners};
use crate::ir::RawNode;
use crate::layout::{
    ForestBound, ForestLayout, NodeLayout, NodeMargin, TreeBound, TreeLayout, TreePlacement,
    compose_forest, layout_tree,
};
use crate::minimap::{BrushEvent, MinimapController, MinimapView};
use crate::model::{Forest, IdGenerator, NodeId, TreeNode, build_forest, default_id_generator};
use crate::render::NodeDetailRenderer;
use crate::view::{ChangeSource, Gesture, Transform, TransformChange, ViewController, Viewport};

/// Callbacks fired synchronously while handling user interaction.
pub trait InteractionHandler {
    fn on_node_expand_btn_toggle(&mut self, _id: &NodeId) {}
    fn on_node_detail_click(&mut self, _node: &TreeNode) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl InteractionHandler for NoopHandler {}

type MeasureFn = Box<dyn FnMut(usize) -> Option<TreeBound>>;

/// What a cached layout or measurement was computed from.
#[derive(Debug, Clone, PartialEq)]
struct LayoutKey {
    root: NodeId,
    revision: u64,
    margin: NodeMargin,
}

#[derive(Debug, Clone)]
struct CachedLayout {
    key: LayoutKey,
    layout: TreeLayout,
}

#[derive(Debug, Clone)]
struct MeasuredBound {
    key: LayoutKey,
    bound: TreeBound,
}

/// One tree together with the translation that places it in the forest.
#[derive(Debug, Clone, Copy)]
pub struct PlacedTree<'a> {
    pub placement: TreePlacement,
    pub layout: &'a TreeLayout,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub forest: &'a Forest,
    pub trees: Vec<PlacedTree<'a>>,
    pub bound: ForestBound,
    pub transform: Transform,
    pub viewport: Viewport,
    pub minimap: Option<MinimapView>,
}

impl Scene<'_> {
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|tree| tree.layout.nodes.len()).sum()
    }

    /// Node under a point given in viewport (screen) coordinates.
    pub fn node_at(&self, screen_x: f32, screen_y: f32) -> Option<&NodeLayout> {
        let (x, y) = self.transform.invert((screen_x, screen_y));
        self.trees.iter().find_map(|tree| {
            let local_x = x - tree.placement.offset_x;
            let local_y = y - tree.placement.offset_y;
            tree.layout.nodes.iter().find(|node| {
                local_x >= node.x
                    && local_x <= node.x + node.width
                    && local_y >= node.y
                    && local_y <= node.y + node.height
            })
        })
    }
}

pub struct ForestDiagram {
    config: DiagramConfig,
    ids: Box<dyn IdGenerator>,
    machine: CollapseMachine,
    layouts: Vec<CachedLayout>,
    measured: Vec<Option<MeasuredBound>>,
    measure: Option<MeasureFn>,
    composed: ForestLayout,
    view: ViewController,
    minimap: MinimapController,
    handler: Box<dyn InteractionHandler>,
    selected: Option<NodeId>,
    mounted: bool,
    resize_listeners: Listeners<Viewport>,
}

impl ForestDiagram {
    pub fn new(config: DiagramConfig) -> Self {
        let config = config.sanitized();
        let mut view = ViewController::new(config.scale_extent);
        view.set_listeners_muted(true);
        let mut resize_listeners = Listeners::new();
        resize_listeners.set_muted(true);
        let minimap =
            MinimapController::new(ForestBound::default(), config.viewport, config.minimap_scale);
        Self {
            config,
            ids: default_id_generator(),
            machine: CollapseMachine::default(),
            layouts: Vec::new(),
            measured: Vec::new(),
            measure: None,
            composed: ForestLayout::default(),
            view,
            minimap,
            handler: Box::new(NoopHandler),
            selected: None,
            mounted: false,
            resize_listeners,
        }
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_handler(mut self, handler: impl InteractionHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// Replaces layout-derived bounds with an external measurement, e.g. the
    /// host's rendered bounding boxes. Returning `None` (or an empty box)
    /// means "not rendered yet": the tree counts as zero-sized and is
    /// measured again on the next refresh.
    pub fn set_measure(&mut self, measure: impl FnMut(usize) -> Option<TreeBound> + 'static) {
        self.measure = Some(Box::new(measure));
        self.measured.clear();
        self.refresh();
    }

    /// Rebuilds the forest from fresh input. All node ids are new, so any
    /// collapse state and selection from the previous data is dropped, and
    /// the view is reset to fit.
    pub fn load(&mut self, plans: &[RawNode]) {
        let forest = build_forest(plans, self.config.node_size, self.ids.as_mut());
        tracing::debug!(trees = forest.tree_count(), nodes = forest.len(), "loaded plans");
        self.machine.replace(forest);
        self.layouts.clear();
        self.measured.clear();
        self.selected = None;
        self.refresh();
        self.reset_to_fit();
    }

    /// Re-lays out stale trees, re-measures and re-composes the forest, and
    /// moves the brush to match.
    pub fn refresh(&mut self) {
        let tree_count = self.machine.forest().tree_count();
        self.layouts.truncate(tree_count);
        self.measured.resize(tree_count, None);

        let mut relaid = 0;
        for tree in 0..tree_count {
            let Some(root) = self.machine.forest().root(tree) else {
                continue;
            };
            let key = LayoutKey {
                root: root.id.clone(),
                revision: self.machine.revision(tree),
                margin: self.config.node_margin,
            };
            if self.layouts.get(tree).is_some_and(|cached| cached.key == key) {
                continue;
            }
            let layout = layout_tree(&self.machine, tree, self.config.node_margin);
            let cached = CachedLayout { key, layout };
            if tree < self.layouts.len() {
                self.layouts[tree] = cached;
            } else {
                self.layouts.push(cached);
            }
            relaid += 1;
        }

        let layouts = &self.layouts;
        let measured = &mut self.measured;
        let custom = &mut self.measure;
        let mut measure = |idx: usize| -> Option<TreeBound> {
            let cached = layouts.get(idx)?;
            if let Some(Some(hit)) = measured.get(idx)
                && hit.key == cached.key
            {
                return Some(hit.bound);
            }
            let bound = match custom.as_mut() {
                Some(measure) => measure(idx),
                None => Some(cached.layout.bound()),
            };
            let bound = bound.filter(|bound| !bound.is_empty())?;
            if let Some(slot) = measured.get_mut(idx) {
                *slot = Some(MeasuredBound {
                    key: cached.key.clone(),
                    bound,
                });
            }
            Some(bound)
        };
        self.composed = compose_forest(tree_count, self.config.gap_between_trees, &mut measure);
        tracing::debug!(relaid, trees = tree_count, "refreshed forest");

        self.minimap.set_bound(self.composed.bound);
        self.minimap.set_viewport(self.config.viewport);
        self.minimap.sync_to_transform(&self.view.transform());
    }

    pub fn toggle(&mut self, id: &NodeId) -> ToggleOutcome {
        let outcome = self.machine.toggle(id);
        self.after_state_change(outcome)
    }

    pub fn collapse(&mut self, id: &NodeId) -> ToggleOutcome {
        let outcome = self.machine.collapse(id);
        self.after_state_change(outcome)
    }

    pub fn expand(&mut self, id: &NodeId) -> ToggleOutcome {
        let outcome = self.machine.expand(id);
        self.after_state_change(outcome)
    }

    pub fn collapse_below_depth(&mut self, depth: usize) -> usize {
        let affected = self.machine.collapse_below_depth(depth);
        if affected > 0 {
            self.refresh();
        }
        affected
    }

    pub fn expand_all(&mut self) {
        self.machine.expand_all();
        self.refresh();
    }

    fn after_state_change(&mut self, outcome: ToggleOutcome) -> ToggleOutcome {
        if outcome.changed_tree().is_some() {
            self.refresh();
        }
        outcome
    }

    /// Expand/collapse button pressed on a node.
    pub fn click_expand_button(&mut self, id: &NodeId) -> ToggleOutcome {
        self.handler.on_node_expand_btn_toggle(id);
        self.toggle(id)
    }

    /// Node body clicked: selects it for the detail panel.
    pub fn click_node_detail(&mut self, id: &NodeId) -> bool {
        let Some(node) = self.machine.forest().find(id) else {
            return false;
        };
        self.handler.on_node_detail_click(node);
        self.selected = Some(id.clone());
        true
    }

    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.selected
            .as_ref()
            .and_then(|id| self.machine.forest().find(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn render_detail(&self, renderer: &dyn NodeDetailRenderer) -> Option<String> {
        self.selected_node().map(|node| renderer.render_detail(node))
    }

    pub fn apply_gesture(&mut self, gesture: Gesture) -> Option<TransformChange> {
        let change = self.view.apply_gesture(gesture)?;
        self.minimap.sync_to_transform(&change.transform);
        Some(change)
    }

    /// Handles a brush move from the minimap. Zoom-tagged events are dropped
    /// so the brush never feeds back into the transform it mirrors.
    pub fn brush(&mut self, event: BrushEvent) -> Option<TransformChange> {
        let (x, y) = self
            .minimap
            .on_brush_event(event, &self.view.transform())?;
        self.view.pan_to(x, y, ChangeSource::Brush)
    }

    /// User dragged the brush so its top-left corner sits at a point in
    /// minimap pixels.
    pub fn drag_brush_to(&mut self, minimap_x: f32, minimap_y: f32) -> Option<TransformChange> {
        let event = self.minimap.drag_to(minimap_x, minimap_y);
        self.brush(event)
    }

    pub fn reset_to_fit(&mut self) -> Option<TransformChange> {
        let change = self
            .view
            .reset_to_fit(self.composed.bound, self.config.viewport);
        self.minimap.sync_to_transform(&self.view.transform());
        change
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.config.viewport || !(viewport.width > 0.0 && viewport.height > 0.0) {
            return;
        }
        self.config.viewport = viewport;
        self.minimap.set_viewport(viewport);
        self.minimap.sync_to_transform(&self.view.transform());
        self.resize_listeners.emit(&viewport);
    }

    pub fn set_margin(&mut self, margin: NodeMargin) {
        let usable = |v: f32| v.is_finite() && v >= 0.0;
        if !(usable(margin.sibling_margin) && usable(margin.children_margin))
            || margin == self.config.node_margin
        {
            return;
        }
        self.config.node_margin = margin;
        self.refresh();
    }

    pub fn set_gap(&mut self, gap: f32) {
        if !(gap.is_finite() && gap >= 0.0) || gap == self.config.gap_between_trees {
            return;
        }
        self.config.gap_between_trees = gap;
        self.refresh();
    }

    /// Starts delivering transform and resize events. Listeners subscribed
    /// before mounting are held and only see changes made after this call.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.view.set_listeners_muted(false);
        self.resize_listeners.set_muted(false);
        self.mounted = true;
        tracing::debug!("diagram mounted");
    }

    /// Drops every transform and resize listener. Gestures and resizes keep
    /// updating state afterwards but notify nobody until the next `mount`.
    pub fn unmount(&mut self) {
        self.view.clear_listeners();
        self.view.set_listeners_muted(true);
        self.resize_listeners.clear();
        self.resize_listeners.set_muted(true);
        self.mounted = false;
        tracing::debug!("diagram unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn subscribe_transform(
        &mut self,
        listener: impl FnMut(&TransformChange) + 'static,
    ) -> ListenerId {
        self.view.subscribe(listener)
    }

    pub fn unsubscribe_transform(&mut self, id: ListenerId) -> bool {
        self.view.unsubscribe(id)
    }

    pub fn subscribe_resize(&mut self, listener: impl FnMut(&Viewport) + 'static) -> ListenerId {
        self.resize_listeners.subscribe(listener)
    }

    pub fn unsubscribe_resize(&mut self, id: ListenerId) -> bool {
        self.resize_listeners.unsubscribe(id)
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn forest(&self) -> &Forest {
        self.machine.forest()
    }

    pub fn is_collapsed(&self, id: &NodeId) -> bool {
        self.machine.is_collapsed(id)
    }

    pub fn transform(&self) -> Transform {
        self.view.transform()
    }

    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    pub fn forest_bound(&self) -> ForestBound {
        self.composed.bound
    }

    pub fn composed(&self) -> &ForestLayout {
        &self.composed
    }

    pub fn tree_layout(&self, tree: usize) -> Option<&TreeLayout> {
        self.layouts.get(tree).map(|cached| &cached.layout)
    }

    pub fn minimap_view(&self) -> Option<MinimapView> {
        self.config.show_minimap.then(|| self.minimap.view())
    }

    pub fn scene(&self) -> Scene<'_> {
        let trees = self
            .composed
            .placements
            .iter()
            .filter_map(|placement| {
                let cached = self.layouts.get(placement.index)?;
                Some(PlacedTree {
                    placement: *placement,
                    layout: &cached.layout,
                })
            })
            .collect();
        Scene {
            forest: self.machine.forest(),
            trees,
            bound: self.composed.bound,
            transform: self.view.transform(),
            viewport: self.config.viewport,
            minimap: self.minimap_view(),
        }
    }
}

impl Default for ForestDiagram {
    fn default() -> Self {
        Self::new(DiagramConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimap::{BrushRect, BrushSource};
    use crate::model::{SequentialIds, Size};
    use crate::view::ScaleExtent;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn config() -> DiagramConfig {
        DiagramConfig {
            node_size: Size::new(200.0, 100.0),
            viewport: Viewport::new(1000.0, 800.0),
            ..DiagramConfig::default()
        }
    }

    fn diagram() -> ForestDiagram {
        ForestDiagram::new(config()).with_id_generator(SequentialIds::default())
    }

    fn plan() -> RawNode {
        RawNode::new("Projection").with_children(vec![
            RawNode::new("HashJoin").with_children(vec![
                RawNode::new("TableReader_a"),
                RawNode::new("TableReader_b"),
            ]),
            RawNode::new("Selection").with_children(vec![RawNode::new("IndexScan")]),
        ])
    }

    fn id_named(diagram: &ForestDiagram, name: &str) -> NodeId {
        diagram
            .forest()
            .nodes()
            .iter()
            .find(|node| node.info.name == name)
            .map(|node| node.id.clone())
            .unwrap()
    }

    #[test]
    fn load_lays_out_composes_and_fits() {
        let mut diagram = diagram();
        diagram.load(&[plan(), RawNode::new("Point_Get")]);
        let scene = diagram.scene();
        assert_eq!(scene.trees.len(), 2);
        assert_eq!(scene.node_count(), 7);
        let widths: f32 = scene.trees.iter().map(|t| t.placement.bound.width).sum();
        assert!((scene.bound.width - (widths + 100.0)).abs() < 1e-3);
        assert!(diagram.composed().complete);
        let t = diagram.transform();
        assert!(t.k <= 1.0);
        assert!(scene.minimap.is_some());
    }

    #[test]
    fn toggle_relayouts_only_the_touched_tree() {
        let mut diagram = diagram();
        diagram.load(&[plan(), plan()]);
        let second_before = diagram.tree_layout(1).unwrap().clone();
        let join = id_named(&diagram, "HashJoin");
        assert!(matches!(
            diagram.toggle(&join),
            ToggleOutcome::Collapsed { tree: 0, .. }
        ));
        assert_eq!(diagram.tree_layout(0).unwrap().nodes.len(), 4);
        assert_eq!(diagram.tree_layout(1).unwrap(), &second_before);
        assert!(diagram.is_collapsed(&join));
    }

    #[test]
    fn reload_generates_fresh_ids_and_drops_state() {
        let mut diagram = diagram();
        diagram.load(&[plan()]);
        let root = diagram.forest().root(0).unwrap().id.clone();
        diagram.toggle(&root);
        diagram.click_node_detail(&root);
        diagram.load(&[plan()]);
        let new_root = diagram.forest().root(0).unwrap().id.clone();
        assert_ne!(root, new_root);
        assert!(!diagram.is_collapsed(&new_root));
        assert_eq!(diagram.scene().node_count(), 6);
        assert!(diagram.selected_node().is_none());
    }

    #[test]
    fn gestures_keep_scale_in_range_and_move_brush() {
        let mut diagram = diagram();
        diagram.load(&[plan()]);
        let before = diagram.minimap.brush();
        for _ in 0..40 {
            diagram.apply_gesture(Gesture::ZoomAt {
                factor: 1.5,
                x: 100.0,
                y: 100.0,
            });
        }
        assert_eq!(diagram.transform().k, ScaleExtent::default().max);
        assert_ne!(diagram.minimap.brush(), before);
    }

    #[test]
    fn brush_drag_pans_and_zoom_echo_is_ignored() {
        let mut diagram = diagram();
        diagram.load(&[plan()]);
        let k = diagram.transform().k;
        let echo = BrushEvent {
            selection: BrushRect {
                x: 10.0,
                y: 10.0,
                width: 10.0,
                height: 10.0,
            },
            source: BrushSource::Zoom,
        };
        assert!(diagram.brush(echo).is_none());

        let change = diagram.drag_brush_to(3.0, 1.5).unwrap();
        assert_eq!(change.source, ChangeSource::Brush);
        assert_eq!(change.transform.k, k);
        let scale = diagram.config().minimap_scale;
        assert!((change.transform.x + 3.0 / scale * k).abs() < 1e-2);
    }

    #[test]
    fn callbacks_fire_and_detail_renders() {
        #[derive(Default)]
        struct Recorder {
            toggles: Rc<Cell<usize>>,
            details: Rc<RefCell<Vec<String>>>,
        }
        impl InteractionHandler for Recorder {
            fn on_node_expand_btn_toggle(&mut self, _id: &NodeId) {
                self.toggles.set(self.toggles.get() + 1);
            }
            fn on_node_detail_click(&mut self, node: &TreeNode) {
                self.details.borrow_mut().push(node.info.name.clone());
            }
        }
        let recorder = Recorder::default();
        let toggles = Rc::clone(&recorder.toggles);
        let details = Rc::clone(&recorder.details);
        let mut diagram = diagram().with_handler(recorder);
        diagram.load(&[plan()]);

        let join = id_named(&diagram, "HashJoin");
        diagram.click_expand_button(&join);
        assert_eq!(toggles.get(), 1);
        assert!(diagram.click_node_detail(&join));
        assert!(!diagram.click_node_detail(&NodeId::new("nope")));
        assert_eq!(*details.borrow(), vec!["HashJoin".to_string()]);

        let detail = diagram
            .render_detail(&|node: &TreeNode| format!("detail:{}", node.info.name))
            .unwrap();
        assert_eq!(detail, "detail:HashJoin");
        diagram.clear_selection();
        assert!(diagram.selected_node().is_none());
    }

    #[test]
    fn failed_measurement_is_retried() {
        let mut diagram = diagram();
        diagram.load(&[plan(), plan()]);
        let ready = Rc::new(Cell::new(false));
        let calls = Rc::new(Cell::new(0));
        let (ready_in, calls_in) = (Rc::clone(&ready), Rc::clone(&calls));
        diagram.set_measure(move |_idx| {
            calls_in.set(calls_in.get() + 1);
            ready_in.get().then_some(TreeBound {
                x: 0.0,
                y: 0.0,
                width: 300.0,
                height: 200.0,
            })
        });
        assert!(!diagram.composed().complete);
        assert_eq!(diagram.forest_bound().width, 100.0);

        ready.set(true);
        diagram.refresh();
        assert!(diagram.composed().complete);
        assert_eq!(diagram.forest_bound().width, 700.0);

        // measured once per tree; further refreshes hit the guard
        let after = calls.get();
        diagram.refresh();
        assert_eq!(calls.get(), after);
    }

    #[test]
    fn margin_change_relayouts() {
        let mut diagram = diagram();
        diagram.load(&[plan()]);
        let width = diagram.forest_bound().width;
        diagram.set_margin(NodeMargin {
            sibling_margin: 200.0,
            children_margin: 60.0,
        });
        assert!(diagram.forest_bound().width > width);
    }

    #[test]
    fn unmount_releases_listeners() {
        let mut diagram = diagram();
        diagram.mount();
        diagram.load(&[plan()]);
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        diagram.subscribe_transform(move |_| sink.set(sink.get() + 1));
        let resized = Rc::new(Cell::new(0));
        let resize_sink = Rc::clone(&resized);
        diagram.subscribe_resize(move |_| resize_sink.set(resize_sink.get() + 1));

        diagram.apply_gesture(Gesture::Pan { dx: 5.0, dy: 0.0 });
        diagram.resize(Viewport::new(640.0, 480.0));
        assert_eq!(seen.get(), 1);
        assert_eq!(resized.get(), 1);

        diagram.unmount();
        assert!(!diagram.is_mounted());
        diagram.apply_gesture(Gesture::Pan { dx: 5.0, dy: 0.0 });
        diagram.resize(Viewport::new(800.0, 600.0));
        assert_eq!(seen.get(), 1);
        assert_eq!(resized.get(), 1);
    }

    #[test]
    fn listeners_wait_for_mount() {
        let mut diagram = diagram();
        diagram.load(&[plan()]);
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        diagram.subscribe_transform(move |_| sink.set(sink.get() + 1));
        let resized = Rc::new(Cell::new(0));
        let resize_sink = Rc::clone(&resized);
        diagram.subscribe_resize(move |_| resize_sink.set(resize_sink.get() + 1));

        let before = diagram.transform();
        assert!(diagram.apply_gesture(Gesture::Pan { dx: 5.0, dy: 0.0 }).is_some());
        diagram.resize(Viewport::new(640.0, 480.0));
        assert_eq!(diagram.transform().x, before.x + 5.0);
        assert_eq!(seen.get(), 0);
        assert_eq!(resized.get(), 0);

        diagram.mount();
        diagram.mount();
        diagram.apply_gesture(Gesture::Pan { dx: 5.0, dy: 0.0 });
        diagram.resize(Viewport::new(800.0, 600.0));
        assert_eq!(seen.get(), 1);
        assert_eq!(resized.get(), 1);

        // remounting does not bring back listeners released by unmount
        diagram.unmount();
        diagram.mount();
        diagram.apply_gesture(Gesture::Pan { dx: 5.0, dy: 0.0 });
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn rejects_non_finite_gap() {
        let mut diagram = diagram();
        diagram.load(&[plan(), RawNode::new("solo")]);
        let width = diagram.forest_bound().width;
        diagram.set_gap(f32::NAN);
        diagram.set_gap(f32::INFINITY);
        diagram.set_gap(-1.0);
        assert_eq!(diagram.forest_bound().width, width);
        assert!(diagram.forest_bound().width.is_finite());
        diagram.set_margin(NodeMargin {
            sibling_margin: f32::NAN,
            children_margin: 60.0,
        });
        assert_eq!(diagram.forest_bound().width, width);
        diagram.set_gap(0.0);
        assert_eq!(diagram.config().gap_between_trees, 0.0);
    }

    #[test]
    fn node_at_hits_rendered_boxes() {
        let mut diagram = diagram();
        diagram.load(&[RawNode::new("solo")]);
        let scene = diagram.scene();
        let t = scene.transform;
        let (sx, sy) = t.apply((100.0, 50.0));
        assert_eq!(scene.node_at(sx, sy).map(|n| n.index), Some(0));
        let (fx, fy) = t.apply((-500.0, -500.0));
        assert!(scene.node_at(fx, fy).is_none());
    }
}
