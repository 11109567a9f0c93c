use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use livemap::Error;
use livemap::layout::LayoutConfig;
use livemap::model::{EntityStatus, LayerKind, Snapshot};
use livemap::render::style;
use livemap::render::{
    Bounds, DisplayList, DragPhase, DrawCommand, FrameRequest, FrameState, LOADING_TEXT,
    Lifecycle, PointerTracker, RenderEngine, RenderHost, ResizeListener, Surface,
};
use pretty_assertions::assert_eq;

#[derive(Debug, Default)]
struct HostLog {
    requested: Vec<FrameRequest>,
    cancelled: Vec<FrameRequest>,
    observed: Vec<ResizeListener>,
    unobserved: Vec<ResizeListener>,
}

struct FakeHost {
    bounds: Bounds,
    surface_available: bool,
    next: u64,
    log: Rc<RefCell<HostLog>>,
}

impl FakeHost {
    fn new(left: f32, top: f32, width: f32, height: f32) -> (Self, Rc<RefCell<HostLog>>) {
        let log = Rc::new(RefCell::new(HostLog::default()));
        let host = Self {
            bounds: Bounds {
                left,
                top,
                width,
                height,
            },
            surface_available: true,
            next: 0,
            log: log.clone(),
        };
        (host, log)
    }
}

impl RenderHost for FakeHost {
    type Surface = DisplayList;

    fn create_surface(&mut self) -> Option<DisplayList> {
        self.surface_available.then(|| DisplayList::new(0.0, 0.0))
    }

    fn container_bounds(&self) -> Bounds {
        self.bounds
    }

    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        let request = FrameRequest(self.next);
        self.log.borrow_mut().requested.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.log.borrow_mut().cancelled.push(request);
    }

    fn observe_resize(&mut self) -> ResizeListener {
        self.next += 1;
        let listener = ResizeListener(self.next);
        self.log.borrow_mut().observed.push(listener);
        listener
    }

    fn unobserve_resize(&mut self, listener: ResizeListener) {
        self.log.borrow_mut().unobserved.push(listener);
    }
}

struct Harness {
    engine: RenderEngine<FakeHost>,
    log: Rc<RefCell<HostLog>>,
    state: Rc<RefCell<FrameState>>,
    selections: Rc<RefCell<Vec<Option<String>>>>,
}

impl Harness {
    fn new(host: FakeHost, log: Rc<RefCell<HostLog>>) -> Self {
        let state = Rc::new(RefCell::new(FrameState::default()));
        let selections = Rc::new(RefCell::new(Vec::new()));
        let reader = state.clone();
        let writer = selections.clone();
        let engine = RenderEngine::new(
            host,
            move || reader.borrow().clone(),
            move |id| writer.borrow_mut().push(id),
        )
        .unwrap();
        Self {
            engine,
            log,
            state,
            selections,
        }
    }

    fn started(left: f32, top: f32, width: f32, height: f32) -> Self {
        let (host, log) = FakeHost::new(left, top, width, height);
        let mut h = Self::new(host, log);
        h.engine.start();
        h
    }

    fn show(&self, json: &str, layer: LayerKind, selected: Option<&str>) {
        *self.state.borrow_mut() = FrameState {
            snapshot: Some(Arc::new(Snapshot::from_json(json).unwrap())),
            layer,
            selected: selected.map(str::to_string),
        };
    }

    fn pending(&self) -> FrameRequest {
        *self.log.borrow().requested.last().unwrap()
    }

    /// Plain click (press and release in place) at client coordinates.
    fn click(&mut self, x: f32, y: f32) {
        self.engine.on_pointer_down(x, y);
        self.engine.on_pointer_up();
        self.engine.on_click(x, y);
    }

    fn center_of(&self, id: &str) -> (f32, f32) {
        self.engine.last_layout()[id].center()
    }

    fn frame(&mut self) {
        let request = self.pending();
        self.engine.on_animation_frame(request);
    }
}

fn nine_districts() -> String {
    let items: Vec<String> = (0..9)
        .map(|i| format!(r#"{{"id": "d{i}", "name": "District {i}", "status": "online"}}"#))
        .collect();
    format!(r#"{{"layers": {{"city": {{"items": [{}]}}}}}}"#, items.join(","))
}

#[test]
fn draws_a_loading_placeholder_until_a_snapshot_arrives() {
    let mut h = Harness::started(0.0, 0.0, 640.0, 480.0);
    assert_eq!(h.engine.lifecycle(), Lifecycle::Running);
    h.frame();
    assert_eq!(h.engine.frames(), 1);
    assert_eq!(h.engine.surface().texts().collect::<Vec<_>>(), vec![LOADING_TEXT]);
    assert!(h.engine.last_layout().is_empty());
    assert_eq!(h.log.borrow().requested.len(), 2, "next frame scheduled");
}

#[test]
fn empty_snapshot_paints_only_the_background() {
    let mut h = Harness::started(0.0, 0.0, 640.0, 480.0);
    h.show(r#"{"layers": {"city": {"items": []}}}"#, LayerKind::City, None);
    h.frame();
    assert_eq!(
        h.engine.surface().commands(),
        &[DrawCommand::Clear(style::BACKGROUND)]
    );
    assert!(h.engine.last_layout().is_empty());
}

#[test]
fn clicks_pick_against_the_last_layout() {
    let mut h = Harness::started(100.0, 50.0, 900.0, 900.0);
    h.show(&nine_districts(), LayerKind::City, None);
    h.frame();
    assert_eq!(h.engine.last_layout().len(), 9);

    // Centre of the middle cell, in client coordinates.
    h.engine.on_pointer_down(100.0 + 450.0, 50.0 + 450.0);
    h.engine.on_pointer_up();
    h.engine.on_click(100.0 + 450.0, 50.0 + 450.0);

    // Padding between cells hits nothing.
    h.engine.on_pointer_down(100.0 + 10.0, 50.0 + 10.0);
    h.engine.on_pointer_up();
    h.engine.on_click(100.0 + 10.0, 50.0 + 10.0);

    assert_eq!(
        *h.selections.borrow(),
        vec![Some("d4".to_string()), None]
    );
}

#[test]
fn click_after_drag_does_not_select() {
    let mut h = Harness::started(0.0, 0.0, 900.0, 900.0);
    h.show(&nine_districts(), LayerKind::City, None);
    h.frame();

    h.engine.on_pointer_down(150.0, 150.0);
    h.engine.on_pointer_move(151.0, 151.0);
    h.engine.on_pointer_move(170.0, 150.0);
    h.engine.on_pointer_up();
    h.engine.on_click(170.0, 150.0);
    assert!(h.selections.borrow().is_empty());

    h.engine.on_pointer_down(150.0, 150.0);
    h.engine.on_pointer_move(151.0, 150.0);
    h.engine.on_pointer_up();
    h.engine.on_click(151.0, 150.0);
    assert_eq!(*h.selections.borrow(), vec![Some("d0".to_string())]);
}

#[test]
fn selected_entity_is_highlighted() {
    let mut h = Harness::started(0.0, 0.0, 900.0, 900.0);
    h.show(&nine_districts(), LayerKind::City, Some("d4"));
    h.frame();
    let rect = h.engine.last_layout()["d4"];
    let commands = h.engine.surface().commands();
    assert!(commands.contains(&DrawCommand::FillRect {
        rect,
        color: style::HIGHLIGHT
    }));
    assert!(commands.contains(&DrawCommand::StrokeRect {
        rect,
        width: style::SELECTED_BORDER_WIDTH,
        color: style::LABEL
    }));
    let highlighted = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { color, .. } if *color == style::HIGHLIGHT))
        .count();
    assert_eq!(highlighted, 1);
}

#[test]
fn selection_missing_from_the_layer_is_tolerated() {
    let mut h = Harness::started(0.0, 0.0, 900.0, 900.0);
    h.show(&nine_districts(), LayerKind::City, Some("gone"));
    h.frame();
    assert!(!h.engine.surface().commands().iter().any(|c| matches!(
        c,
        DrawCommand::FillRect { color, .. } if *color == style::HIGHLIGHT
    )));
}

#[test]
fn declared_but_unlisted_satellites_are_drawn_as_unknown() {
    let mut h = Harness::started(0.0, 0.0, 800.0, 800.0);
    h.show(
        r#"{"layers": {"space": {"planets": [{"id": "core", "satellites": ["ghost"]}]}}}"#,
        LayerKind::Space,
        None,
    );
    h.frame();
    let ghost = h.engine.last_layout()["ghost"];
    assert!(h.engine.surface().commands().contains(&DrawCommand::FillCircle {
        center: ghost.center(),
        radius: ghost.inner_radius(),
        color: style::status_color(EntityStatus::Unknown),
    }));
}

#[test]
fn teardown_cancels_and_detaches_once() {
    let mut h = Harness::started(0.0, 0.0, 640.0, 480.0);
    let pending = h.pending();
    h.engine.teardown();
    h.engine.teardown();
    assert_eq!(h.engine.lifecycle(), Lifecycle::TornDown);
    {
        let log = h.log.borrow();
        assert_eq!(log.cancelled, vec![pending]);
        assert_eq!(log.unobserved, log.observed);
        assert_eq!(log.unobserved.len(), 1);
    }

    h.engine.on_animation_frame(pending);
    assert_eq!(h.engine.frames(), 0, "no frame runs after teardown");
    h.engine.on_click(10.0, 10.0);
    assert!(h.selections.borrow().is_empty());

    let log = h.log.clone();
    drop(h);
    assert_eq!(log.borrow().cancelled.len(), 1, "drop after teardown is a no-op");
}

#[test]
fn dropping_a_running_engine_tears_it_down() {
    let h = Harness::started(0.0, 0.0, 640.0, 480.0);
    let pending = h.pending();
    let log = h.log.clone();
    drop(h);
    assert_eq!(log.borrow().cancelled, vec![pending]);
    assert_eq!(log.borrow().unobserved.len(), 1);
}

#[test]
fn stale_frame_requests_are_ignored() {
    let mut h = Harness::started(0.0, 0.0, 640.0, 480.0);
    h.engine.on_animation_frame(FrameRequest(999));
    assert_eq!(h.engine.frames(), 0);
    let first = h.pending();
    h.frame();
    h.engine.on_animation_frame(first);
    assert_eq!(h.engine.frames(), 1);
}

#[test]
fn resize_updates_the_surface_size() {
    let mut h = Harness::started(0.0, 0.0, 640.0, 480.0);
    assert_eq!(h.engine.surface().size(), (640.0, 480.0));
    h.engine.host_mut().bounds.width = 1024.0;
    h.engine.host_mut().bounds.height = 768.0;
    h.engine.on_container_resize();
    h.frame();
    assert_eq!(h.engine.surface().size(), (1024.0, 768.0));
}

#[test]
fn missing_surface_fails_construction() {
    let (mut host, _log) = FakeHost::new(0.0, 0.0, 10.0, 10.0);
    host.surface_available = false;
    let result = RenderEngine::new(host, FrameState::default, |_| {});
    assert!(matches!(result, Err(Error::SurfaceUnavailable)));
}

#[test]
fn pointer_tracker_threshold() {
    let mut pointer = PointerTracker::default();
    pointer.press(0.0, 0.0);
    assert!(!pointer.move_to(2.0, 2.0));
    assert_eq!(pointer.phase(), DragPhase::Pressed);
    assert!(pointer.move_to(3.0, 3.0));
    assert_eq!(pointer.phase(), DragPhase::Dragging);
    pointer.release();
    assert!(!pointer.take_click());
    assert!(pointer.take_click(), "suppression is consumed");
}

#[test]
fn clicks_pick_planets_and_satellites() {
    let mut h = Harness::started(20.0, 30.0, 800.0, 800.0);
    h.show(
        r#"{"layers": {"space": {
            "planets": [{"id": "core", "type": "core", "satellites": ["m1"]}],
            "satellites": [{"id": "m1", "status": "online"}]
        }}}"#,
        LayerKind::Space,
        None,
    );
    h.frame();

    let (px, py) = h.center_of("core");
    let (sx, sy) = h.center_of("m1");
    h.click(px + 20.0, py + 30.0);
    h.click(sx + 20.0, sy + 30.0);
    h.click(20.0 + 5.0, 30.0 + 5.0);
    assert_eq!(
        *h.selections.borrow(),
        vec![Some("core".to_string()), Some("m1".to_string()), None]
    );
}

#[test]
fn clicks_pick_agents_on_the_spiral() {
    let mut h = Harness::started(0.0, 0.0, 400.0, 400.0);
    h.show(
        r#"{"layers": {"agents": {"items": [{"id": "a0"}, {"id": "a1"}, {"id": "a2"}, {"id": "a3"}]}}}"#,
        LayerKind::Agents,
        None,
    );
    h.frame();

    let (x0, y0) = h.center_of("a0");
    let (x3, y3) = h.center_of("a3");
    h.click(x0, y0);
    h.click(x3, y3);
    assert_eq!(
        *h.selections.borrow(),
        vec![Some("a0".to_string()), Some("a3".to_string())]
    );
}

#[test]
fn nodes_are_painted_by_load() {
    let mut h = Harness::started(0.0, 0.0, 600.0, 600.0);
    h.show(
        r#"{"layers": {"nodes": {"items": [
            {"id": "cool", "status": "online", "load": 0.2},
            {"id": "hot", "status": "online", "load": 0.9}
        ]}}}"#,
        LayerKind::Nodes,
        None,
    );
    h.frame();

    let cool = h.engine.last_layout()["cool"];
    let hot = h.engine.last_layout()["hot"];
    assert!((cool.width - 48.0).abs() < 1e-3, "{}", cool.width);
    assert!((hot.width - 76.0).abs() < 1e-3, "{}", hot.width);
    let commands = h.engine.surface().commands();
    assert!(commands.contains(&DrawCommand::FillRect {
        rect: cool,
        color: style::load_color(0.2, EntityStatus::Online),
    }));
    assert!(commands.contains(&DrawCommand::FillRect {
        rect: hot,
        color: style::load_color(0.9, EntityStatus::Online),
    }));
    assert_ne!(
        style::load_color(0.2, EntityStatus::Online),
        style::load_color(0.9, EntityStatus::Online)
    );
}

#[test]
fn planet_with_a_non_ascii_colour_falls_back() {
    let mut h = Harness::started(0.0, 0.0, 800.0, 800.0);
    h.show(
        r##"{"layers": {"space": {"planets": [{"id": "p", "color": "#aé€"}]}}}"##,
        LayerKind::Space,
        None,
    );
    h.frame();
    let planet = h.engine.last_layout()["p"];
    assert!(h.engine.surface().commands().contains(&DrawCommand::FillCircle {
        center: planet.center(),
        radius: planet.inner_radius(),
        color: style::status_color(EntityStatus::Unknown),
    }));
    assert_eq!(h.log.borrow().requested.len(), 2, "loop keeps running");
}

#[test]
fn custom_layout_config_is_used() {
    let (host, log) = FakeHost::new(0.0, 0.0, 900.0, 900.0);
    let state = Rc::new(RefCell::new(FrameState::default()));
    let reader = state.clone();
    let mut engine = RenderEngine::new(host, move || reader.borrow().clone(), |_| {})
        .unwrap()
        .with_layout_config(LayoutConfig {
            grid_padding: 0.0,
            ..LayoutConfig::default()
        });
    engine.start();
    *state.borrow_mut() = FrameState {
        snapshot: Some(Arc::new(
            Snapshot::from_json(r#"{"layers": {"city": {"items": [{"id": "only"}]}}}"#).unwrap(),
        )),
        layer: LayerKind::City,
        selected: None,
    };
    let request = *log.borrow().requested.last().unwrap();
    engine.on_animation_frame(request);
    assert_eq!(engine.last_layout()["only"].width, 900.0);
}
