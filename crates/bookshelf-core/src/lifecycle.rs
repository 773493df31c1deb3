//! Scene lifecycle: build, run and tear down a shelf scene on a render host
//!
//! The lifecycle is an explicit state machine:
//!
//! ```text
//! Unmounted -> Building -> Running -> TearingDown -> Unmounted
//! ```
//!
//! A snapshot with a new identity always tears the running scene down before
//! the next build starts, so at most one build is ever active. Everything the
//! renderer owns (surface, uploaded scene, frame callback, listeners) is
//! reached through the [`RenderHost`] trait, which keeps this module free of
//! any GPU or windowing code.

use std::sync::Arc;

use glam::Vec2;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::camera::OrbitCamera;
use crate::config::{BookshelfConfig, HoverConfig, StageConfig};
use crate::layout::{SceneGraph, ShelfLayoutBuilder};
use crate::model::{ShelfSnapshot, TaskId};
use crate::picking::{CursorAffordance, HoverEngine, HoverUpdate, PoseChange};
use crate::texture::{TextureCache, TextureSynthesizer};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("rendering unsupported: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Unmounted,
    Building,
    Running,
    TearingDown,
}

/// Handle of a scheduled per-frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Handle of an attached input listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerLeave,
    Wheel,
    Resize,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 6] = [
        ListenerKind::PointerDown,
        ListenerKind::PointerMove,
        ListenerKind::PointerUp,
        ListenerKind::PointerLeave,
        ListenerKind::Wheel,
        ListenerKind::Resize,
    ];
}

/// Input delivered by the host's listeners; positions in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Vec2 },
    PointerMove { pos: Vec2 },
    PointerUp { pos: Vec2 },
    /// Press ended somewhere the shelf does not own; never a click
    PointerCancel,
    PointerLeft,
    Wheel { delta_y: f32 },
    Resize { width: u32, height: u32 },
}

/// Everything a host needs to upload a freshly built scene
pub struct SceneBlueprint<'a> {
    pub graph: &'a SceneGraph,
    pub textures: &'a TextureCache,
    pub camera: &'a OrbitCamera,
    pub stage: &'a StageConfig,
    pub filler_opacity: f32,
}

/// Renderer-side operations the lifecycle drives
///
/// `Scene` is whatever the host keeps for an uploaded scene (entity ids, GPU
/// buffers). It is handed back in `release_scene` exactly once.
pub trait RenderHost {
    type Scene;

    /// Current container size in pixels; zero while not laid out
    fn viewport_size(&self) -> (u32, u32);

    fn acquire_surface(&mut self, width: u32, height: u32) -> Result<(), LifecycleError>;

    fn upload_scene(&mut self, blueprint: &SceneBlueprint<'_>) -> Result<Self::Scene, LifecycleError>;

    fn start_frame_loop(&mut self) -> FrameToken;

    fn cancel_frame_loop(&mut self, token: FrameToken);

    fn attach_listener(&mut self, kind: ListenerKind) -> ListenerId;

    fn detach_listener(&mut self, id: ListenerId);

    fn resize_surface(&mut self, width: u32, height: u32, camera: &OrbitCamera);

    fn apply_pose(&mut self, scene: &mut Self::Scene, change: &PoseChange);

    fn set_cursor(&mut self, cursor: CursorAffordance);

    fn draw(&mut self, scene: &Self::Scene, camera: &OrbitCamera);

    fn release_scene(&mut self, scene: Self::Scene);

    fn release_surface(&mut self);
}

pub type TaskSelectedCallback = Box<dyn FnMut(&TaskId) + Send + Sync>;

pub struct SceneLifecycle<S> {
    phase: Phase,
    snapshot: Option<Arc<ShelfSnapshot>>,
    build_pending: bool,
    scene: Option<S>,
    graph: Option<SceneGraph>,
    surface_acquired: bool,
    frame: Option<FrameToken>,
    listeners: Vec<ListenerId>,
    camera: OrbitCamera,
    hover: HoverEngine,
    pointer: Option<Vec2>,
    press: Option<Vec2>,
    builder: ShelfLayoutBuilder,
    synthesizer: TextureSynthesizer,
    textures: TextureCache,
    hover_config: HoverConfig,
    stage: StageConfig,
    on_task_selected: Option<TaskSelectedCallback>,
}

impl<S> SceneLifecycle<S> {
    pub fn new(config: &BookshelfConfig) -> Self {
        Self {
            phase: Phase::Unmounted,
            snapshot: None,
            build_pending: false,
            scene: None,
            graph: None,
            surface_acquired: false,
            frame: None,
            listeners: Vec::new(),
            camera: OrbitCamera::new(config.camera.clone()),
            hover: HoverEngine::default(),
            pointer: None,
            press: None,
            builder: ShelfLayoutBuilder::new(config.layout.clone()),
            synthesizer: TextureSynthesizer::new(config.textures.clone()),
            textures: TextureCache::new(),
            hover_config: config.hover.clone(),
            stage: config.stage.clone(),
            on_task_selected: None,
        }
    }

    /// Register the single outward callback
    pub fn on_task_selected(&mut self, callback: impl FnMut(&TaskId) + Send + Sync + 'static) {
        self.on_task_selected = Some(Box::new(callback));
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn hover(&self) -> &HoverEngine {
        &self.hover
    }

    pub fn graph(&self) -> Option<&SceneGraph> {
        self.graph.as_ref()
    }

    pub fn snapshot(&self) -> Option<&Arc<ShelfSnapshot>> {
        self.snapshot.as_ref()
    }

    pub fn active_frame(&self) -> Option<FrameToken> {
        self.frame
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_build_pending(&self) -> bool {
        self.build_pending
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "Scene lifecycle transition");
            self.phase = phase;
        }
    }

    /// Show `snapshot`; a different snapshot identity forces teardown then rebuild
    pub fn mount<H>(&mut self, host: &mut H, snapshot: Arc<ShelfSnapshot>) -> Result<(), LifecycleError>
    where
        H: RenderHost<Scene = S>,
    {
        if let Some(current) = &self.snapshot {
            if Arc::ptr_eq(current, &snapshot) {
                return Ok(());
            }
        }

        self.teardown(host);
        self.snapshot = Some(snapshot);
        self.build_pending = true;
        self.try_build(host)
    }

    /// Stop showing anything; safe to call at any time, any number of times
    pub fn unmount<H>(&mut self, host: &mut H)
    where
        H: RenderHost<Scene = S>,
    {
        self.teardown(host);
        self.snapshot = None;
        self.build_pending = false;
    }

    /// One display refresh: retry a deferred build, then run the frame callback
    pub fn tick<H>(&mut self, host: &mut H) -> Result<(), LifecycleError>
    where
        H: RenderHost<Scene = S>,
    {
        if self.build_pending {
            self.try_build(host)?;
        }
        if let Some(token) = self.frame {
            self.frame(host, token);
        }
        Ok(())
    }

    /// Frame callback body; stale tokens from a cancelled loop are ignored
    pub fn frame<H>(&mut self, host: &mut H, token: FrameToken) -> bool
    where
        H: RenderHost<Scene = S>,
    {
        if self.phase != Phase::Running || self.frame != Some(token) {
            return false;
        }
        self.refresh_hover(host);
        if let Some(scene) = &self.scene {
            host.draw(scene, &self.camera);
        }
        true
    }

    /// Route one listener event; returns the selected task for a click on a book
    pub fn handle_input<H>(&mut self, host: &mut H, event: InputEvent) -> Option<TaskId>
    where
        H: RenderHost<Scene = S>,
    {
        if self.phase != Phase::Running {
            return None;
        }

        match event {
            InputEvent::PointerDown { pos } => {
                self.pointer = Some(pos);
                self.press = Some(pos);
                self.camera.pointer_down(pos);
                None
            }
            InputEvent::PointerMove { pos } => {
                self.pointer = Some(pos);
                self.camera.pointer_move(pos);
                None
            }
            InputEvent::PointerUp { pos } => {
                self.pointer = Some(pos);
                self.camera.pointer_up();
                let press = self.press.take()?;
                if press.distance(pos) > self.hover_config.click_slop {
                    return None;
                }
                self.refresh_hover(host);
                self.select_hovered()
            }
            InputEvent::PointerCancel => {
                self.press = None;
                self.camera.pointer_up();
                None
            }
            InputEvent::PointerLeft => {
                self.pointer = None;
                let update = self.hover.clear();
                self.apply_hover(host, update);
                None
            }
            InputEvent::Wheel { delta_y } => {
                self.camera.wheel(delta_y);
                None
            }
            InputEvent::Resize { width, height } => {
                if width > 0 && height > 0 {
                    self.camera.set_viewport(width as f32, height as f32);
                    host.resize_surface(width, height, &self.camera);
                }
                None
            }
        }
    }

    fn select_hovered(&mut self) -> Option<TaskId> {
        let id = self.hover.click()?;
        info!(task = %id, "Task selected");
        if let Some(callback) = self.on_task_selected.as_mut() {
            callback(&id);
        }
        Some(id)
    }

    fn refresh_hover<H>(&mut self, host: &mut H)
    where
        H: RenderHost<Scene = S>,
    {
        let ray = self.pointer.map(|p| self.camera.ray_through(p));
        let update = self.hover.update(ray.as_ref());
        self.apply_hover(host, update);
    }

    fn apply_hover<H>(&mut self, host: &mut H, update: HoverUpdate)
    where
        H: RenderHost<Scene = S>,
    {
        if let Some(scene) = self.scene.as_mut() {
            for change in &update.poses {
                host.apply_pose(scene, change);
            }
        }
        if let Some(cursor) = update.cursor {
            host.set_cursor(cursor);
        }
    }

    fn try_build<H>(&mut self, host: &mut H) -> Result<(), LifecycleError>
    where
        H: RenderHost<Scene = S>,
    {
        let (width, height) = host.viewport_size();
        if width == 0 || height == 0 {
            debug!("Viewport has no size yet, deferring scene build");
            return Ok(());
        }
        let Some(snapshot) = self.snapshot.clone() else {
            self.build_pending = false;
            return Ok(());
        };

        self.build_pending = false;
        self.set_phase(Phase::Building);

        if let Err(e) = host.acquire_surface(width, height) {
            warn!(error = %e, "Could not acquire a rendering surface");
            self.abort_build(host);
            return Err(e);
        }
        self.surface_acquired = true;
        self.camera.set_viewport(width as f32, height as f32);

        let graph = self.builder.build_snapshot(&snapshot);
        for request in graph.material_requests() {
            self.textures.get_or_synthesize(&self.synthesizer, &request);
        }

        let blueprint = SceneBlueprint {
            graph: &graph,
            textures: &self.textures,
            camera: &self.camera,
            stage: &self.stage,
            filler_opacity: self.builder.config().filler_opacity,
        };
        let scene = match host.upload_scene(&blueprint) {
            Ok(scene) => scene,
            Err(e) => {
                warn!(error = %e, "Scene upload failed");
                self.abort_build(host);
                return Err(e);
            }
        };

        self.hover = HoverEngine::new(&graph.books, &self.hover_config);
        self.scene = Some(scene);
        self.graph = Some(graph);
        self.listeners = ListenerKind::ALL
            .iter()
            .map(|kind| host.attach_listener(*kind))
            .collect();
        self.frame = Some(host.start_frame_loop());
        self.set_phase(Phase::Running);

        info!(
            width,
            height,
            books = self.graph.as_ref().map(|g| g.books.len()).unwrap_or(0),
            textures = self.textures.len(),
            "Shelf scene running"
        );
        Ok(())
    }

    /// Fail fast: undo a partial build and leave nothing behind
    fn abort_build<H>(&mut self, host: &mut H)
    where
        H: RenderHost<Scene = S>,
    {
        self.teardown(host);
        self.snapshot = None;
        self.build_pending = false;
    }

    fn teardown<H>(&mut self, host: &mut H)
    where
        H: RenderHost<Scene = S>,
    {
        let holds_resources = self.frame.is_some()
            || !self.listeners.is_empty()
            || self.scene.is_some()
            || self.surface_acquired;
        if self.phase == Phase::Unmounted && !holds_resources {
            return;
        }

        self.set_phase(Phase::TearingDown);

        if let Some(token) = self.frame.take() {
            host.cancel_frame_loop(token);
        }
        for id in self.listeners.drain(..) {
            host.detach_listener(id);
        }
        if let Some(scene) = self.scene.take() {
            host.release_scene(scene);
        }
        if self.surface_acquired {
            host.release_surface();
            self.surface_acquired = false;
        }

        self.graph = None;
        self.hover = HoverEngine::default();
        self.textures.clear();
        self.pointer = None;
        self.press = None;
        self.camera.pointer_up();

        self.set_phase(Phase::Unmounted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::config::TextureConfig;
    use crate::model::{Category, Task, Timeframe};
    use crate::picking::Pose;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Acquire,
        Upload,
        Start(u64),
        Cancel(u64),
        Attach,
        Detach,
        Resize(u32, u32),
        Pose(TaskId),
        Cursor(CursorAffordance),
        Draw,
        ReleaseScene,
        ReleaseSurface,
    }

    struct FakeScene {
        poses: HashMap<TaskId, Pose>,
    }

    #[derive(Default)]
    struct FakeHost {
        size: (u32, u32),
        unsupported: bool,
        calls: Vec<Call>,
        next_id: u64,
        frames: HashSet<u64>,
        listeners: HashSet<u64>,
        surface: bool,
        live_scenes: usize,
    }

    impl FakeHost {
        fn sized(width: u32, height: u32) -> Self {
            Self {
                size: (width, height),
                ..Default::default()
            }
        }

        fn count(&self, call: &Call) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }

        fn next(&mut self) -> u64 {
            self.next_id += 1;
            self.next_id
        }
    }

    impl RenderHost for FakeHost {
        type Scene = FakeScene;

        fn viewport_size(&self) -> (u32, u32) {
            self.size
        }

        fn acquire_surface(&mut self, _width: u32, _height: u32) -> Result<(), LifecycleError> {
            if self.unsupported {
                return Err(LifecycleError::Unsupported("no adapter".into()));
            }
            assert!(!self.surface, "surface acquired twice");
            self.surface = true;
            self.calls.push(Call::Acquire);
            Ok(())
        }

        fn upload_scene(&mut self, blueprint: &SceneBlueprint<'_>) -> Result<FakeScene, LifecycleError> {
            for request in blueprint.graph.material_requests() {
                assert!(blueprint.textures.get(&request).is_some());
            }
            self.calls.push(Call::Upload);
            self.live_scenes += 1;
            assert_eq!(self.live_scenes, 1, "two scenes alive at once");
            Ok(FakeScene {
                poses: HashMap::new(),
            })
        }

        fn start_frame_loop(&mut self) -> FrameToken {
            let id = self.next();
            self.frames.insert(id);
            self.calls.push(Call::Start(id));
            FrameToken(id)
        }

        fn cancel_frame_loop(&mut self, token: FrameToken) {
            self.frames.remove(&token.0);
            self.calls.push(Call::Cancel(token.0));
        }

        fn attach_listener(&mut self, _kind: ListenerKind) -> ListenerId {
            let id = self.next();
            self.listeners.insert(id);
            self.calls.push(Call::Attach);
            ListenerId(id)
        }

        fn detach_listener(&mut self, id: ListenerId) {
            assert!(self.listeners.remove(&id.0), "unknown listener");
            self.calls.push(Call::Detach);
        }

        fn resize_surface(&mut self, width: u32, height: u32, _camera: &OrbitCamera) {
            self.size = (width, height);
            self.calls.push(Call::Resize(width, height));
        }

        fn apply_pose(&mut self, scene: &mut FakeScene, change: &PoseChange) {
            scene.poses.insert(change.task_id.clone(), change.pose);
            self.calls.push(Call::Pose(change.task_id.clone()));
        }

        fn set_cursor(&mut self, cursor: CursorAffordance) {
            self.calls.push(Call::Cursor(cursor));
        }

        fn draw(&mut self, _scene: &FakeScene, _camera: &OrbitCamera) {
            assert!(self.surface, "draw without a surface");
            self.calls.push(Call::Draw);
        }

        fn release_scene(&mut self, _scene: FakeScene) {
            self.live_scenes -= 1;
            self.calls.push(Call::ReleaseScene);
        }

        fn release_surface(&mut self) {
            self.surface = false;
            self.calls.push(Call::ReleaseSurface);
        }
    }

    fn small_config() -> BookshelfConfig {
        BookshelfConfig {
            textures: TextureConfig {
                spine_size: [16, 64],
                wood_size: [32, 32],
                placeholder_size: [8, 32],
                label_size: [64, 16],
                glyph_scale: 1,
            },
            ..Default::default()
        }
    }

    fn snapshot() -> Arc<ShelfSnapshot> {
        Arc::new(ShelfSnapshot::from_tasks(
            vec![Category::new("Work", Rgb::new(0x25, 0x63, 0xEB))],
            vec![
                Task::new("t1", "Plan", "Work", Timeframe::Quick),
                Task::new("t2", "Build", "Work", Timeframe::Extended),
            ],
        ))
    }

    fn lifecycle() -> SceneLifecycle<FakeScene> {
        SceneLifecycle::new(&small_config())
    }

    #[test]
    fn test_mount_runs_scene() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();

        assert_eq!(lc.phase(), Phase::Running);
        assert_eq!(host.frames.len(), 1);
        assert_eq!(host.listeners.len(), ListenerKind::ALL.len());
        assert_eq!(lc.graph().unwrap().books.len(), 2);

        lc.tick(&mut host).unwrap();
        assert_eq!(host.count(&Call::Draw), 1);
    }

    #[test]
    fn test_same_snapshot_does_not_rebuild() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        let snap = snapshot();
        lc.mount(&mut host, snap.clone()).unwrap();
        lc.mount(&mut host, snap).unwrap();
        assert_eq!(host.count(&Call::Upload), 1);
    }

    #[test]
    fn test_new_snapshot_tears_down_before_build() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        lc.mount(&mut host, snapshot()).unwrap();

        assert_eq!(host.count(&Call::Upload), 2);
        let release = host.calls.iter().position(|c| *c == Call::ReleaseSurface).unwrap();
        let second_acquire = host
            .calls
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Call::Acquire)
            .nth(1)
            .map(|(i, _)| i)
            .unwrap();
        assert!(release < second_acquire);
        assert_eq!(host.frames.len(), 1);
    }

    #[test]
    fn test_teardown_order() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        host.calls.clear();
        lc.unmount(&mut host);

        let cancel = host.calls.iter().position(|c| matches!(c, Call::Cancel(_))).unwrap();
        let first_detach = host.calls.iter().position(|c| *c == Call::Detach).unwrap();
        let release_scene = host.calls.iter().position(|c| *c == Call::ReleaseScene).unwrap();
        let release_surface = host.calls.iter().position(|c| *c == Call::ReleaseSurface).unwrap();
        assert!(cancel < first_detach);
        assert!(first_detach < release_scene);
        assert!(release_scene < release_surface);
        assert_eq!(lc.phase(), Phase::Unmounted);
    }

    #[test]
    fn test_rapid_remount_leaves_one_loop_and_no_leaks() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        lc.unmount(&mut host);
        lc.mount(&mut host, snapshot()).unwrap();

        assert_eq!(host.frames.len(), 1);
        assert_eq!(lc.active_frame().map(|t| t.0), host.frames.iter().next().copied());
        assert_eq!(host.listeners.len(), lc.listener_count());

        lc.unmount(&mut host);
        assert!(host.frames.is_empty());
        assert!(host.listeners.is_empty());
        assert!(!host.surface);
        assert_eq!(host.live_scenes, 0);
    }

    #[test]
    fn test_stale_frame_callback_is_ignored() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        let old = lc.active_frame().unwrap();
        lc.unmount(&mut host);

        assert!(!lc.frame(&mut host, old));
        lc.mount(&mut host, snapshot()).unwrap();
        assert!(!lc.frame(&mut host, old));
        assert_eq!(host.count(&Call::Draw), 0);

        let current = lc.active_frame().unwrap();
        assert!(lc.frame(&mut host, current));
        assert_eq!(host.count(&Call::Draw), 1);
    }

    #[test]
    fn test_teardown_idempotent() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.unmount(&mut host);
        assert!(host.calls.is_empty());

        lc.mount(&mut host, snapshot()).unwrap();
        lc.unmount(&mut host);
        let after_first = host.calls.len();
        lc.unmount(&mut host);
        assert_eq!(host.calls.len(), after_first);
        assert_eq!(host.count(&Call::ReleaseSurface), 1);
    }

    #[test]
    fn test_zero_viewport_defers_build() {
        let mut host = FakeHost::sized(0, 0);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        assert_eq!(lc.phase(), Phase::Unmounted);
        assert!(lc.is_build_pending());
        assert!(host.calls.is_empty());

        lc.tick(&mut host).unwrap();
        assert!(host.calls.is_empty());

        host.size = (640, 480);
        lc.tick(&mut host).unwrap();
        assert_eq!(lc.phase(), Phase::Running);
        assert!(!lc.is_build_pending());
        assert_eq!(lc.camera().viewport(), Vec2::new(640.0, 480.0));
    }

    #[test]
    fn test_unmount_while_deferred() {
        let mut host = FakeHost::sized(0, 0);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        lc.unmount(&mut host);
        host.size = (640, 480);
        lc.tick(&mut host).unwrap();
        assert_eq!(lc.phase(), Phase::Unmounted);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_unsupported_surface_fails_fast() {
        let mut host = FakeHost {
            unsupported: true,
            ..FakeHost::sized(800, 500)
        };
        let mut lc = lifecycle();
        let err = lc.mount(&mut host, snapshot()).unwrap_err();
        assert!(matches!(err, LifecycleError::Unsupported(_)));
        assert_eq!(lc.phase(), Phase::Unmounted);
        assert!(host.calls.is_empty());
        assert!(lc.graph().is_none());
        assert!(lc.active_frame().is_none());

        lc.unmount(&mut host);
        lc.tick(&mut host).unwrap();
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_resize_does_not_rebuild() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        lc.handle_input(&mut host, InputEvent::Resize { width: 1024, height: 768 });
        lc.handle_input(&mut host, InputEvent::Resize { width: 0, height: 768 });

        assert_eq!(host.count(&Call::Upload), 1);
        assert_eq!(host.count(&Call::Resize(1024, 768)), 1);
        assert_eq!(host.count(&Call::Resize(0, 768)), 0);
        assert_eq!(lc.camera().aspect(), 1024.0 / 768.0);
    }

    #[test]
    fn test_click_on_book_selects_once() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = selected.clone();
        lc.on_task_selected(move |id| sink.lock().unwrap().push(id.clone()));
        lc.mount(&mut host, snapshot()).unwrap();

        let target = lc.graph().unwrap().book(&TaskId::new("t2")).unwrap().center;
        let pixel = lc.camera().project(target).unwrap();

        lc.handle_input(&mut host, InputEvent::PointerMove { pos: pixel });
        lc.tick(&mut host).unwrap();
        assert_eq!(lc.hover().hovered(), Some(&TaskId::new("t2")));
        assert!(host.calls.contains(&Call::Cursor(CursorAffordance::Pointer)));

        lc.handle_input(&mut host, InputEvent::PointerDown { pos: pixel });
        let result = lc.handle_input(&mut host, InputEvent::PointerUp { pos: pixel });

        assert_eq!(result, Some(TaskId::new("t2")));
        assert_eq!(*selected.lock().unwrap(), vec![TaskId::new("t2")]);
    }

    #[test]
    fn test_drag_is_not_click() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        let selected = Arc::new(Mutex::new(0usize));
        let sink = selected.clone();
        lc.on_task_selected(move |_| *sink.lock().unwrap() += 1);
        lc.mount(&mut host, snapshot()).unwrap();

        let target = lc.graph().unwrap().books[0].center;
        let pixel = lc.camera().project(target).unwrap();
        let azimuth = lc.camera().azimuth;

        lc.handle_input(&mut host, InputEvent::PointerDown { pos: pixel });
        lc.handle_input(&mut host, InputEvent::PointerMove { pos: pixel + Vec2::new(40.0, 0.0) });
        lc.handle_input(&mut host, InputEvent::PointerUp { pos: pixel + Vec2::new(40.0, 0.0) });

        assert_eq!(*selected.lock().unwrap(), 0);
        assert!(lc.camera().azimuth < azimuth);
        assert!(!lc.camera().is_dragging());
    }

    #[test]
    fn test_cancelled_press_is_not_click() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        let pixel = lc.camera().project(lc.graph().unwrap().books[0].center).unwrap();

        lc.handle_input(&mut host, InputEvent::PointerDown { pos: pixel });
        lc.handle_input(&mut host, InputEvent::PointerCancel);
        assert!(!lc.camera().is_dragging());
        assert_eq!(lc.handle_input(&mut host, InputEvent::PointerUp { pos: pixel }), None);
    }

    #[test]
    fn test_click_on_empty_space_is_noop() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        let corner = Vec2::new(1.0, 1.0);
        lc.handle_input(&mut host, InputEvent::PointerDown { pos: corner });
        assert_eq!(lc.handle_input(&mut host, InputEvent::PointerUp { pos: corner }), None);
    }

    #[test]
    fn test_pointer_leave_clears_hover() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        lc.mount(&mut host, snapshot()).unwrap();
        let target = lc.graph().unwrap().books[0].center;
        let pixel = lc.camera().project(target).unwrap();
        lc.handle_input(&mut host, InputEvent::PointerMove { pos: pixel });
        lc.tick(&mut host).unwrap();
        assert!(lc.hover().hovered().is_some());

        lc.handle_input(&mut host, InputEvent::PointerLeft);
        assert!(lc.hover().hovered().is_none());
        assert_eq!(host.calls.last(), Some(&Call::Cursor(CursorAffordance::Default)));
    }

    #[test]
    fn test_input_ignored_when_not_running() {
        let mut host = FakeHost::sized(800, 500);
        let mut lc = lifecycle();
        let distance = lc.camera().distance;
        lc.handle_input(&mut host, InputEvent::Wheel { delta_y: 300.0 });
        assert_eq!(lc.camera().distance, distance);

        lc.mount(&mut host, snapshot()).unwrap();
        lc.handle_input(&mut host, InputEvent::Wheel { delta_y: 300.0 });
        assert!(lc.camera().distance > distance);
    }
}
