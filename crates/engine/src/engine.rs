use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use tileview_assets::{LoadTicket, ModelLibrary, PreloadBarrier, Readiness, TextureSet};
use tileview_camera::{CameraState, CameraTransform, ScreenRect, SurfaceRect};
use tileview_input::{Action, Interaction, PointerEvent, ZoomDirection};
use tileview_kernel::{Building, Tile, World};
use tileview_persist::{KvStore, load_json, save_json};
use tileview_render::{
    CacheKey, CameraView, Frame, HoverOverlay, LabelLine, Layer, RenderBackend, RenderCache,
};
use tileview_stream::ModelInstancer;

use crate::config::EngineConfig;
use crate::draw::{Scene, WalkStats};
use crate::error::EngineError;

/// What a redraw request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Textures are still loading (or failed); nothing was presented.
    NotReady,
    /// No world has been loaded yet.
    NoWorld,
    /// Terrain came from the render cache.
    Cached,
    /// Terrain was drawn by a full walk and stored in the cache.
    Walked(WalkStats),
}

impl DrawOutcome {
    pub fn presented(&self) -> bool {
        matches!(self, Self::Cached | Self::Walked(_))
    }
}

/// The tile under a screen position and the building standing on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickedTile<'a> {
    pub tile: &'a Tile,
    pub building: Option<&'a Building>,
}

/// Response to one pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerResponse {
    /// Redraw performed immediately (button press or release, leave).
    pub outcome: Option<DrawOutcome>,
    /// Call [`Engine::on_animation_frame`] at the next display refresh.
    pub request_frame: bool,
}

/// One map view: owns the world, the camera and the render state, and draws
/// through a [`RenderBackend`].
///
/// Single-threaded. Every piece of state is a field; several engines can
/// coexist.
pub struct Engine<B: RenderBackend> {
    config: EngineConfig,
    backend: B,
    world: Option<World>,
    world_fingerprint: u64,
    transform: CameraTransform,
    camera: CameraState,
    surface: SurfaceRect,
    textures: TextureSet,
    models: ModelLibrary,
    barrier: Option<PreloadBarrier>,
    ready: Rc<Cell<bool>>,
    /// A draw was refused while not ready and should happen once ready.
    deferred_draw: bool,
    cache: RenderCache<Frame>,
    instancer: ModelInstancer,
    interaction: Interaction,
    /// Client position of the hover overlay, if shown.
    hover: Option<Vec2>,
    store: Option<Box<dyn KvStore>>,
}

impl<B: RenderBackend> Engine<B> {
    /// Build an engine. Fails if a model names a texture the set lacks.
    ///
    /// Nothing is presented until [`begin_preload`](Self::begin_preload) was
    /// called and all of its tickets completed.
    pub fn new(
        config: EngineConfig,
        backend: B,
        textures: TextureSet,
        models: ModelLibrary,
    ) -> Result<Self, EngineError> {
        models.validate_textures(&textures)?;
        let transform = CameraTransform::new(config.camera.clone(), 1);
        let surface = SurfaceRect::square(config.camera.map_size);
        let instancer = ModelInstancer::new(config.culling.clone());
        Ok(Self {
            config,
            backend,
            world: None,
            world_fingerprint: 0,
            transform,
            camera: CameraState::default(),
            surface,
            textures,
            models,
            barrier: None,
            ready: Rc::new(Cell::new(false)),
            deferred_draw: false,
            cache: RenderCache::new(),
            instancer,
            interaction: Interaction::new(),
            hover: None,
            store: None,
        })
    }

    /// Engine with the standard texture set and the built-in models.
    pub fn with_defaults(config: EngineConfig, backend: B) -> Result<Self, EngineError> {
        Self::new(config, backend, TextureSet::standard(), ModelLibrary::builtin()?)
    }

    /// Attach a store and restore the last persisted camera from it.
    pub fn with_store(mut self, store: Box<dyn KvStore>) -> Self {
        match load_json::<CameraState>(store.as_ref(), &self.config.camera_key) {
            Ok(Some(mut camera)) => {
                self.transform.clamp(&mut camera);
                tracing::info!(offset = ?camera.offset, zoom = camera.zoom, "camera restored");
                self.camera = camera;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("ignoring persisted camera: {e}"),
        }
        self.store = Some(store);
        self
    }

    /// Start loading every texture. The host completes the returned tickets
    /// as its loads finish; drawing is withheld until all of them have.
    pub fn begin_preload(&mut self) -> Vec<LoadTicket> {
        let ready = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ready);
        let (barrier, tickets) = PreloadBarrier::preload(&self.textures, move || flag.set(true));
        self.ready = ready;
        self.barrier = Some(barrier);
        tickets
    }

    pub fn readiness(&self) -> Readiness {
        match &self.barrier {
            Some(barrier) => barrier.readiness(),
            None => Readiness::Pending {
                loaded: 0,
                total: self.textures.resource_count(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    /// Replace the world. Clears every cached frame and model instance, keeps
    /// the camera, and redraws.
    pub fn load_world(&mut self, world: World) -> DrawOutcome {
        tracing::info!(
            resolution = world.resolution(),
            tiles = world.tiles().len(),
            buildings = world.buildings().len(),
            "world loaded"
        );
        self.transform = CameraTransform::new(self.config.camera.clone(), world.resolution());
        self.transform.clamp(&mut self.camera);
        self.world_fingerprint = world.fingerprint();
        self.cache.invalidate_all();
        self.instancer.clear(&mut self.backend);
        for layer in Layer::ALL {
            self.backend.clear(layer);
        }
        self.hover = None;

        if let Some(store) = self.store.as_mut()
            && let Err(e) = save_json(store.as_mut(), &self.config.world_key, &world)
        {
            tracing::warn!("failed to cache world: {e}");
        }
        self.world = Some(world);
        self.redraw(false)
    }

    /// Load the world cached in the attached store, if there is one.
    pub fn restore_world(&mut self) -> Result<Option<DrawOutcome>, EngineError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(None);
        };
        let Some(world) = load_json::<World>(store.as_ref(), &self.config.world_key)? else {
            return Ok(None);
        };
        Ok(Some(self.load_world(world)))
    }

    /// Draw the current world at the current camera. With `allow_cache`, a
    /// frame cached for the current zoom replaces the tile walk.
    pub fn redraw(&mut self, allow_cache: bool) -> DrawOutcome {
        if !self.ready.get() {
            self.deferred_draw = true;
            tracing::debug!(readiness = %self.readiness(), "draw withheld");
            return DrawOutcome::NotReady;
        }
        let Some(world) = self.world.as_ref() else {
            return DrawOutcome::NoWorld;
        };
        let _span = tracing::info_span!("draw_map", allow_cache).entered();
        self.deferred_draw = false;

        let view = CameraView {
            offset: self.camera.offset,
            zoom: self.camera.zoom,
            pose: self.transform.pose(&self.camera),
        };
        self.backend.set_camera(&view);
        self.backend.clear(Layer::Overlay);

        let key = CacheKey::new(self.world_fingerprint, self.camera.zoom);
        let cached = if allow_cache { self.cache.get(&key) } else { None };
        let outcome = match cached {
            Some(frame) => {
                self.backend.restore(Layer::Terrain, frame);
                DrawOutcome::Cached
            }
            None => {
                self.backend.clear(Layer::Terrain);
                let scene = Scene {
                    world,
                    textures: &self.textures,
                    models: &self.models,
                    config: &self.config.draw,
                    tile_size: self.transform.tile_render_size(),
                };
                let stats = scene.walk(&mut self.backend, &mut self.instancer);
                self.cache.set(key, self.backend.snapshot(Layer::Terrain));
                tracing::debug!(?stats, "full walk complete");
                DrawOutcome::Walked(stats)
            }
        };

        self.instancer
            .reconcile(view.pose.eye, &self.textures, &mut self.backend);
        self.draw_hover();
        self.backend.present();
        outcome
    }

    fn draw_hover(&mut self) {
        let Some(at) = self.hover else {
            return;
        };
        let Some(lines) = self.hover_lines(at) else {
            return;
        };
        let Some(rect) = self.pick_rect(at) else {
            return;
        };
        let backend = &self.backend;
        let overlay = HoverOverlay::new(rect, &lines, self.surface.backing, |text, size| {
            backend.measure_text(text, size)
        });
        overlay.draw(&mut self.backend, &self.config.draw.overlay);
    }

    fn pick_rect(&self, client: Vec2) -> Option<ScreenRect> {
        let picked = self.tile_at_screen_position(client.x, client.y)?;
        let corner = Vec2::new(picked.tile.x as f32, picked.tile.y as f32);
        Some(
            self.transform
                .tile_screen_rect(&self.camera, corner, picked.tile.size),
        )
    }

    fn hover_lines(&self, client: Vec2) -> Option<Vec<LabelLine>> {
        let picked = self.tile_at_screen_position(client.x, client.y)?;
        let draw = &self.config.draw;
        let tile = picked.tile;
        let mut lines = vec![
            LabelLine::new(tile.kind.to_string(), draw.title_label),
            LabelLine::new(format!("Height: {}", tile.height), draw.detail_label),
            LabelLine::new(format!("Coordinates: {}", tile.pos()), draw.detail_label),
        ];
        if let Some(building) = picked.building {
            lines.push(LabelLine::new(
                format!("Building: {}", building.kind),
                draw.detail_label,
            ));
        }
        Some(lines)
    }

    /// Pan by `dx, dy` surface pixels; content moves with the delta.
    pub fn move_by(&mut self, dx: f32, dy: f32) -> DrawOutcome {
        let identity = SurfaceRect::square(self.config.camera.map_size);
        self.transform
            .pan(&mut self.camera, Vec2::new(dx, dy), &identity);
        self.persist_camera();
        self.redraw(true)
    }

    /// Magnify one step about the surface center.
    pub fn zoom_in(&mut self) -> DrawOutcome {
        self.zoom(ZoomDirection::In, None)
    }

    /// Shrink one step about the surface center.
    pub fn zoom_out(&mut self) -> DrawOutcome {
        self.zoom(ZoomDirection::Out, None)
    }

    fn zoom(&mut self, direction: ZoomDirection, anchor: Option<Vec2>) -> DrawOutcome {
        if self.apply_zoom(direction, anchor) {
            self.persist_camera();
        }
        self.redraw(true)
    }

    fn apply_zoom(&mut self, direction: ZoomDirection, anchor: Option<Vec2>) -> bool {
        match direction {
            ZoomDirection::In => self.transform.zoom_in(&mut self.camera, anchor),
            ZoomDirection::Out => self.transform.zoom_out(&mut self.camera, anchor),
        }
    }

    /// Tile under a client-space point, or `None` over empty or off-grid space.
    pub fn tile_at_screen_position(&self, x: f32, y: f32) -> Option<PickedTile<'_>> {
        let world = self.world.as_ref()?;
        let at = self
            .transform
            .screen_to_world(&self.camera, Vec2::new(x, y), &self.surface)
            .floor();
        if !at.is_finite() {
            return None;
        }
        let tile = world.tile_at(at.x as i32, at.y as i32)?;
        Some(PickedTile {
            tile,
            building: world.building_on(tile),
        })
    }

    /// Feed one pointer event. Drags and hovers are applied on the next
    /// [`on_animation_frame`](Self::on_animation_frame).
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerResponse {
        let step = self.interaction.handle(event);
        let outcome = step.action.map(|action| {
            self.apply(action);
            self.redraw(true)
        });
        PointerResponse {
            outcome,
            request_frame: step.request_frame,
        }
    }

    /// Display refresh: apply coalesced input and redraw at most once.
    pub fn on_animation_frame(&mut self) -> Option<DrawOutcome> {
        let actions = self.interaction.on_frame();
        if actions.is_empty() && !(self.deferred_draw && self.ready.get()) {
            return None;
        }
        for action in actions {
            self.apply(action);
        }
        Some(self.redraw(true))
    }

    fn apply(&mut self, action: Action) {
        tracing::trace!(?action, "apply action");
        match action {
            Action::Pan { delta } => {
                self.transform.pan(&mut self.camera, delta, &self.surface);
                self.persist_camera();
            }
            Action::Zoom { direction, at } => {
                let anchor = self.surface.to_backing(at);
                if self.apply_zoom(direction, Some(anchor)) {
                    self.persist_camera();
                }
            }
            Action::Hover { at } => self.hover = Some(at),
            Action::ClearHover => self.hover = None,
        }
    }

    fn persist_camera(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(e) = save_json(store.as_mut(), &self.config.camera_key, &self.camera) {
            tracing::warn!("failed to persist camera: {e}");
        }
    }

    /// Client placement of the drawing surface, e.g. after a page resize.
    pub fn set_surface(&mut self, surface: SurfaceRect) {
        self.surface = surface;
    }

    pub fn surface(&self) -> &SurfaceRect {
        &self.surface
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Replace the camera state, clamped into range, without redrawing.
    pub fn set_camera(&mut self, mut camera: CameraState) {
        self.transform.clamp(&mut camera);
        self.camera = camera;
    }

    pub fn transform(&self) -> &CameraTransform {
        &self.transform
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn models(&self) -> &ModelLibrary {
        &self.models
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    pub fn instancer(&self) -> &ModelInstancer {
        &self.instancer
    }

    pub fn cache(&self) -> &RenderCache<Frame> {
        &self.cache
    }

    pub fn hover(&self) -> Option<Vec2> {
        self.hover
    }

    pub fn store(&self) -> Option<&dyn KvStore> {
        self.store.as_deref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
