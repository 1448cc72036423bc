pub mod animation;
pub mod bridge;
pub mod config;
pub mod hud;
pub mod input;
pub mod inventory;
pub mod level;
pub mod physics;
pub mod pickups;

use serde::{Deserialize, Serialize};

use brickbridge_core::brickbridge_game_boilerplate;
use brickbridge_core::engine::{MeshId, SceneEngine};
use brickbridge_core::events::GameEvent;
use brickbridge_core::game_trait::{BrickbridgeGame, GameConfig, GameMetadata};
use brickbridge_core::input::KeyEvent;
use brickbridge_core::math::Vec3;

use animation::{Animator, select_tag};
use bridge::{BRIDGE_GROUP, BridgeLedger, rebuild_tiles, try_place_tile};
use config::RunnerConfig;
use input::InputMapper;
use inventory::Inventory;
use level::{LevelLayout, build_scene, generate_layout};
use physics::{PlayerState, apply_support, integrate_horizontal, sanitize_dt};
use pickups::{PickupRegistry, collect_nearby};

/// Everything the per-frame update mutates. Snapshotted for observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerState {
    pub player: PlayerState,
    pub inventory: Inventory,
    pub ledger: BridgeLedger,
    pub pickups: PickupRegistry,
    /// Latched once the player drops below the game-over height.
    pub game_over: bool,
    /// Latched once the player stands on the far platform.
    pub has_won: bool,
}

impl RunnerState {
    fn new(layout: &LevelLayout, pickups: PickupRegistry) -> Self {
        Self {
            player: PlayerState::new(layout.player_spawn),
            inventory: Inventory::default(),
            ledger: BridgeLedger::default(),
            pickups,
            game_over: false,
            has_won: false,
        }
    }
}

/// The bridge-runner game: collect red bricks, then lay them across the gap.
pub struct BridgeRunner {
    config: RunnerConfig,
    level: LevelLayout,
    state: RunnerState,
    input: InputMapper,
    animator: Animator,
    /// Engine body of the player, once the scene is built.
    player_body: Option<MeshId>,
    paused: bool,
    /// Set when a snapshot replaced the state and the engine has not caught up.
    scene_stale: bool,
}

impl BridgeRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::load())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        let level = generate_layout(&config, GameConfig::default().seed);
        let state = RunnerState::new(&level, PickupRegistry::new(level.pickups.clone()));
        Self {
            config,
            level,
            state,
            input: InputMapper::new(),
            animator: Animator::new(),
            player_body: None,
            paused: false,
            scene_stale: false,
        }
    }

    pub fn state(&self) -> &RunnerState {
        &self.state
    }

    pub fn level(&self) -> &LevelLayout {
        &self.level
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn player_body(&self) -> Option<MeshId> {
        self.player_body
    }

    /// Name of the clip the character is currently playing.
    pub fn current_clip(&self) -> Option<&str> {
        self.animator.current()
    }

    fn apply_overrides(&mut self, config: &GameConfig) {
        if let Some(gated) = config.custom_bool("require_build_key") {
            self.config.bridge.require_build_key = gated;
        }
        if let Some(win) = config.custom_bool("win_detection") {
            self.config.win_detection = win;
        }
    }

    /// Keep this scene's pickup meshes across an applied snapshot and
    /// resync the engine on the next frame.
    fn adopt_snapshot(&mut self, previous: RunnerState) {
        for p in self.state.pickups.iter_mut() {
            p.mesh = previous.pickups.get(p.id).and_then(|old| old.mesh);
        }
        self.scene_stale = true;
    }

    /// Push the current state into the engine: body, camera, pickup
    /// visibility and bridge tiles.
    fn sync_scene(&mut self, body: MeshId, engine: &mut dyn SceneEngine) {
        let player = &self.state.player;
        engine.set_body_transform(body, player.position, player.yaw);
        engine.set_camera_target(Vec3::new(
            player.position.x,
            self.config.level.camera_height,
            player.position.z,
        ));
        for p in self.state.pickups.all() {
            if let Some(mesh) = p.mesh {
                engine.set_enabled(mesh, p.active);
            }
        }
        let tiles = rebuild_tiles(&self.state.ledger, &self.level.gap, &self.config.bridge, engine);
        self.scene_stale = false;
        tracing::debug!(tiles, "scene resynced from snapshot");
    }

    fn check_win(&mut self) -> bool {
        if !self.config.win_detection || self.state.has_won || !self.state.player.grounded {
            return false;
        }
        if !self.level.on_next_platform(self.state.player.position) {
            return false;
        }
        self.state.has_won = true;
        tracing::info!(bricks = self.state.inventory.count(), "player reached the far platform");
        true
    }
}

impl Default for BridgeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BrickbridgeGame for BridgeRunner {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Brick Bridge".to_string(),
            description: "Collect red bricks and build a bridge to the next platform.".to_string(),
            controls: hud::HELP_TEXT.to_string(),
        }
    }

    fn init(&mut self, config: &GameConfig, engine: &mut dyn SceneEngine) {
        self.apply_overrides(config);
        let seed = config.custom_u64("seed").unwrap_or(config.seed);

        self.level = generate_layout(&self.config, seed);
        let handles = build_scene(&self.level, &self.config, engine);
        self.player_body = Some(handles.player_body);
        self.state = RunnerState::new(&self.level, handles.pickups);
        self.input.reset();
        self.paused = false;
        self.scene_stale = false;

        tracing::info!(
            seed,
            require_build_key = self.config.bridge.require_build_key,
            win_detection = self.config.win_detection,
            "bridge runner initialized"
        );
    }

    fn update(&mut self, dt: f32, engine: &mut dyn SceneEngine) -> Vec<GameEvent> {
        if self.scene_stale
            && let Some(body) = self.player_body
        {
            self.sync_scene(body, engine);
        }
        if self.paused || self.state.game_over {
            return Vec::new();
        }
        let Some(body) = self.player_body else {
            return Vec::new();
        };
        let dt = sanitize_dt(dt, self.config.physics.max_frame_dt);
        let physics = &self.config.physics;
        let mut events = Vec::new();

        let intent = self.input.direction();
        let moving = integrate_horizontal(&mut self.state.player, body, intent, physics, dt, engine);

        let pos = self.state.player.position;
        engine.set_camera_target(Vec3::new(pos.x, self.config.level.camera_height, pos.z));

        apply_support(&mut self.state.player, physics, dt, engine);
        engine.set_body_transform(body, self.state.player.position, self.state.player.yaw);

        if self.check_win() {
            events.push(GameEvent::Won);
        }

        let has_idle = self.animator.has_clip(animation::AnimTag::Idle.clip_name());
        if let Some(tag) = select_tag(&self.state.player, moving, self.state.has_won, has_idle) {
            self.animator.play(tag.clip_name(), true, engine);
        }

        if self.state.player.position.y < self.config.physics.game_over_y {
            self.state.game_over = true;
            tracing::info!(
                y = self.state.player.position.y,
                bricks = self.state.inventory.count(),
                "player fell, game over"
            );
            events.push(GameEvent::GameOver);
        }

        let build_allowed = !self.config.bridge.require_build_key || self.input.build_held();
        if build_allowed
            && let Some(count) = try_place_tile(
                self.state.player.position,
                &self.level.gap,
                &self.config.bridge,
                &mut self.state.ledger,
                &mut self.state.inventory,
                engine,
            )
        {
            events.push(GameEvent::InventoryChanged { count });
        }

        let collected = collect_nearby(
            &mut self.state.pickups,
            self.state.player.position,
            self.config.pickups.collectible,
            self.config.pickups.capture_radius_sq,
            &mut self.state.inventory,
            engine,
        );
        events.extend(
            collected
                .into_iter()
                .map(|count| GameEvent::InventoryChanged { count }),
        );

        events
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        self.input.handle_key(event);
    }

    fn on_character_loaded(&mut self, clips: &[String], engine: &mut dyn SceneEngine) {
        self.animator.register_clips(clips, engine);
    }

    fn restart(&mut self, engine: &mut dyn SceneEngine) {
        engine.dispose_group(BRIDGE_GROUP);
        self.state.ledger.clear();
        self.state.inventory.reset();
        self.state.pickups.reactivate_all(engine);

        let spawn = self.level.player_spawn;
        self.state.player = PlayerState::new(spawn);
        if let Some(body) = self.player_body {
            engine.set_body_transform(body, spawn, 0.0);
        }
        engine.set_camera_target(Vec3::new(spawn.x, self.config.level.camera_height, spawn.z));

        self.state.game_over = false;
        self.state.has_won = false;
        self.input.reset();
        self.paused = false;
        self.scene_stale = false;
        self.animator.reset(engine);

        tracing::info!("session restarted");
    }

    brickbridge_game_boilerplate!(state_type: RunnerState, on_apply: adopt_snapshot);
}
