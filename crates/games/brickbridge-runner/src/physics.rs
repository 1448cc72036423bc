use serde::{Deserialize, Serialize};

use brickbridge_core::engine::{MeshId, Ray, RayHit, SceneEngine};
use brickbridge_core::math::{Vec2, Vec3};

use crate::config::PhysicsConfig;

/// Capsule radius as a fraction of the player radius.
pub const COLLIDER_RADIUS_SCALE: f32 = 0.9;
/// Capsule height as a multiple of the player radius.
pub const COLLIDER_HEIGHT_SCALE: f32 = 3.2;

/// State of the player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    /// Facing angle around +Y (radians), 0 = facing +Z.
    pub yaw: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub falling: bool,
}

impl PlayerState {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            yaw: 0.0,
            vertical_velocity: 0.0,
            grounded: true,
            falling: false,
        }
    }
}

/// (radius, height) of the player's collision capsule.
pub fn collider_dimensions(cfg: &PhysicsConfig) -> (f32, f32) {
    (
        cfg.player_radius * COLLIDER_RADIUS_SCALE,
        cfg.player_radius * COLLIDER_HEIGHT_SCALE,
    )
}

/// Treat non-finite or negative deltas as zero and cap large ones.
pub fn sanitize_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(max_dt)
    } else {
        0.0
    }
}

pub fn is_moving(intent: Vec2, cfg: &PhysicsConfig) -> bool {
    intent.length_squared() > cfg.move_epsilon
}

/// Move the body along `intent` through the engine's collision-aware move
/// and turn it to face the direction of travel. Returns whether it moved.
pub fn integrate_horizontal(
    player: &mut PlayerState,
    body: MeshId,
    intent: Vec2,
    cfg: &PhysicsConfig,
    dt: f32,
    engine: &mut dyn SceneEngine,
) -> bool {
    let delta = intent.to_vec3() * (cfg.move_speed * dt);
    player.position = engine.move_with_collisions(body, delta);

    let moving = is_moving(intent, cfg);
    if moving {
        player.yaw = intent.x.atan2(intent.z);
    }
    moving
}

/// The downward support probe for a player at `pos`.
pub fn support_ray(pos: Vec3, cfg: &PhysicsConfig) -> Ray {
    Ray {
        origin: pos + Vec3::new(0.0, cfg.probe_lift, 0.0),
        direction: Vec3::DOWN,
        length: cfg.probe_length,
    }
}

/// Stand on whatever supports the player, or fall.
///
/// On a hit the player snaps to `hit + player_radius` and is grounded.
/// Otherwise gravity integrates velocity then position, and the player
/// counts as falling once velocity drops below `falling_velocity`.
pub fn apply_support(
    player: &mut PlayerState,
    cfg: &PhysicsConfig,
    dt: f32,
    engine: &dyn SceneEngine,
) -> Option<RayHit> {
    let hit = engine.cast_ray(&support_ray(player.position, cfg), &|tag| tag.is_support());
    match hit {
        Some(h) => {
            player.position.y = h.point.y + cfg.player_radius;
            player.vertical_velocity = 0.0;
            player.grounded = true;
            player.falling = false;
        },
        None => {
            player.vertical_velocity -= cfg.gravity * dt;
            player.position.y += player.vertical_velocity * dt;
            player.grounded = false;
            if player.vertical_velocity < cfg.falling_velocity {
                player.falling = true;
            }
        },
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickbridge_core::engine::{Shape, SolidDesc, SurfaceTag};
    use brickbridge_core::headless::HeadlessScene;

    fn floor(scene: &mut HeadlessScene, tag: SurfaceTag) {
        scene.spawn_solid(SolidDesc {
            name: "floor".to_string(),
            shape: Shape::Box {
                width: 12.0,
                height: 1.0,
                depth: 12.0,
            },
            position: Vec3::new(0.0, 0.5, 0.0),
            material: "groundMat".to_string(),
            tag,
            group: None,
            collides: true,
            pickable: true,
        });
    }

    fn body(scene: &mut HeadlessScene, pos: Vec3) -> MeshId {
        let (radius, height) = collider_dimensions(&PhysicsConfig::default());
        scene.spawn_solid(SolidDesc {
            name: "player".to_string(),
            shape: Shape::Capsule { radius, height },
            position: pos,
            material: "playerMat".to_string(),
            tag: SurfaceTag::Player,
            group: None,
            collides: true,
            pickable: false,
        })
    }

    #[test]
    fn dt_is_sanitized() {
        assert_eq!(sanitize_dt(f32::NAN, 0.1), 0.0);
        assert_eq!(sanitize_dt(-1.0, 0.1), 0.0);
        assert_eq!(sanitize_dt(f32::INFINITY, 0.1), 0.0);
        assert_eq!(sanitize_dt(5.0, 0.1), 0.1);
        assert_eq!(sanitize_dt(0.016, 0.1), 0.016);
    }

    #[test]
    fn horizontal_move_faces_direction() {
        let cfg = PhysicsConfig::default();
        let mut scene = HeadlessScene::new();
        let start = Vec3::new(0.0, 1.3, 0.0);
        let b = body(&mut scene, start);
        let mut player = PlayerState::new(start);

        let moved = integrate_horizontal(&mut player, b, Vec2::new(1.0, 0.0), &cfg, 0.5, &mut scene);

        assert!(moved);
        assert!((player.position.x - 3.0).abs() < 1e-5);
        assert!((player.yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn idle_keeps_yaw() {
        let cfg = PhysicsConfig::default();
        let mut scene = HeadlessScene::new();
        let b = body(&mut scene, Vec3::ZERO);
        let mut player = PlayerState::new(Vec3::ZERO);
        player.yaw = 1.0;
        let moved = integrate_horizontal(&mut player, b, Vec2::ZERO, &cfg, 0.1, &mut scene);
        assert!(!moved);
        assert_eq!(player.yaw, 1.0);
    }

    #[test]
    fn supported_player_snaps_to_surface() {
        let cfg = PhysicsConfig::default();
        let mut scene = HeadlessScene::new();
        floor(&mut scene, SurfaceTag::StartPlatform);
        let mut player = PlayerState::new(Vec3::new(0.0, 1.48, 0.0));
        player.vertical_velocity = -3.0;
        player.falling = true;

        let hit = apply_support(&mut player, &cfg, 0.016, &scene);

        assert!(hit.is_some());
        assert!((player.position.y - 1.3).abs() < 1e-5);
        assert_eq!(player.vertical_velocity, 0.0);
        assert!(player.grounded);
        assert!(!player.falling);
    }

    #[test]
    fn non_support_surfaces_are_ignored() {
        let cfg = PhysicsConfig::default();
        let mut scene = HeadlessScene::new();
        floor(&mut scene, SurfaceTag::Wall);
        let mut player = PlayerState::new(Vec3::new(0.0, 1.3, 0.0));
        assert!(apply_support(&mut player, &cfg, 0.1, &scene).is_none());
        assert!(!player.grounded);
    }

    #[test]
    fn unsupported_player_falls_and_latches_falling() {
        let cfg = PhysicsConfig::default();
        let scene = HeadlessScene::new();
        let mut player = PlayerState::new(Vec3::new(0.0, 1.3, 0.0));

        apply_support(&mut player, &cfg, 0.05, &scene);
        // v = -1.0: not yet falling
        assert!(!player.grounded);
        assert!(!player.falling);
        assert!((player.vertical_velocity + 1.0).abs() < 1e-5);
        assert!((player.position.y - 1.25).abs() < 1e-5);

        apply_support(&mut player, &cfg, 0.1, &scene);
        // v = -3.0
        assert!(player.falling);
        assert!(player.position.y < 1.25);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn unsupported_player_only_goes_down(
                frames in proptest::collection::vec(0.0f32..0.1, 1..60)
            ) {
                let cfg = PhysicsConfig::default();
                let scene = HeadlessScene::new();
                let mut player = PlayerState::new(Vec3::new(0.0, 1.3, 0.0));
                let mut last_y = player.position.y;
                for dt in frames {
                    apply_support(&mut player, &cfg, dt, &scene);
                    prop_assert!(player.position.y <= last_y);
                    prop_assert!(player.position.is_finite());
                    last_y = player.position.y;
                }
            }
        }
    }
}
