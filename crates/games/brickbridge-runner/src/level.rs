use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use brickbridge_core::engine::{MeshId, SceneEngine, Shape, SolidDesc, SurfaceTag};
use brickbridge_core::math::Vec3;

use crate::bridge::GapBounds;
use crate::config::RunnerConfig;
use crate::physics::collider_dimensions;
use crate::pickups::{Pickup, PickupColor, PickupRegistry};

/// Transform group the pickups are parented under.
pub const PICKUP_GROUP: &str = "bricksParent";
/// Extra clearance on each side of the platform wall openings.
const OPENING_CLEARANCE: f32 = 0.05;
/// Rail height above the corridor deck.
const RAIL_HEIGHT: f32 = 0.25;

/// Where everything in the scene goes, derived from config and seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub start_platform: Vec3,
    pub next_platform: Vec3,
    pub platform_size: f32,
    pub gap: GapBounds,
    pub player_spawn: Vec3,
    pub pickups: Vec<Pickup>,
}

impl LevelLayout {
    /// Whether (x, z) lies on the next platform's footprint.
    pub fn on_next_platform(&self, pos: Vec3) -> bool {
        let half = self.platform_size / 2.0;
        (pos.x - self.next_platform.x).abs() < half && (pos.z - self.next_platform.z).abs() < half
    }
}

/// Compute the deterministic layout for `seed`.
pub fn generate_layout(cfg: &RunnerConfig, seed: u64) -> LevelLayout {
    let level = &cfg.level;
    let size = level.platform_size;
    let start_platform = Vec3::new(0.0, level.platform_height / 2.0, 0.0);
    let next_platform = Vec3::new(
        0.0,
        level.platform_height / 2.0,
        level.gap_length + size,
    );

    let gap = GapBounds {
        start_edge_z: start_platform.z + size / 2.0,
        next_edge_start_z: next_platform.z - size / 2.0,
        corridor_half_width: level.corridor_half_width,
    };

    let (_, collider_height) = collider_dimensions(&cfg.physics);
    let player_spawn = Vec3::new(
        0.0,
        level.platform_height + collider_height / 2.0,
        level.spawn_z,
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let half = (size / 2.0 - cfg.pickups.edge_margin).max(0.0);
    let pickups = (0..cfg.pickups.count)
        .map(|i| {
            let x = rng.random_range(-half..=half);
            let z = rng.random_range(-half..=half);
            Pickup {
                id: i,
                position: start_platform + Vec3::new(x, cfg.pickups.spawn_height, z),
                color: PickupColor::from_index(i as usize),
                active: true,
                mesh: None,
            }
        })
        .collect();

    LevelLayout {
        start_platform,
        next_platform,
        platform_size: size,
        gap,
        player_spawn,
        pickups,
    }
}

/// Engine handles created while building the scene.
#[derive(Debug, Clone)]
pub struct SceneHandles {
    pub player_body: MeshId,
    pub pickups: PickupRegistry,
}

fn solid(
    name: &str,
    shape: Shape,
    position: Vec3,
    material: &str,
    tag: SurfaceTag,
    collides: bool,
) -> SolidDesc {
    SolidDesc {
        name: name.to_string(),
        shape,
        position,
        material: material.to_string(),
        tag,
        group: None,
        collides,
        pickable: true,
    }
}

/// Spawn platforms, corridor, walls, the player capsule, and the pickups.
pub fn build_scene(
    layout: &LevelLayout,
    cfg: &RunnerConfig,
    engine: &mut dyn SceneEngine,
) -> SceneHandles {
    let level = &cfg.level;
    let size = layout.platform_size;
    let platform = Shape::Box {
        width: size,
        height: level.platform_height,
        depth: size,
    };
    engine.spawn_solid(solid(
        "start",
        platform,
        layout.start_platform,
        "groundMat",
        SurfaceTag::StartPlatform,
        true,
    ));
    engine.spawn_solid(solid(
        "next",
        platform,
        layout.next_platform,
        "platformMat",
        SurfaceTag::NextPlatform,
        true,
    ));

    build_corridor(layout, cfg, engine);
    build_platform_boundaries(layout.start_platform, layout, cfg, engine);
    build_platform_boundaries(layout.next_platform, layout, cfg, engine);

    let (radius, height) = collider_dimensions(&cfg.physics);
    let player_body = engine.spawn_solid(SolidDesc {
        pickable: false,
        ..solid(
            "player",
            Shape::Capsule { radius, height },
            layout.player_spawn,
            "playerMat",
            SurfaceTag::Player,
            true,
        )
    });

    let mut pickups = PickupRegistry::new(layout.pickups.clone());
    for p in pickups.iter_mut() {
        let mesh = engine.spawn_solid(SolidDesc {
            group: Some(PICKUP_GROUP.to_string()),
            ..solid(
                &format!("collect_{}", p.id),
                Shape::Sphere {
                    diameter: cfg.pickups.diameter,
                },
                p.position,
                p.color.material(),
                SurfaceTag::Pickup,
                false,
            )
        });
        p.mesh = Some(mesh);
    }

    tracing::info!(
        pickups = pickups.len(),
        gap_start = layout.gap.start_edge_z,
        gap_end = layout.gap.next_edge_start_z,
        "scene built"
    );

    SceneHandles {
        player_body,
        pickups,
    }
}

fn build_corridor(layout: &LevelLayout, cfg: &RunnerConfig, engine: &mut dyn SceneEngine) {
    let level = &cfg.level;
    let gap = &layout.gap;
    let length = gap.next_edge_start_z - gap.start_edge_z;
    if length <= 0.0 {
        return;
    }
    let center_z = gap.start_edge_z + length / 2.0;
    let half_w = level.corridor_half_width;

    for (name, side) in [("leftRail", -1.0f32), ("rightRail", 1.0)] {
        engine.spawn_solid(SolidDesc {
            pickable: false,
            ..solid(
                name,
                Shape::Box {
                    width: level.rail_half_width * 2.0,
                    height: RAIL_HEIGHT,
                    depth: length,
                },
                Vec3::new(
                    side * half_w,
                    level.corridor_y + RAIL_HEIGHT / 2.0,
                    center_z,
                ),
                "railMat",
                SurfaceTag::Rail,
                false,
            )
        });
    }

    for (name, side) in [("leftBridgeWall", -1.0f32), ("rightBridgeWall", 1.0)] {
        engine.spawn_solid(solid(
            name,
            Shape::Box {
                width: level.wall_thickness,
                height: level.wall_height,
                depth: length,
            },
            Vec3::new(
                side * (half_w + level.rail_half_width),
                level.corridor_y + level.wall_height / 2.0,
                center_z,
            ),
            "bridgeBoundaryMat",
            SurfaceTag::Wall,
            true,
        ));
    }
}

/// Low walls around a platform, with a corridor-wide opening in the north
/// and south edges.
fn build_platform_boundaries(
    center: Vec3,
    layout: &LevelLayout,
    cfg: &RunnerConfig,
    engine: &mut dyn SceneEngine,
) {
    let level = &cfg.level;
    let half = layout.platform_size / 2.0;
    let thickness = level.wall_thickness;
    let height = level.wall_height;
    let wall_y = center.y + level.platform_height / 2.0 + height / 2.0;

    let opening_half = level.corridor_half_width + level.rail_half_width + OPENING_CLEARANCE;
    let segment_width = (half - opening_half).max(0.01);

    let segment = Shape::Box {
        width: segment_width,
        height,
        depth: thickness,
    };
    for (name, dx, dz) in [
        ("wall_n_l", -half + segment_width / 2.0, half - thickness / 2.0),
        ("wall_n_r", half - segment_width / 2.0, half - thickness / 2.0),
        ("wall_s_l", -half + segment_width / 2.0, -half + thickness / 2.0),
        ("wall_s_r", half - segment_width / 2.0, -half + thickness / 2.0),
    ] {
        engine.spawn_solid(solid(
            name,
            segment,
            Vec3::new(center.x + dx, wall_y, center.z + dz),
            "boundaryMat",
            SurfaceTag::Wall,
            true,
        ));
    }

    let side = Shape::Box {
        width: thickness,
        height,
        depth: layout.platform_size - thickness * 2.0,
    };
    for (name, dx) in [("wall_e", half - thickness / 2.0), ("wall_w", -half + thickness / 2.0)] {
        engine.spawn_solid(solid(
            name,
            side,
            Vec3::new(center.x + dx, wall_y, center.z),
            "boundaryMat",
            SurfaceTag::Wall,
            true,
        ));
    }
}
