use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use brickbridge_core::engine::{SceneEngine, Shape, SolidDesc, SurfaceTag};
use brickbridge_core::math::Vec3;

use crate::config::BridgeConfig;
use crate::inventory::Inventory;

/// Transform group every placed tile is parented under.
pub const BRIDGE_GROUP: &str = "bridgeParent";
/// Tiles are always centered on the corridor.
pub const CORRIDOR_CENTER_X: f32 = 0.0;

/// Round `value` to the nearest multiple of `spacing`.
pub fn snap_to_grid(value: f32, spacing: f32) -> f32 {
    (value / spacing).round() * spacing
}

/// One grid cell along the corridor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeCell {
    pub x: f32,
    pub z: f32,
}

impl BridgeCell {
    /// Ledger key: both coordinates at two decimals, `"x|z"`.
    pub fn key(&self) -> String {
        format!("{:.2}|{:.2}", self.x, self.z)
    }

    /// Parse a ledger key back into a cell.
    pub fn from_key(key: &str) -> Option<Self> {
        let (x, z) = key.split_once('|')?;
        Some(Self {
            x: x.parse().ok()?,
            z: z.parse().ok()?,
        })
    }
}

/// Which corridor cells already carry a tile. Append-only for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeLedger {
    cells: BTreeSet<String>,
}

impl BridgeLedger {
    pub fn has_cell(&self, key: &str) -> bool {
        self.cells.contains(key)
    }

    /// Record a cell. Returns false if it was already present.
    pub fn mark_cell(&mut self, key: String) -> bool {
        self.cells.insert(key)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(String::as_str)
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }
}

/// The gap between the two platforms and the corridor spanning it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapBounds {
    /// Far (north) edge of the start platform.
    pub start_edge_z: f32,
    /// Near (south) edge of the next platform.
    pub next_edge_start_z: f32,
    pub corridor_half_width: f32,
}

impl GapBounds {
    /// Largest |x| that still counts as inside the corridor walls.
    pub fn wall_inner_limit(&self, cfg: &BridgeConfig) -> f32 {
        self.corridor_half_width - cfg.wall_margin
    }

    pub fn is_over_gap(&self, z: f32, cfg: &BridgeConfig) -> bool {
        z > self.start_edge_z - cfg.gap_start_tolerance
            && z < self.next_edge_start_z + cfg.gap_end_tolerance
    }

    pub fn in_corridor(&self, x: f32, cfg: &BridgeConfig) -> bool {
        x.abs() <= self.wall_inner_limit(cfg)
    }

    fn contains_cell_z(&self, gz: f32) -> bool {
        gz >= self.start_edge_z && gz <= self.next_edge_start_z
    }
}

/// The cell under `pos`, if the player is over the gap inside the corridor
/// and the snapped cell still lies within the gap.
pub fn candidate_cell(pos: Vec3, gap: &GapBounds, cfg: &BridgeConfig) -> Option<BridgeCell> {
    if !gap.is_over_gap(pos.z, cfg) || !gap.in_corridor(pos.x, cfg) {
        return None;
    }
    let gz = snap_to_grid(pos.z, cfg.spacing);
    gap.contains_cell_z(gz).then_some(BridgeCell {
        x: CORRIDOR_CENTER_X,
        z: gz,
    })
}

/// Place at most one tile under the player.
///
/// Requires a brick in the inventory and a cell not yet in the ledger.
/// Returns the new inventory count when a tile was placed.
pub fn try_place_tile(
    pos: Vec3,
    gap: &GapBounds,
    cfg: &BridgeConfig,
    ledger: &mut BridgeLedger,
    inventory: &mut Inventory,
    engine: &mut dyn SceneEngine,
) -> Option<u32> {
    if inventory.is_empty() {
        return None;
    }
    let cell = candidate_cell(pos, gap, cfg)?;
    let key = cell.key();
    if ledger.has_cell(&key) {
        return None;
    }
    let count = inventory.try_spend()?;

    spawn_tile(cell, gap, cfg, engine);
    tracing::debug!(cell = %key, count, "bridge tile placed");
    ledger.mark_cell(key);
    Some(count)
}

fn spawn_tile(
    cell: BridgeCell,
    gap: &GapBounds,
    cfg: &BridgeConfig,
    engine: &mut dyn SceneEngine,
) {
    let inner_width = gap.wall_inner_limit(cfg) * 2.0;
    engine.spawn_solid(SolidDesc {
        name: "bridgeStep".to_string(),
        shape: Shape::Box {
            width: inner_width,
            height: cfg.tile_height,
            depth: cfg.length,
        },
        position: Vec3::new(cell.x, cfg.y_offset, cell.z),
        material: "bridgeMat".to_string(),
        tag: SurfaceTag::Bridge,
        group: Some(BRIDGE_GROUP.to_string()),
        collides: false,
        pickable: true,
    });
}

/// Replace the scene's tiles with one per ledger cell. Returns how many were spawned.
pub fn rebuild_tiles(
    ledger: &BridgeLedger,
    gap: &GapBounds,
    cfg: &BridgeConfig,
    engine: &mut dyn SceneEngine,
) -> usize {
    engine.dispose_group(BRIDGE_GROUP);
    let mut spawned = 0;
    for key in ledger.keys() {
        match BridgeCell::from_key(key) {
            Some(cell) => {
                spawn_tile(cell, gap, cfg, engine);
                spawned += 1;
            },
            None => tracing::warn!(cell = %key, "unreadable ledger key, tile skipped"),
        }
    }
    spawned
}
