use serde::{Deserialize, Serialize};

use brickbridge_core::engine::{MeshId, SceneEngine};
use brickbridge_core::math::Vec3;

use crate::inventory::Inventory;

/// Color tag on a collectible sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupColor {
    Red,
    Green,
    Yellow,
}

impl PickupColor {
    /// Colors cycle red, green, yellow by spawn index.
    pub fn from_index(idx: usize) -> Self {
        match idx % 3 {
            0 => PickupColor::Red,
            1 => PickupColor::Green,
            _ => PickupColor::Yellow,
        }
    }

    pub fn material(self) -> &'static str {
        match self {
            PickupColor::Red => "collectRedMat",
            PickupColor::Green => "collectGreenMat",
            PickupColor::Yellow => "collectYellowMat",
        }
    }
}

/// A collectible placed at scene build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub position: Vec3,
    pub color: PickupColor,
    pub active: bool,
    /// Engine mesh, once the scene has been built.
    pub mesh: Option<MeshId>,
}

/// The fixed pickup population and which of it is still active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PickupRegistry {
    pickups: Vec<Pickup>,
}

impl PickupRegistry {
    pub fn new(pickups: Vec<Pickup>) -> Self {
        Self { pickups }
    }

    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty()
    }

    pub fn all(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn active(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.iter().filter(|p| p.active)
    }

    pub fn get(&self, id: u32) -> Option<&Pickup> {
        self.pickups.iter().find(|p| p.id == id)
    }

    /// Mark a pickup collected. Returns false if it was unknown or already collected.
    pub fn deactivate(&mut self, id: u32) -> bool {
        match self.pickups.iter_mut().find(|p| p.id == id) {
            Some(p) if p.active => {
                p.active = false;
                true
            },
            _ => false,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pickup> {
        self.pickups.iter_mut()
    }

    /// Restore the initial population. Only a session restart may do this.
    pub(crate) fn reactivate_all(&mut self, engine: &mut dyn SceneEngine) {
        for p in &mut self.pickups {
            p.active = true;
            if let Some(mesh) = p.mesh {
                engine.set_enabled(mesh, true);
            }
        }
    }
}

/// Collect every active pickup of `collectible` color within capture range.
///
/// Each collection disables the pickup's mesh and adds one brick; the
/// returned counts are the inventory value after each collection, in order.
pub fn collect_nearby(
    registry: &mut PickupRegistry,
    player_pos: Vec3,
    collectible: PickupColor,
    capture_radius_sq: f32,
    inventory: &mut Inventory,
    engine: &mut dyn SceneEngine,
) -> Vec<u32> {
    let mut counts = Vec::new();
    for p in registry.pickups.iter_mut().rev() {
        if !p.active || p.color != collectible {
            continue;
        }
        if p.position.distance_squared(player_pos) >= capture_radius_sq {
            continue;
        }
        p.active = false;
        if let Some(mesh) = p.mesh {
            engine.set_enabled(mesh, false);
        }
        let count = inventory.add();
        tracing::debug!(pickup = p.id, count, "pickup collected");
        counts.push(count);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickbridge_core::headless::HeadlessScene;

    fn pickup(id: u32, position: Vec3, color: PickupColor) -> Pickup {
        Pickup {
            id,
            position,
            color,
            active: true,
            mesh: None,
        }
    }

    #[test]
    fn colors_cycle_in_thirds() {
        let counts = (0..45).map(PickupColor::from_index).fold([0; 3], |mut acc, c| {
            acc[c as usize] += 1;
            acc
        });
        assert_eq!(counts, [15, 15, 15]);
    }

    #[test]
    fn red_is_collected_green_is_not() {
        let player = Vec3::new(0.0, 1.3, 0.0);
        let near = Vec3::new(0.5, 1.2, 0.0);
        let mut registry = PickupRegistry::new(vec![
            pickup(0, near, PickupColor::Red),
            pickup(1, near, PickupColor::Green),
        ]);
        let mut inv = Inventory::default();
        let mut scene = HeadlessScene::new();

        let counts = collect_nearby(
            &mut registry,
            player,
            PickupColor::Red,
            1.0,
            &mut inv,
            &mut scene,
        );

        assert_eq!(counts, vec![1]);
        assert_eq!(inv.count(), 1);
        assert!(!registry.get(0).unwrap().active);
        assert!(registry.get(1).unwrap().active);
    }

    #[test]
    fn out_of_range_is_not_collected() {
        let mut registry =
            PickupRegistry::new(vec![pickup(0, Vec3::new(1.0, 0.0, 0.0), PickupColor::Red)]);
        let mut inv = Inventory::default();
        let counts = collect_nearby(
            &mut registry,
            Vec3::ZERO,
            PickupColor::Red,
            1.0,
            &mut inv,
            &mut HeadlessScene::new(),
        );
        // distance² == radius² is outside
        assert!(counts.is_empty());
        assert_eq!(registry.active().count(), 1);
    }

    #[test]
    fn several_in_one_frame() {
        let mut registry = PickupRegistry::new(
            (0..3)
                .map(|i| pickup(i, Vec3::new(0.1 * i as f32, 0.0, 0.0), PickupColor::Red))
                .collect(),
        );
        let mut inv = Inventory::new(4);
        let counts = collect_nearby(
            &mut registry,
            Vec3::ZERO,
            PickupColor::Red,
            1.0,
            &mut inv,
            &mut HeadlessScene::new(),
        );
        assert_eq!(counts, vec![5, 6, 7]);
        assert_eq!(registry.active().count(), 0);
    }

    #[test]
    fn collected_pickup_never_counts_twice() {
        let mut registry = PickupRegistry::new(vec![pickup(0, Vec3::ZERO, PickupColor::Red)]);
        let mut inv = Inventory::default();
        let mut scene = HeadlessScene::new();
        for _ in 0..3 {
            collect_nearby(
                &mut registry,
                Vec3::ZERO,
                PickupColor::Red,
                1.0,
                &mut inv,
                &mut scene,
            );
        }
        assert_eq!(inv.count(), 1);
        assert!(!registry.deactivate(0), "already collected");
        assert!(!registry.deactivate(99), "unknown id");
    }

    #[test]
    fn reactivate_all_restores_population_and_meshes() {
        let mut scene = HeadlessScene::new();
        let mesh = scene.spawn_solid(brickbridge_core::engine::SolidDesc {
            name: "collect_0".to_string(),
            shape: brickbridge_core::engine::Shape::Sphere { diameter: 0.4 },
            position: Vec3::ZERO,
            material: PickupColor::Red.material().to_string(),
            tag: brickbridge_core::engine::SurfaceTag::Pickup,
            group: None,
            collides: false,
            pickable: true,
        });
        let mut registry = PickupRegistry::new(vec![Pickup {
            mesh: Some(mesh),
            ..pickup(0, Vec3::ZERO, PickupColor::Red)
        }]);
        let mut inv = Inventory::default();
        collect_nearby(
            &mut registry,
            Vec3::ZERO,
            PickupColor::Red,
            1.0,
            &mut inv,
            &mut scene,
        );
        assert!(!scene.is_enabled(mesh));

        registry.reactivate_all(&mut scene);
        assert!(scene.is_enabled(mesh));
        assert_eq!(registry.active().count(), 1);
    }
}
