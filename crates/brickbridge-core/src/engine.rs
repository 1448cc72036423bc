use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Handle to a mesh or body owned by the engine.
pub type MeshId = u64;

/// Tag carried by every solid so queries can filter scene geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceTag {
    StartPlatform,
    NextPlatform,
    Bridge,
    Wall,
    Rail,
    Pickup,
    Player,
}

impl SurfaceTag {
    /// Surfaces the player can stand on.
    pub fn is_support(self) -> bool {
        matches!(
            self,
            SurfaceTag::StartPlatform | SurfaceTag::NextPlatform | SurfaceTag::Bridge
        )
    }
}

/// Primitive shape with its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { diameter: f32 },
    Capsule { radius: f32, height: f32 },
}

/// Everything the engine needs to create a solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidDesc {
    pub name: String,
    pub shape: Shape,
    /// Center of the solid in world space.
    pub position: Vec3,
    pub material: String,
    pub tag: SurfaceTag,
    /// Named transform group the solid is parented under.
    pub group: Option<String>,
    /// Blocks collision-aware moves.
    pub collides: bool,
    /// Visible to ray queries.
    pub pickable: bool,
}

/// A ray with a finite length. `direction` is expected to be unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub length: f32,
}

/// Nearest intersection returned by [`SceneEngine::cast_ray`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    pub mesh: MeshId,
    pub tag: SurfaceTag,
}

/// The narrow surface the simulation consumes from the 3D engine.
///
/// Rendering, collision resolution, and animation playback live behind
/// this trait. Every method is infallible: a missing mesh or clip is a
/// no-op (or `None`) rather than an error.
pub trait SceneEngine {
    /// Move a body by `delta`, resolving collisions, and return where it ended up.
    fn move_with_collisions(&mut self, body: MeshId, delta: Vec3) -> Vec3;

    /// Current position of a body, if it exists.
    fn body_position(&self, body: MeshId) -> Option<Vec3>;

    /// Teleport a body and set its facing yaw (radians around +Y).
    fn set_body_transform(&mut self, body: MeshId, position: Vec3, yaw: f32);

    /// Nearest hit among pickable, enabled solids whose tag passes `filter`.
    fn cast_ray(&self, ray: &Ray, filter: &dyn Fn(SurfaceTag) -> bool) -> Option<RayHit>;

    fn spawn_solid(&mut self, desc: SolidDesc) -> MeshId;

    fn set_enabled(&mut self, mesh: MeshId, enabled: bool);

    /// Remove every solid parented under `group`.
    fn dispose_group(&mut self, group: &str);

    /// Snap the follow camera's target.
    fn set_camera_target(&mut self, target: Vec3);

    fn start_clip(&mut self, name: &str, looped: bool);

    fn stop_clip(&mut self, name: &str);

    fn is_clip_playing(&self, name: &str) -> bool;
}
