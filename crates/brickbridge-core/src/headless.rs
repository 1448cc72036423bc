//! Renderer-free [`SceneEngine`] implementation.
//!
//! Solids are treated as axis-aligned boxes (capsules use their bounding
//! box, spheres are exact for ray queries). Bodies are pushed out of
//! colliding solids on the XZ plane only, which is enough for a character
//! walking between low walls. Used by tests and by hosts that run the
//! simulation without drawing anything.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::engine::{MeshId, Ray, RayHit, SceneEngine, Shape, SolidDesc, SurfaceTag};
use crate::math::Vec3;

/// Solids whose top sits at most this far above a body's feet are stepped
/// over instead of blocking it.
pub const STEP_HEIGHT: f32 = 0.35;

#[derive(Debug, Clone)]
struct SolidEntry {
    desc: SolidDesc,
    enabled: bool,
    yaw: f32,
}

#[derive(Debug, Clone, Default)]
struct ClipState {
    playing: bool,
    looped: bool,
    starts: u32,
}

/// In-memory scene with box collision and slab ray casts.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    next_id: MeshId,
    solids: BTreeMap<MeshId, SolidEntry>,
    clips: HashMap<String, ClipState>,
    camera_target: Option<Vec3>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene whose character asset provides the given clips.
    pub fn with_clips(names: &[&str]) -> Self {
        let mut scene = Self::new();
        for name in names {
            scene
                .clips
                .insert(name.to_lowercase(), ClipState::default());
        }
        scene
    }

    /// Clip names the asset provides, sorted.
    pub fn clip_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clips.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn solid(&self, mesh: MeshId) -> Option<&SolidDesc> {
        self.solids.get(&mesh).map(|e| &e.desc)
    }

    pub fn is_enabled(&self, mesh: MeshId) -> bool {
        self.solids.get(&mesh).is_some_and(|e| e.enabled)
    }

    pub fn yaw(&self, mesh: MeshId) -> Option<f32> {
        self.solids.get(&mesh).map(|e| e.yaw)
    }

    /// All solids carrying `tag`.
    pub fn solids_tagged(&self, tag: SurfaceTag) -> Vec<&SolidDesc> {
        self.solids
            .values()
            .filter(|e| e.desc.tag == tag)
            .map(|e| &e.desc)
            .collect()
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    pub fn camera_target(&self) -> Option<Vec3> {
        self.camera_target
    }

    /// How many times `name` has been started.
    pub fn clip_starts(&self, name: &str) -> u32 {
        self.clips.get(name).map_or(0, |c| c.starts)
    }

    pub fn playing_clips(&self) -> HashSet<String> {
        self.clips
            .iter()
            .filter(|(_, c)| c.playing)
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn is_clip_looped(&self, name: &str) -> bool {
        self.clips.get(name).is_some_and(|c| c.looped)
    }

    /// Simulate a non-looping clip reaching its end.
    pub fn finish_clip(&mut self, name: &str) {
        if let Some(clip) = self.clips.get_mut(name) {
            clip.playing = false;
        }
    }
}

/// Axis-aligned bounds of a solid centered at `pos`.
fn bounds(shape: &Shape, pos: Vec3) -> (Vec3, Vec3) {
    let half = match *shape {
        Shape::Box {
            width,
            height,
            depth,
        } => Vec3::new(width / 2.0, height / 2.0, depth / 2.0),
        Shape::Sphere { diameter } => {
            let r = diameter / 2.0;
            Vec3::new(r, r, r)
        },
        Shape::Capsule { radius, height } => Vec3::new(radius, height / 2.0, radius),
    };
    (pos - half, pos + half)
}

fn axis(v: Vec3, i: usize) -> f32 {
    match i {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

/// Slab test. Returns the entry distance along the ray, clamped to `[0, ray.length]`.
fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_min = 0.0f32;
    let mut t_max = ray.length;
    for i in 0..3 {
        let o = axis(ray.origin, i);
        let d = axis(ray.direction, i);
        let lo = axis(min, i);
        let hi = axis(max, i);
        if d.abs() < 1e-8 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (lo - o) * inv;
        let mut t1 = (hi - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    Some(t_min)
}

fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.x * ray.direction.x + oc.y * ray.direction.y + oc.z * ray.direction.z;
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t = if -b - sq >= 0.0 { -b - sq } else { -b + sq };
    (t >= 0.0 && t <= ray.length).then_some(t)
}

impl SceneEngine for HeadlessScene {
    fn move_with_collisions(&mut self, body: MeshId, delta: Vec3) -> Vec3 {
        let Some(entry) = self.solids.get(&body) else {
            tracing::debug!(body, "move_with_collisions on unknown body");
            return Vec3::ZERO;
        };
        let (radius, half_h) = match entry.desc.shape {
            Shape::Capsule { radius, height } => (radius, height / 2.0),
            Shape::Sphere { diameter } => (diameter / 2.0, diameter / 2.0),
            Shape::Box { width, height, .. } => (width / 2.0, height / 2.0),
        };
        let mut target = entry.desc.position + delta;
        let feet = target.y - half_h;
        let head = target.y + half_h;

        for (&id, other) in &self.solids {
            if id == body || !other.enabled || !other.desc.collides {
                continue;
            }
            let (min, max) = bounds(&other.desc.shape, other.desc.position);
            if max.y <= feet + STEP_HEIGHT || min.y >= head {
                continue;
            }

            let overlap_left = (target.x + radius) - min.x;
            let overlap_right = max.x - (target.x - radius);
            let overlap_back = (target.z + radius) - min.z;
            let overlap_front = max.z - (target.z - radius);
            if overlap_left <= 0.0
                || overlap_right <= 0.0
                || overlap_back <= 0.0
                || overlap_front <= 0.0
            {
                continue;
            }

            // Resolve along the axis of minimum penetration
            let min_overlap = overlap_left
                .min(overlap_right)
                .min(overlap_back)
                .min(overlap_front);
            if min_overlap == overlap_left {
                target.x = min.x - radius;
            } else if min_overlap == overlap_right {
                target.x = max.x + radius;
            } else if min_overlap == overlap_back {
                target.z = min.z - radius;
            } else {
                target.z = max.z + radius;
            }
        }

        if let Some(entry) = self.solids.get_mut(&body) {
            entry.desc.position = target;
        }
        target
    }

    fn body_position(&self, body: MeshId) -> Option<Vec3> {
        self.solids.get(&body).map(|e| e.desc.position)
    }

    fn set_body_transform(&mut self, body: MeshId, position: Vec3, yaw: f32) {
        if let Some(entry) = self.solids.get_mut(&body) {
            entry.desc.position = position;
            entry.yaw = yaw;
        }
    }

    fn cast_ray(&self, ray: &Ray, filter: &dyn Fn(SurfaceTag) -> bool) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for (&id, entry) in &self.solids {
            if !entry.enabled || !entry.desc.pickable || !filter(entry.desc.tag) {
                continue;
            }
            let t = match entry.desc.shape {
                Shape::Sphere { diameter } => {
                    ray_sphere(ray, entry.desc.position, diameter / 2.0)
                },
                ref shape => {
                    let (min, max) = bounds(shape, entry.desc.position);
                    ray_aabb(ray, min, max)
                },
            };
            if let Some(t) = t
                && best.as_ref().is_none_or(|b| t < b.distance)
            {
                best = Some(RayHit {
                    point: ray.origin + ray.direction * t,
                    distance: t,
                    mesh: id,
                    tag: entry.desc.tag,
                });
            }
        }
        best
    }

    fn spawn_solid(&mut self, desc: SolidDesc) -> MeshId {
        self.next_id += 1;
        let id = self.next_id;
        self.solids.insert(
            id,
            SolidEntry {
                desc,
                enabled: true,
                yaw: 0.0,
            },
        );
        id
    }

    fn set_enabled(&mut self, mesh: MeshId, enabled: bool) {
        if let Some(entry) = self.solids.get_mut(&mesh) {
            entry.enabled = enabled;
        }
    }

    fn dispose_group(&mut self, group: &str) {
        self.solids
            .retain(|_, e| e.desc.group.as_deref() != Some(group));
    }

    fn set_camera_target(&mut self, target: Vec3) {
        self.camera_target = Some(target);
    }

    fn start_clip(&mut self, name: &str, looped: bool) {
        if let Some(clip) = self.clips.get_mut(name) {
            clip.playing = true;
            clip.looped = looped;
            clip.starts += 1;
        }
    }

    fn stop_clip(&mut self, name: &str) {
        if let Some(clip) = self.clips.get_mut(name) {
            clip.playing = false;
        }
    }

    fn is_clip_playing(&self, name: &str) -> bool {
        self.clips.get(name).is_some_and(|c| c.playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(name: &str, pos: Vec3, size: Vec3, tag: SurfaceTag, group: Option<&str>) -> SolidDesc {
        SolidDesc {
            name: name.to_string(),
            shape: Shape::Box {
                width: size.x,
                height: size.y,
                depth: size.z,
            },
            position: pos,
            material: "test".to_string(),
            tag,
            group: group.map(str::to_string),
            collides: true,
            pickable: true,
        }
    }

    fn capsule(pos: Vec3) -> SolidDesc {
        SolidDesc {
            name: "player".to_string(),
            shape: Shape::Capsule {
                radius: 0.27,
                height: 0.96,
            },
            position: pos,
            material: "player".to_string(),
            tag: SurfaceTag::Player,
            group: None,
            collides: true,
            pickable: false,
        }
    }

    fn down_from(origin: Vec3) -> Ray {
        Ray {
            origin,
            direction: Vec3::DOWN,
            length: 5.0,
        }
    }

    #[test]
    fn ray_hits_top_of_box() {
        let mut scene = HeadlessScene::new();
        let floor = scene.spawn_solid(boxed(
            "floor",
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(12.0, 1.0, 12.0),
            SurfaceTag::StartPlatform,
            None,
        ));
        let hit = scene
            .cast_ray(&down_from(Vec3::new(0.0, 3.0, 0.0)), &|t| t.is_support())
            .expect("ray should hit the floor");
        assert_eq!(hit.mesh, floor);
        assert!((hit.point.y - 1.0).abs() < 1e-5);
        assert!((hit.distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn ray_picks_nearest_and_respects_filter() {
        let mut scene = HeadlessScene::new();
        scene.spawn_solid(boxed(
            "low",
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.2, 2.0),
            SurfaceTag::Bridge,
            None,
        ));
        let high = scene.spawn_solid(boxed(
            "high",
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 0.2, 2.0),
            SurfaceTag::Wall,
            None,
        ));
        let origin = Vec3::new(0.0, 3.0, 0.0);
        let any = scene.cast_ray(&down_from(origin), &|_| true).unwrap();
        assert_eq!(any.mesh, high);
        let support = scene
            .cast_ray(&down_from(origin), &|t| t.is_support())
            .unwrap();
        assert_eq!(support.tag, SurfaceTag::Bridge);
    }

    #[test]
    fn ray_misses_beyond_length_and_disabled() {
        let mut scene = HeadlessScene::new();
        let far = scene.spawn_solid(boxed(
            "far",
            Vec3::new(0.0, -10.0, 0.0),
            Vec3::new(2.0, 1.0, 2.0),
            SurfaceTag::Bridge,
            None,
        ));
        assert!(scene.cast_ray(&down_from(Vec3::ZERO), &|_| true).is_none());
        scene.set_body_transform(far, Vec3::new(0.0, -1.0, 0.0), 0.0);
        assert!(scene.cast_ray(&down_from(Vec3::ZERO), &|_| true).is_some());
        scene.set_enabled(far, false);
        assert!(scene.cast_ray(&down_from(Vec3::ZERO), &|_| true).is_none());
    }

    #[test]
    fn ray_hits_sphere_surface() {
        let mut scene = HeadlessScene::new();
        scene.spawn_solid(SolidDesc {
            shape: Shape::Sphere { diameter: 1.0 },
            ..boxed("ball", Vec3::ZERO, Vec3::ZERO, SurfaceTag::Pickup, None)
        });
        let hit = scene
            .cast_ray(&down_from(Vec3::new(0.0, 2.0, 0.0)), &|_| true)
            .unwrap();
        assert!((hit.point.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn wall_blocks_body() {
        let mut scene = HeadlessScene::new();
        scene.spawn_solid(boxed(
            "wall",
            Vec3::new(1.0, 1.25, 0.0),
            Vec3::new(0.2, 0.5, 10.0),
            SurfaceTag::Wall,
            None,
        ));
        let body = scene.spawn_solid(capsule(Vec3::new(0.0, 1.3, 0.0)));
        let pos = scene.move_with_collisions(body, Vec3::new(0.8, 0.0, 0.0));
        assert!(pos.x <= 0.9 - 0.27 + 1e-5, "body should stop at wall, got {}", pos.x);
        assert_eq!(scene.body_position(body), Some(pos));
    }

    #[test]
    fn floor_does_not_block_body() {
        let mut scene = HeadlessScene::new();
        scene.spawn_solid(boxed(
            "floor",
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(12.0, 1.0, 12.0),
            SurfaceTag::StartPlatform,
            None,
        ));
        let body = scene.spawn_solid(capsule(Vec3::new(0.0, 1.3, 0.0)));
        let pos = scene.move_with_collisions(body, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(pos, Vec3::new(1.0, 1.3, 1.0));
    }

    #[test]
    fn dispose_group_removes_members_only() {
        let mut scene = HeadlessScene::new();
        let keep = scene.spawn_solid(boxed("a", Vec3::ZERO, Vec3::ZERO, SurfaceTag::Wall, None));
        scene.spawn_solid(boxed(
            "b",
            Vec3::ZERO,
            Vec3::ZERO,
            SurfaceTag::Bridge,
            Some("bridge"),
        ));
        scene.dispose_group("bridge");
        assert_eq!(scene.solid_count(), 1);
        assert!(scene.solid(keep).is_some());
    }

    #[test]
    fn clips_track_starts() {
        let mut scene = HeadlessScene::with_clips(&["Idle", "run"]);
        assert_eq!(scene.clip_names(), vec!["idle".to_string(), "run".to_string()]);
        scene.start_clip("run", true);
        assert!(scene.is_clip_playing("run"));
        assert!(scene.is_clip_looped("run"));
        scene.stop_clip("run");
        assert!(!scene.is_clip_playing("run"));
        scene.start_clip("missing", true);
        assert_eq!(scene.clip_starts("missing"), 0);
        assert_eq!(scene.clip_starts("run"), 1);
    }
}
