use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use brickbridge_core::engine::SceneEngine;

use crate::physics::PlayerState;

/// Which character animation the simulation wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimTag {
    Idle,
    Run,
    Fall,
    Win,
    RestPose,
}

impl AnimTag {
    /// Clip name in the character asset (lowercased).
    pub fn clip_name(self) -> &'static str {
        match self {
            AnimTag::Idle => "idle",
            AnimTag::Run => "run",
            AnimTag::Fall => "fall",
            AnimTag::Win => "win",
            AnimTag::RestPose => "t-pose",
        }
    }
}

/// Pick the animation for this frame.
///
/// Airborne-but-not-yet-falling yields `None`: whatever is playing keeps playing.
pub fn select_tag(player: &PlayerState, moving: bool, won: bool, has_idle: bool) -> Option<AnimTag> {
    if player.falling {
        Some(AnimTag::Fall)
    } else if !player.grounded {
        None
    } else if won {
        Some(AnimTag::Win)
    } else if moving {
        Some(AnimTag::Run)
    } else if has_idle {
        Some(AnimTag::Idle)
    } else {
        Some(AnimTag::RestPose)
    }
}

/// Tracks the character's clips and switches between them.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    available: BTreeSet<String>,
    current: Option<String>,
    warned: BTreeSet<String>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.available.contains(name)
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        !self.available.is_empty()
    }

    /// Register the clips of a freshly imported character, stop them all,
    /// and start the rest pose.
    pub fn register_clips(&mut self, clips: &[String], engine: &mut dyn SceneEngine) {
        self.available = clips.iter().map(|c| c.to_lowercase()).collect();
        self.warned.clear();
        self.current = None;
        for name in &self.available {
            engine.stop_clip(name);
        }
        tracing::info!(clips = self.available.len(), "character clips registered");
        self.play_rest_pose(engine);
    }

    /// Start `t-pose` if present, otherwise `idle`.
    pub fn play_rest_pose(&mut self, engine: &mut dyn SceneEngine) {
        if self.has_clip(AnimTag::RestPose.clip_name()) {
            self.play(AnimTag::RestPose.clip_name(), true, engine);
        } else if self.has_clip(AnimTag::Idle.clip_name()) {
            self.play(AnimTag::Idle.clip_name(), true, engine);
        }
    }

    /// Switch to `name`. Returns whether a clip was started.
    ///
    /// The current clip is not restarted while it is still playing.
    /// Unknown clips are skipped with a single warning each.
    pub fn play(&mut self, name: &str, looped: bool, engine: &mut dyn SceneEngine) -> bool {
        let name = name.to_lowercase();
        if !self.available.contains(&name) {
            if self.is_loaded() && self.warned.insert(name.clone()) {
                tracing::warn!(clip = %name, "animation not found");
            }
            return false;
        }
        if self.current.as_deref() == Some(name.as_str()) && engine.is_clip_playing(&name) {
            return false;
        }
        if let Some(prev) = self.current.take() {
            engine.stop_clip(&prev);
        }
        engine.start_clip(&name, looped);
        self.current = Some(name);
        true
    }

    /// Stop whatever is playing and go back to the rest pose.
    pub fn reset(&mut self, engine: &mut dyn SceneEngine) {
        if let Some(prev) = self.current.take() {
            engine.stop_clip(&prev);
        }
        self.play_rest_pose(engine);
    }
}
