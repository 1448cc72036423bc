use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::SceneEngine;
use crate::events::GameEvent;
use crate::input::KeyEvent;

/// Core trait that every Brickbridge game implements.
///
/// The host owns the engine and the render loop; the game owns all
/// simulation state and is driven through these calls, one `update` per
/// rendered frame. All mutation happens inside these methods, so a game
/// never needs interior mutability or locking.
pub trait BrickbridgeGame: Send + Sync {
    /// Game metadata for the title screen.
    fn metadata(&self) -> GameMetadata;

    /// Called once before the first frame. Builds the scene through `engine`.
    fn init(&mut self, config: &GameConfig, engine: &mut dyn SceneEngine);

    /// Called each rendered frame with the elapsed time in seconds.
    fn update(&mut self, dt: f32, engine: &mut dyn SceneEngine) -> Vec<GameEvent>;

    /// Feed one key transition from the host's keyboard stream.
    fn handle_key(&mut self, event: &KeyEvent);

    /// Called when the character asset finishes importing, with its clip names.
    fn on_character_loaded(&mut self, clips: &[String], engine: &mut dyn SceneEngine);

    /// Reset the session to its initial state. Frame updates may resume right after.
    fn restart(&mut self, engine: &mut dyn SceneEngine);

    /// Snapshot of the session state for read-only observers.
    fn serialize_state(&self) -> Vec<u8>;

    /// Replace the session state with a snapshot. Malformed input is ignored.
    fn apply_state(&mut self, state: &[u8]);

    fn pause(&mut self);

    fn resume(&mut self);

    /// Whether the game-over latch is set.
    fn is_game_over(&self) -> bool;
}

/// Game metadata for the title screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    /// One-line controls hint shown on the HUD.
    pub controls: String,
}

/// Configuration for a play session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seed for any randomized scene layout.
    pub seed: u64,
    /// Game-specific overrides.
    pub custom: HashMap<String, serde_json::Value>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            custom: HashMap::new(),
        }
    }
}

impl GameConfig {
    pub fn custom_bool(&self, key: &str) -> Option<bool> {
        self.custom.get(key).and_then(|v| v.as_bool())
    }

    pub fn custom_u64(&self, key: &str) -> Option<u64> {
        self.custom.get(key).and_then(|v| v.as_u64())
    }
}

/// Generates the `BrickbridgeGame` methods that only touch the snapshot state:
/// `serialize_state`, `apply_state`, `pause`, `resume`, `is_game_over`.
///
/// Requires the implementing struct to have `state: $StateType` and `paused: bool` fields,
/// and `$StateType` to have a `game_over: bool` field.
///
/// With `on_apply: method`, a successfully decoded snapshot is followed by
/// `self.method(previous_state)`, so the game can carry engine handles over
/// and resync its scene.
#[macro_export]
macro_rules! brickbridge_game_boilerplate {
    (state_type: $StateType:ty $(, on_apply: $on_apply:ident)?) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("game state serialization must succeed")
        }

        fn apply_state(&mut self, state: &[u8]) {
            if let Ok(s) = rmp_serde::from_slice::<$StateType>(state) {
                #[allow(unused_variables)]
                let previous = std::mem::replace(&mut self.state, s);
                $(self.$on_apply(previous);)?
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_game_over(&self) -> bool {
            self.state.game_over
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_lookups() {
        let mut config = GameConfig::default();
        config
            .custom
            .insert("flag".to_string(), serde_json::Value::Bool(true));
        config.custom.insert("seed".to_string(), serde_json::json!(7));
        assert_eq!(config.custom_bool("flag"), Some(true));
        assert_eq!(config.custom_u64("seed"), Some(7));
        assert_eq!(config.custom_bool("missing"), None);
        assert_eq!(config.custom_u64("flag"), None);
    }
}
