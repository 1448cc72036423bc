pub mod engine;
pub mod events;
pub mod game_trait;
pub mod headless;
pub mod input;
pub mod math;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::engine::SceneEngine;
    use crate::events::GameEvent;
    use crate::game_trait::{BrickbridgeGame, GameConfig};
    use crate::input::KeyEvent;

    /// Run N frames, returning all accumulated events.
    pub fn run_frames(
        game: &mut dyn BrickbridgeGame,
        engine: &mut dyn SceneEngine,
        n: usize,
        dt: f32,
    ) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(dt, engine));
        }
        all_events
    }

    /// Number of `GameOver` notifications in `events`.
    pub fn count_game_over(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver))
            .count()
    }

    /// Counts carried by `InventoryChanged` notifications, in order.
    pub fn inventory_counts(events: &[GameEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::InventoryChanged { count } => Some(*count),
                _ => None,
            })
            .collect()
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every BrickbridgeGame implementation must pass these. Game crates
    // call them from their own #[cfg(test)] modules with a concrete game
    // and an engine.

    /// After init(), serialize_state() must return non-empty bytes.
    pub fn contract_init_creates_state(
        game: &mut dyn BrickbridgeGame,
        engine: &mut dyn SceneEngine,
    ) {
        game.init(&GameConfig::default(), engine);
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes after init"
        );
        assert!(!game.is_game_over(), "a fresh session is not over");
    }

    /// A held movement key followed by update() must change state.
    pub fn contract_key_input_changes_state(
        game: &mut dyn BrickbridgeGame,
        engine: &mut dyn SceneEngine,
        key: &str,
    ) {
        let before = game.serialize_state();
        game.handle_key(&KeyEvent::down(key));
        game.update(0.1, engine);
        game.handle_key(&KeyEvent::up(key));
        let after = game.serialize_state();
        assert_ne!(before, after, "State must change after key input + update");
    }

    /// serialize → apply → serialize must be stable.
    pub fn contract_state_roundtrip_preserves(game: &mut dyn BrickbridgeGame) {
        let state_a = game.serialize_state();
        game.apply_state(&state_a);
        let state_b = game.serialize_state();
        assert_eq!(
            state_a, state_b,
            "State must be stable after serialize→apply→serialize roundtrip"
        );
    }

    /// Garbage or truncated snapshots must leave state untouched.
    pub fn contract_bad_state_ignored(game: &mut dyn BrickbridgeGame) {
        let before = game.serialize_state();
        game.apply_state(&[0xFF, 0xFE, 0x00, 0x01, 0xAB, 0xCD]);
        game.apply_state(&before[..before.len() / 2]);
        assert_eq!(before, game.serialize_state(), "bad snapshots must be ignored");
    }

    /// pause() must freeze the simulation, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(
        game: &mut dyn BrickbridgeGame,
        engine: &mut dyn SceneEngine,
        key: &str,
    ) {
        game.handle_key(&KeyEvent::down(key));
        game.pause();
        let before = game.serialize_state();
        game.update(0.1, engine);
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        game.resume();
        game.update(0.1, engine);
        game.handle_key(&KeyEvent::up(key));
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// restart() must clear the game-over latch and restore the initial snapshot.
    pub fn contract_restart_restores_initial_state(
        game: &mut dyn BrickbridgeGame,
        engine: &mut dyn SceneEngine,
    ) {
        game.init(&GameConfig::default(), engine);
        let initial = game.serialize_state();
        game.handle_key(&KeyEvent::down("s"));
        run_frames(game, engine, 30, 0.1);
        game.handle_key(&KeyEvent::up("s"));
        game.restart(engine);
        assert!(!game.is_game_over(), "restart must clear the game-over latch");
        assert_eq!(initial, game.serialize_state(), "restart must restore initial state");
    }
}
