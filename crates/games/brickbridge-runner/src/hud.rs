use brickbridge_core::events::{GameEvent, GameObserver};

/// Controls hint shown under the brick counter.
pub const HELP_TEXT: &str = "WASD/Arrows to move, Space to auto-build";

/// What the overlay shows, driven purely by game notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudState {
    pub brick_count: u32,
    pub game_over_visible: bool,
    pub won_visible: bool,
}

impl HudState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brick_label(&self) -> String {
        format!("Bricks: {}", self.brick_count)
    }

    /// Back to the freshly loaded overlay after the Restart button.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl GameObserver for HudState {
    fn on_event(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::InventoryChanged { count } => self.brick_count = count,
            GameEvent::GameOver => self.game_over_visible = true,
            GameEvent::Won => self.won_visible = true,
        }
    }
}
