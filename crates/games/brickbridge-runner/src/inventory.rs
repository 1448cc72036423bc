use serde::{Deserialize, Serialize};

/// Bricks the player is carrying. Collecting adds one, placing a tile spends one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    count: u32,
}

impl Inventory {
    pub fn new(count: u32) -> Self {
        Self { count }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add one brick and return the new count.
    pub fn add(&mut self) -> u32 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    /// Spend one brick if any are held. Returns the new count, or `None` when empty.
    pub fn try_spend(&mut self) -> Option<u32> {
        self.count = self.count.checked_sub(1)?;
        Some(self.count)
    }

    pub(crate) fn reset(&mut self) {
        self.count = 0;
    }
}
