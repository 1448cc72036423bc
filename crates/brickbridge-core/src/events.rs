use serde::{Deserialize, Serialize};

/// Notifications a game emits to the presentation layer during a frame.
///
/// Fire-and-forget: the game never waits on the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The brick inventory changed; carries the new count.
    InventoryChanged { count: u32 },
    /// The player fell out of the world. Fires at most once per session.
    GameOver,
    /// The player reached the goal platform. Fires at most once per session.
    Won,
}

/// Receiver for game notifications, for hosts that prefer callbacks over
/// draining the returned event list themselves.
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

/// Forward each event to `observer` in emission order.
pub fn dispatch(events: &[GameEvent], observer: &mut dyn GameObserver) {
    for event in events {
        observer.on_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<GameEvent>);

    impl GameObserver for Recorder {
        fn on_event(&mut self, event: &GameEvent) {
            self.0.push(*event);
        }
    }

    #[test]
    fn dispatch_preserves_order() {
        let events = [
            GameEvent::InventoryChanged { count: 2 },
            GameEvent::GameOver,
        ];
        let mut rec = Recorder(Vec::new());
        dispatch(&events, &mut rec);
        assert_eq!(rec.0, events.to_vec());
    }

    #[test]
    fn event_msgpack_roundtrip() {
        let ev = GameEvent::InventoryChanged { count: 7 };
        let bytes = rmp_serde::to_vec(&ev).unwrap();
        let back: GameEvent = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(ev, back);
    }
}
