use brickbridge_core::input::KeyEvent;
use brickbridge_core::math::Vec2;

/// Logical keys the runner listens for. WASD and the arrow keys map onto
/// the same four directions; space is the build key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    W,
    A,
    S,
    D,
    Up,
    Left,
    Down,
    Right,
    Build,
}

impl Binding {
    fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "w" => Binding::W,
            "a" => Binding::A,
            "s" => Binding::S,
            "d" => Binding::D,
            "arrowup" => Binding::Up,
            "arrowleft" => Binding::Left,
            "arrowdown" => Binding::Down,
            "arrowright" => Binding::Right,
            " " => Binding::Build,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct HeldKeys {
    w: bool,
    a: bool,
    s: bool,
    d: bool,
    up: bool,
    left: bool,
    down: bool,
    right: bool,
}

/// Turns the key-down / key-up stream into a movement intent.
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    held: HeldKeys,
    direction: Vec2,
    build_held: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one key transition. Returns whether the key is bound.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let key = event.key.to_lowercase();
        let pressed = event.is_down();
        let Some(binding) = Binding::from_key(&key) else {
            return false;
        };
        match binding {
            Binding::W => self.held.w = pressed,
            Binding::A => self.held.a = pressed,
            Binding::S => self.held.s = pressed,
            Binding::D => self.held.d = pressed,
            Binding::Up => self.held.up = pressed,
            Binding::Left => self.held.left = pressed,
            Binding::Down => self.held.down = pressed,
            Binding::Right => self.held.right = pressed,
            Binding::Build => self.build_held = pressed,
        }
        self.recompute();
        true
    }

    /// Current movement intent: zero or unit length.
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn build_held(&self) -> bool {
        self.build_held
    }

    /// Release every key.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn recompute(&mut self) {
        let h = &self.held;
        self.direction = direction_from(h.w || h.up, h.s || h.down, h.a || h.left, h.d || h.right);
    }
}

/// (right − left, forward − backward), normalized when nonzero.
pub fn direction_from(forward: bool, backward: bool, left: bool, right: bool) -> Vec2 {
    let x = f32::from(u8::from(right)) - f32::from(u8::from(left));
    let z = f32::from(u8::from(forward)) - f32::from(u8::from(backward));
    Vec2::new(x, z).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(mapper: &mut InputMapper, keys: &[&str]) {
        for k in keys {
            mapper.handle_key(&KeyEvent::down(k));
        }
    }

    #[test]
    fn single_key_gives_unit_axis() {
        let mut m = InputMapper::new();
        press(&mut m, &["w"]);
        assert_eq!(m.direction(), Vec2::new(0.0, 1.0));
        m.handle_key(&KeyEvent::up("w"));
        assert_eq!(m.direction(), Vec2::ZERO);
    }

    #[test]
    fn forward_left_is_normalized_diagonal() {
        let mut m = InputMapper::new();
        press(&mut m, &["w", "a"]);
        let d = m.direction();
        let k = std::f32::consts::FRAC_1_SQRT_2;
        assert!((d.x + k).abs() < 1e-6);
        assert!((d.z - k).abs() < 1e-6);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut m = InputMapper::new();
        press(&mut m, &["a", "d"]);
        assert_eq!(m.direction(), Vec2::ZERO);
    }

    #[test]
    fn arrows_and_wasd_share_directions() {
        let mut m = InputMapper::new();
        press(&mut m, &["ArrowUp", "w"]);
        m.handle_key(&KeyEvent::up("w"));
        // arrow still held
        assert_eq!(m.direction(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn space_sets_build_flag_only() {
        let mut m = InputMapper::new();
        assert!(m.handle_key(&KeyEvent::down(" ")));
        assert!(m.build_held());
        assert_eq!(m.direction(), Vec2::ZERO);
        m.handle_key(&KeyEvent::up(" "));
        assert!(!m.build_held());
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut m = InputMapper::new();
        press(&mut m, &["d"]);
        assert!(!m.handle_key(&KeyEvent::down("q")));
        assert_eq!(m.direction(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn reset_releases_everything() {
        let mut m = InputMapper::new();
        press(&mut m, &["d", " "]);
        m.reset();
        assert_eq!(m.direction(), Vec2::ZERO);
        assert!(!m.build_held());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const KEYS: [&str; 8] = [
            "w",
            "a",
            "s",
            "d",
            "arrowup",
            "arrowleft",
            "arrowdown",
            "arrowright",
        ];

        proptest! {
            #[test]
            fn direction_is_zero_or_unit_and_signed_by_net_keys(
                transitions in proptest::collection::vec((0usize..8, any::<bool>()), 0..40)
            ) {
                let mut m = InputMapper::new();
                let mut held = [false; 8];
                for &(idx, down) in &transitions {
                    held[idx] = down;
                    let ev = if down { KeyEvent::down(KEYS[idx]) } else { KeyEvent::up(KEYS[idx]) };
                    m.handle_key(&ev);
                }

                let d = m.direction();
                let len = d.length();
                prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-5, "length {}", len);

                let forward = held[0] || held[4];
                let left = held[1] || held[5];
                let backward = held[2] || held[6];
                let right = held[3] || held[7];
                let net_x = i32::from(right) - i32::from(left);
                let net_z = i32::from(forward) - i32::from(backward);
                prop_assert_eq!(d.x.signum() as i32 * i32::from(d.x != 0.0), net_x);
                prop_assert_eq!(d.z.signum() as i32 * i32::from(d.z != 0.0), net_z);
            }
        }
    }
}
