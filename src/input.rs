//! Keyboard state with edge detection
//!
//! The window layer records key transitions as they arrive; the game reads
//! levels (`is_down`) for movement and edges (`just_pressed`) for one-shot
//! actions such as confirming a menu. `end_frame` rolls the current set into
//! the previous one so an edge is reported for exactly one frame.

use std::collections::HashSet;

use winit::keyboard::{KeyCode, PhysicalKey};

/// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    W,
    S,
    Up,
    Down,
    Escape,
}

impl Key {
    /// Map a physical key; layout-independent so W/S sit under the left hand
    /// on any keyboard
    pub fn from_physical(key: PhysicalKey) -> Option<Self> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        match code {
            KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
            KeyCode::KeyW => Some(Key::W),
            KeyCode::KeyS => Some(Key::S),
            KeyCode::ArrowUp => Some(Key::Up),
            KeyCode::ArrowDown => Some(Key::Down),
            KeyCode::Escape => Some(Key::Escape),
            _ => None,
        }
    }
}

/// Current and previous-frame key levels
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    down: HashSet<Key>,
    previous: HashSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release
    pub fn set(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.down.insert(key);
        } else {
            self.down.remove(&key);
        }
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    /// Down now, up at the end of the previous frame
    pub fn just_pressed(&self, key: Key) -> bool {
        self.down.contains(&key) && !self.previous.contains(&key)
    }

    pub fn just_released(&self, key: Key) -> bool {
        !self.down.contains(&key) && self.previous.contains(&key)
    }

    /// Close the frame: current levels become the baseline for the next edges
    pub fn end_frame(&mut self) {
        self.previous.clone_from(&self.down);
    }

    /// Forget every held key (e.g. on focus loss)
    pub fn clear(&mut self) {
        self.down.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_an_edge_for_one_frame() {
        let mut keys = KeyboardState::new();
        keys.set(Key::Enter, true);
        assert!(keys.just_pressed(Key::Enter));
        assert!(keys.is_down(Key::Enter));

        keys.end_frame();
        // Still held: level stays, edge is gone
        assert!(keys.is_down(Key::Enter));
        assert!(!keys.just_pressed(Key::Enter));
    }

    #[test]
    fn test_release_edge() {
        let mut keys = KeyboardState::new();
        keys.set(Key::W, true);
        keys.end_frame();
        keys.set(Key::W, false);
        assert!(keys.just_released(Key::W));
        assert!(!keys.is_down(Key::W));
        keys.end_frame();
        assert!(!keys.just_released(Key::W));
    }

    #[test]
    fn test_tap_within_one_frame_is_not_an_edge() {
        let mut keys = KeyboardState::new();
        keys.set(Key::Enter, true);
        keys.set(Key::Enter, false);
        assert!(!keys.just_pressed(Key::Enter));
    }

    #[test]
    fn test_physical_key_mapping() {
        assert_eq!(Key::from_physical(PhysicalKey::Code(KeyCode::KeyW)), Some(Key::W));
        assert_eq!(Key::from_physical(PhysicalKey::Code(KeyCode::NumpadEnter)), Some(Key::Enter));
        assert_eq!(Key::from_physical(PhysicalKey::Code(KeyCode::ArrowDown)), Some(Key::Down));
        assert_eq!(Key::from_physical(PhysicalKey::Code(KeyCode::Space)), None);
    }

    #[test]
    fn test_clear_releases_all() {
        let mut keys = KeyboardState::new();
        keys.set(Key::Up, true);
        keys.set(Key::Down, true);
        keys.end_frame();
        keys.clear();
        assert!(!keys.is_down(Key::Up));
        assert!(keys.just_released(Key::Down));
    }
}
