/// Logical remote-control key. Every screen is driven by these alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Back,
    Refresh,
}

impl Key {
    pub fn is_directional(self) -> bool {
        matches!(self, Key::Up | Key::Down | Key::Left | Key::Right)
    }

    /// Parses the stdin command names used by the headless driver.
    pub fn from_command(command: &str) -> Option<Self> {
        match command.trim().to_ascii_lowercase().as_str() {
            "up" | "u" | "k" => Some(Key::Up),
            "down" | "d" | "j" => Some(Key::Down),
            "left" | "l" | "h" => Some(Key::Left),
            "right" | "r" => Some(Key::Right),
            "enter" | "ok" | "select" => Some(Key::Enter),
            "back" | "b" | "esc" => Some(Key::Back),
            "refresh" => Some(Key::Refresh),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub phase: KeyPhase,
}

impl KeyEvent {
    pub fn down(key: Key) -> Self {
        Self {
            key,
            phase: KeyPhase::Down,
        }
    }

    pub fn up(key: Key) -> Self {
        Self {
            key,
            phase: KeyPhase::Up,
        }
    }
}
