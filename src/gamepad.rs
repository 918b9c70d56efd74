use crate::input::{Key, KeyEvent, KeyPhase};
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const DEADZONE: f32 = 0.6;

#[derive(Debug, Default)]
struct AxisState {
    dir_x: i8,
    dir_y: i8,
}

/// Synthesizes repeated presses while a direction is held.
#[derive(Debug)]
pub struct KeyRepeater {
    held: Option<(Key, Instant, Instant)>,
    delay: Duration,
    interval: Duration,
}

impl KeyRepeater {
    pub fn new(delay: Duration, interval: Duration) -> Self {
        Self {
            held: None,
            delay,
            interval,
        }
    }

    pub fn press(&mut self, key: Key, now: Instant) {
        self.held = key.is_directional().then_some((key, now, now));
    }

    pub fn release(&mut self, key: Key) {
        if matches!(self.held, Some((held, _, _)) if held == key) {
            self.held = None;
        }
    }

    /// Returns the held key when a repeat is due.
    pub fn poll(&mut self, now: Instant) -> Option<Key> {
        let (key, started, last) = self.held.as_mut()?;
        if now.duration_since(*started) >= self.delay && now.duration_since(*last) >= self.interval
        {
            *last = now;
            return Some(*key);
        }
        None
    }
}

/// Reads controllers on a dedicated thread and forwards their presses.
/// The channel closes if no gamepad backend is available.
pub fn spawn_gamepad_listener(
    repeat_delay: Duration,
    repeat_interval: Duration,
) -> mpsc::UnboundedReceiver<KeyEvent> {
    let (sender, receiver) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("gamepad".to_string())
        .spawn(move || run_listener(sender, repeat_delay, repeat_interval));
    if let Err(e) = spawned {
        error!("Failed to start gamepad thread: {}", e);
    }
    receiver
}

fn run_listener(
    sender: mpsc::UnboundedSender<KeyEvent>,
    repeat_delay: Duration,
    repeat_interval: Duration,
) {
    let mut gilrs = match Gilrs::new() {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to initialize Gilrs: {}", e);
            return;
        }
    };
    for (_, gamepad) in gilrs.gamepads() {
        info!(name = gamepad.name(), "Gamepad found");
    }

    let mut axis_states: HashMap<GamepadId, AxisState> = HashMap::new();
    let mut repeater = KeyRepeater::new(repeat_delay, repeat_interval);

    loop {
        while let Some(Event { id, event, .. }) = gilrs.next_event() {
            if let EventType::Disconnected = event {
                axis_states.remove(&id);
                continue;
            }

            let state = axis_states.entry(id).or_default();
            let Some(input) = process_event(event, state) else {
                continue;
            };
            match input.phase {
                KeyPhase::Down => repeater.press(input.key, Instant::now()),
                KeyPhase::Up => repeater.release(input.key),
            }
            if sender.send(input).is_err() {
                return;
            }
        }

        if let Some(key) = repeater.poll(Instant::now()) {
            if sender.send(KeyEvent::down(key)).is_err() {
                return;
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

fn map_button(button: Button) -> Option<Key> {
    match button {
        Button::South | Button::Start => Some(Key::Enter),
        Button::East | Button::Select => Some(Key::Back),
        Button::North => Some(Key::Refresh),
        Button::DPadUp => Some(Key::Up),
        Button::DPadDown => Some(Key::Down),
        Button::DPadLeft => Some(Key::Left),
        Button::DPadRight => Some(Key::Right),
        _ => None,
    }
}

fn map_axis_value(value: f32) -> i8 {
    if value <= -DEADZONE {
        -1
    } else if value >= DEADZONE {
        1
    } else {
        0
    }
}

/// Turns a stick crossing the deadzone into a press, and its return to
/// center into the matching release.
fn axis_step(value: f32, dir: &mut i8, negative: Key, positive: Key) -> Option<KeyEvent> {
    let new_dir = map_axis_value(value);
    if new_dir == *dir {
        return None;
    }
    let old_dir = std::mem::replace(dir, new_dir);
    match (new_dir, old_dir) {
        (-1, _) => Some(KeyEvent::down(negative)),
        (1, _) => Some(KeyEvent::down(positive)),
        (0, -1) => Some(KeyEvent::up(negative)),
        (0, 1) => Some(KeyEvent::up(positive)),
        _ => None,
    }
}

fn process_event(event: EventType, state: &mut AxisState) -> Option<KeyEvent> {
    match event {
        EventType::ButtonPressed(button, _) => map_button(button).map(KeyEvent::down),
        EventType::ButtonReleased(button, _) => map_button(button).map(KeyEvent::up),
        // gilrs reports stick Y positive when pushed up
        EventType::AxisChanged(Axis::LeftStickX, value, _) => {
            axis_step(value, &mut state.dir_x, Key::Left, Key::Right)
        }
        EventType::AxisChanged(Axis::LeftStickY, value, _) => {
            axis_step(value, &mut state.dir_y, Key::Down, Key::Up)
        }
        _ => None,
    }
}
