use tokio::sync::watch;
use tracing::debug;

use crate::focus_state::FocusState;

/// Owner of the single process-wide [`FocusState`].
///
/// Writes are total: the stored value after `set_focus(x)` is exactly `x`.
/// No validation happens here; callers clamp before writing.
#[derive(Debug)]
pub struct AppFocusManager {
    current: FocusState,
    last_screen_focus: Option<FocusState>,
    generation: u64,
    publisher: watch::Sender<FocusState>,
}

impl AppFocusManager {
    pub fn new(initial: FocusState) -> Self {
        let (publisher, _) = watch::channel(initial);
        Self {
            current: initial,
            last_screen_focus: (!initial.is_top_bar()).then_some(initial),
            generation: 0,
            publisher,
        }
    }

    pub fn current_focus(&self) -> FocusState {
        self.current
    }

    pub fn set_focus(&mut self, focus: FocusState) {
        if focus != self.current {
            debug!(from = ?self.current, to = ?focus, "Focus transition");
        }
        self.current = focus;
        if !focus.is_top_bar() {
            self.last_screen_focus = Some(focus);
        }
        self.generation += 1;
        self.publisher.send_replace(focus);
    }

    /// Focus that was active before the top bar took over, if any.
    pub fn last_screen_focus(&self) -> Option<FocusState> {
        self.last_screen_focus
    }

    /// Forgets the top-bar return target, e.g. after a route change.
    pub fn reset_screen_focus(&mut self) {
        self.last_screen_focus = None;
    }

    /// Number of writes since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn subscribe(&self) -> watch::Receiver<FocusState> {
        self.publisher.subscribe()
    }
}

impl Default for AppFocusManager {
    fn default() -> Self {
        Self::new(FocusState::default())
    }
}
