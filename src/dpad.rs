use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::context::ScreenContext;
use crate::input::{Key, KeyEvent, KeyPhase};
use crate::route::{Route, TOP_BAR_ROUTE};

pub type KeyHandler = Box<dyn FnMut(&mut ScreenContext<'_>)>;

/// Input handlers a screen installs for its route. Keys without a handler
/// are left to the platform.
pub struct ScreenConfig {
    pub route: String,
    pub on_up: Option<KeyHandler>,
    pub on_down: Option<KeyHandler>,
    pub on_left: Option<KeyHandler>,
    pub on_right: Option<KeyHandler>,
    pub on_enter: Option<KeyHandler>,
    pub on_back: Option<KeyHandler>,
    pub on_refresh: Option<KeyHandler>,
}

impl ScreenConfig {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            on_up: None,
            on_down: None,
            on_left: None,
            on_right: None,
            on_enter: None,
            on_back: None,
            on_refresh: None,
        }
    }

    pub fn on(mut self, key: Key, handler: impl FnMut(&mut ScreenContext<'_>) + 'static) -> Self {
        let slot = match key {
            Key::Up => &mut self.on_up,
            Key::Down => &mut self.on_down,
            Key::Left => &mut self.on_left,
            Key::Right => &mut self.on_right,
            Key::Enter => &mut self.on_enter,
            Key::Back => &mut self.on_back,
            Key::Refresh => &mut self.on_refresh,
        };
        *slot = Some(Box::new(handler));
        self
    }

    fn handler_mut(&mut self, key: Key) -> Option<&mut KeyHandler> {
        match key {
            Key::Up => self.on_up.as_mut(),
            Key::Down => self.on_down.as_mut(),
            Key::Left => self.on_left.as_mut(),
            Key::Right => self.on_right.as_mut(),
            Key::Enter => self.on_enter.as_mut(),
            Key::Back => self.on_back.as_mut(),
            Key::Refresh => self.on_refresh.as_mut(),
        }
    }
}

impl fmt::Debug for ScreenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenConfig")
            .field("route", &self.route)
            .field("on_up", &self.on_up.is_some())
            .field("on_down", &self.on_down.is_some())
            .field("on_left", &self.on_left.is_some())
            .field("on_right", &self.on_right.is_some())
            .field("on_enter", &self.on_enter.is_some())
            .field("on_back", &self.on_back.is_some())
            .field("on_refresh", &self.on_refresh.is_some())
            .finish()
    }
}

/// Routes key presses to the handlers of the active screen.
///
/// Registration is keyed by route pattern; registering the same route again
/// replaces the earlier handlers.
#[derive(Debug, Default)]
pub struct DpadController {
    screens: HashMap<String, ScreenConfig>,
}

impl DpadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_screen(&mut self, config: ScreenConfig) {
        if self.screens.contains_key(&config.route) {
            debug!(route = %config.route, "Replacing screen handlers");
        }
        self.screens.insert(config.route.clone(), config);
    }

    pub fn unregister_screen(&mut self, route: &str) -> bool {
        self.screens.remove(route).is_some()
    }

    /// Dispatches a key to the active screen, or to the top bar while it
    /// holds focus. Returns whether the event was consumed.
    pub fn on_key_event(&mut self, event: KeyEvent, ctx: &mut ScreenContext<'_>) -> bool {
        if event.phase != KeyPhase::Down {
            return false;
        }

        let active: &Route = ctx.route;
        let target = if ctx.current_focus().is_top_bar() {
            TOP_BAR_ROUTE
        } else {
            active.pattern()
        };

        let Some(screen) = self.screens.get_mut(target) else {
            debug!(route = target, key = ?event.key, "No screen registered");
            return false;
        };
        let Some(handler) = screen.handler_mut(event.key) else {
            debug!(route = target, key = ?event.key, "Screen has no handler for key");
            return false;
        };

        handler(ctx);
        true
    }
}
