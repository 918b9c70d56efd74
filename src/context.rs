use std::time::Instant;

use crate::carousel::{CarouselEnv, CarouselRegistry, ScrollCommand, Step};
use crate::data_source::CarouselDataSource;
use crate::focus_manager::AppFocusManager;
use crate::focus_state::FocusState;
use crate::messages::{Activation, NavRequest};
use crate::model::CardKind;
use crate::route::Route;
use crate::screens::carousel_for;
use crate::scroll_positions::ScrollPositionManager;
use crate::storage::EngineConfig;

/// Everything a screen handler may touch while reacting to one key.
///
/// Side effects that leave the engine (route changes, scrolls, activations)
/// are queued here and collected by the engine after the handler returns.
pub struct ScreenContext<'a> {
    pub focus: &'a mut AppFocusManager,
    pub positions: &'a mut ScrollPositionManager,
    pub carousels: &'a mut CarouselRegistry,
    pub data: &'a mut dyn CarouselDataSource,
    pub config: &'a EngineConfig,
    pub route: &'a Route,
    pub now: Instant,
    pub(crate) navigation: Vec<NavRequest>,
    pub(crate) commands: Vec<ScrollCommand>,
    pub(crate) activations: Vec<Activation>,
}

impl<'a> ScreenContext<'a> {
    pub fn new(
        focus: &'a mut AppFocusManager,
        positions: &'a mut ScrollPositionManager,
        carousels: &'a mut CarouselRegistry,
        data: &'a mut dyn CarouselDataSource,
        config: &'a EngineConfig,
        route: &'a Route,
        now: Instant,
    ) -> Self {
        Self {
            focus,
            positions,
            carousels,
            data,
            config,
            route,
            now,
            navigation: Vec::new(),
            commands: Vec::new(),
            activations: Vec::new(),
        }
    }

    pub fn current_focus(&self) -> FocusState {
        self.focus.current_focus()
    }

    pub fn set_focus(&mut self, focus: FocusState) {
        self.focus.set_focus(focus);
    }

    pub fn navigate(&mut self, route: impl Into<String>) {
        self.navigation.push(NavRequest::Navigate(route.into()));
    }

    pub fn back(&mut self) {
        self.navigation.push(NavRequest::Back);
    }

    pub fn activate(&mut self, activation: Activation) {
        self.activations.push(activation);
    }

    pub fn item_count(&self, key: &str) -> usize {
        self.data.item_count(key)
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.data.is_loading(key)
    }

    pub fn has_more_pages(&self, key: &str) -> bool {
        self.data.has_more_pages(key)
    }

    pub fn load_more(&mut self, key: &str) {
        self.data.load_more(key);
    }

    pub fn item_route(&self, key: &str, index: usize) -> Option<String> {
        self.data.item_route(key, index)
    }

    /// Focuses the carousel `key` (scoped to the active route), blurring
    /// every other carousel.
    pub fn focus_carousel(&mut self, key: &str, kind: CardKind) {
        let scope = self.route.to_string();
        let mut env = CarouselEnv {
            positions: &mut *self.positions,
            data: &mut *self.data,
            config: self.config,
            now: self.now,
        };
        let command = self.carousels.focus_exclusive(key, &scope, kind, &mut env);
        self.commands.extend(command);
    }

    /// Moves carousel focus to whichever row the current focus points at,
    /// or blurs every row when it points at none.
    pub fn sync_carousel_focus(&mut self) {
        match carousel_for(self.current_focus(), self.route) {
            Some((key, kind)) => {
                if self.carousels.focused_key() != Some(key.as_str()) {
                    self.focus_carousel(&key, kind);
                }
            }
            None => self.blur_carousels(),
        }
    }

    pub fn blur_carousels(&mut self) {
        self.carousels.blur_all();
    }

    pub fn step_carousel(&mut self, key: &str, step: Step) {
        let mut env = CarouselEnv {
            positions: &mut *self.positions,
            data: &mut *self.data,
            config: self.config,
            now: self.now,
        };
        if let Some(carousel) = self.carousels.get_mut(key) {
            self.commands.extend(carousel.step(step, &mut env));
        }
    }

    pub fn selected_index(&self, key: &str) -> Option<usize> {
        self.carousels
            .get(key)
            .and_then(|c| c.rendered_selected_index())
    }
}
