use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::data_source::CarouselDataSource;
use crate::model::CardKind;
use crate::positioning::{
    compute_placement, is_visible, max_offset, PlacementRule, PositionRequest,
};
use crate::scroll_positions::ScrollPositionManager;
use crate::storage::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    Animated(Duration),
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollReason {
    Navigation(PlacementRule),
    DataChanged(PlacementRule),
    Restore,
    Correction,
}

/// A scroll the host must perform. `generation` increases per carousel so
/// late completions of superseded scrolls can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollCommand {
    pub key: String,
    pub generation: u64,
    pub target: usize,
    pub mode: ScrollMode,
    pub reason: ScrollReason,
}

/// Reported by the host once a scroll has come to rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollSettled {
    pub key: String,
    pub generation: u64,
    pub offset: usize,
}

/// Collaborators a carousel consults while deciding where to scroll.
pub struct CarouselEnv<'a> {
    pub positions: &'a mut ScrollPositionManager,
    pub data: &'a mut dyn CarouselDataSource,
    pub config: &'a EngineConfig,
    pub now: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Left,
    Right,
}

/// What a renderer needs to draw one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselView {
    pub selected: Option<usize>,
    pub offset: usize,
    pub placeholder: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct CarouselController {
    key: String,
    scope: String,
    kind: CardKind,
    focused: bool,
    selected: Option<usize>,
    offset: usize,
    generation: u64,
    correction_generation: Option<u64>,
    last_request: Option<(usize, Instant)>,
    placeholder: Option<usize>,
    load_requested: bool,
    saw_loading: bool,
    known_items: usize,
}

impl CarouselController {
    pub fn new(key: impl Into<String>, scope: impl Into<String>, kind: CardKind) -> Self {
        Self {
            key: key.into(),
            scope: scope.into(),
            kind,
            focused: false,
            selected: None,
            offset: 0,
            generation: 0,
            correction_generation: None,
            last_request: None,
            placeholder: None,
            load_requested: false,
            saw_loading: false,
            known_items: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn kind(&self) -> CardKind {
        self.kind
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Selected index as renderers must see it: always `None` while the
    /// carousel does not hold focus.
    pub fn rendered_selected_index(&self) -> Option<usize> {
        if self.focused {
            self.selected
        } else {
            None
        }
    }

    pub fn placeholder_index(&self) -> Option<usize> {
        self.placeholder
    }

    pub fn view(&self) -> CarouselView {
        CarouselView {
            selected: self.rendered_selected_index(),
            offset: self.offset,
            placeholder: self.placeholder,
        }
    }

    fn loading(&self, data: &dyn CarouselDataSource) -> bool {
        self.load_requested || data.is_loading(&self.key)
    }

    /// Item count with the loading placeholder counted as a real slot.
    fn effective_total(&self, data: &dyn CarouselDataSource) -> usize {
        data.item_count(&self.key) + usize::from(self.loading(data))
    }

    fn issue(&mut self, target: usize, mode: ScrollMode, reason: ScrollReason) -> ScrollCommand {
        self.generation += 1;
        self.offset = target;
        ScrollCommand {
            key: self.key.clone(),
            generation: self.generation,
            target,
            mode,
            reason,
        }
    }

    /// The row came into view: jump straight to the remembered offset.
    pub fn attach(&mut self, env: &mut CarouselEnv<'_>) -> ScrollCommand {
        let capacity = env.config.tuning(self.kind).capacity;
        let saved = env.positions.scroll_position(&self.key);
        let restored = saved.min(max_offset(self.effective_total(env.data), capacity));
        if restored != saved {
            debug!(key = %self.key, saved, restored, "Clamped restored scroll offset");
        }
        self.known_items = env.data.item_count(&self.key);
        self.issue(restored, ScrollMode::Instant, ScrollReason::Restore)
    }

    pub fn focus(&mut self, env: &mut CarouselEnv<'_>) -> Option<ScrollCommand> {
        self.focused = true;
        let real = env.data.item_count(&self.key);
        self.known_items = real;
        if real == 0 {
            debug!(key = %self.key, "Focused an empty carousel");
            self.selected = None;
            return None;
        }

        let remembered = env.positions.user_index(&self.key).unwrap_or(0);
        let index = remembered.min(real - 1);
        if index != remembered {
            warn!(
                key = %self.key,
                remembered,
                clamped = index,
                "Remembered index no longer exists"
            );
        }
        env.positions.save_user_index(&self.key, index);
        self.selected = Some(index);
        self.reposition(env, false)
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Moves the selection one card. Returns `None` at either edge.
    pub fn step(&mut self, step: Step, env: &mut CarouselEnv<'_>) -> Option<ScrollCommand> {
        if !self.focused {
            return None;
        }
        let current = self.selected?;
        let real = env.data.item_count(&self.key);
        let next = match step {
            Step::Left => current.checked_sub(1)?,
            Step::Right if current + 1 < real => current + 1,
            Step::Right => {
                // Pressing into the end retries a page that failed to arrive
                self.maybe_load_more(current, env);
                return None;
            }
        };
        self.select(next, env)
    }

    /// Selects `index` directly, clamped to the real items.
    pub fn select(&mut self, index: usize, env: &mut CarouselEnv<'_>) -> Option<ScrollCommand> {
        let real = env.data.item_count(&self.key);
        if real == 0 {
            return None;
        }
        let index = index.min(real - 1);
        env.positions.record_navigation(&self.key, index);
        env.positions.save_user_index(&self.key, index);
        self.selected = Some(index);
        self.maybe_load_more(index, env);
        self.reposition(env, true)
    }

    fn maybe_load_more(&mut self, index: usize, env: &mut CarouselEnv<'_>) {
        let real = env.data.item_count(&self.key);
        if index + 1 < real || self.load_requested {
            return;
        }
        if !env.data.has_more_pages(&self.key) || env.data.is_loading(&self.key) {
            return;
        }

        info!(key = %self.key, index, "Reached last item, requesting next page");
        self.load_requested = true;
        self.saw_loading = false;
        self.placeholder = Some(real);
        env.data.load_more(&self.key);
    }

    fn reposition(&mut self, env: &mut CarouselEnv<'_>, debounce: bool) -> Option<ScrollCommand> {
        let selected = self.selected?;

        if debounce {
            if let Some((index, at)) = self.last_request {
                if index == selected
                    && env.now.saturating_duration_since(at) < env.config.debounce()
                {
                    debug!(key = %self.key, index, "Suppressing repeated scroll request");
                    return None;
                }
            }
        }
        self.last_request = Some((selected, env.now));

        let request = PositionRequest {
            selected_index: selected,
            total_items: self.effective_total(env.data),
            current_offset: self.offset,
            navigating_right: env.positions.is_navigating_right(&self.key),
            tuning: env.config.tuning(self.kind),
        };
        let placement = compute_placement(&request);
        debug!(
            key = %self.key,
            selected,
            rule = ?placement.rule,
            offset = placement.offset,
            right = request.navigating_right,
            "Placement"
        );

        if placement.offset == self.offset {
            return None;
        }

        let mode = if placement.rule.is_emergency() {
            ScrollMode::Instant
        } else {
            ScrollMode::Animated(
                env.config
                    .animation_duration(placement.offset.abs_diff(self.offset)),
            )
        };
        let reason = if debounce {
            ScrollReason::Navigation(placement.rule)
        } else {
            ScrollReason::DataChanged(placement.rule)
        };
        Some(self.issue(placement.offset, mode, reason))
    }

    /// Reconciles with the data source after its count or loading flag moved.
    pub fn on_data_changed(&mut self, env: &mut CarouselEnv<'_>) -> Option<ScrollCommand> {
        let real = env.data.item_count(&self.key);
        let loading_now = env.data.is_loading(&self.key);
        if loading_now {
            self.saw_loading = true;
        }

        if self.load_requested && !loading_now && (self.saw_loading || real != self.known_items)
        {
            info!(
                key = %self.key,
                before = self.known_items,
                after = real,
                "Page load finished"
            );
            self.load_requested = false;
            self.saw_loading = false;
        }

        if !self.loading(env.data) {
            self.placeholder = None;
        } else if self.placeholder.is_none() {
            self.placeholder = Some(real);
        }
        self.known_items = real;

        match self.selected {
            Some(index) if real == 0 => {
                warn!(key = %self.key, index, "Carousel emptied under the selection");
                self.selected = None;
            }
            Some(index) if index >= real => {
                let clamped = real - 1;
                warn!(key = %self.key, index, clamped, "Selected item removed, clamping");
                self.selected = Some(clamped);
                env.positions.save_user_index(&self.key, clamped);
            }
            None if self.focused && real > 0 => {
                let index = env.positions.user_index(&self.key).unwrap_or(0).min(real - 1);
                env.positions.save_user_index(&self.key, index);
                self.selected = Some(index);
            }
            _ => {}
        }

        if self.focused && self.selected.is_some() {
            return self.reposition(env, false);
        }

        let capacity = env.config.tuning(self.kind).capacity;
        let max = max_offset(self.effective_total(env.data), capacity);
        if self.offset > max {
            return Some(self.issue(
                max,
                ScrollMode::Instant,
                ScrollReason::DataChanged(PlacementRule::EndPin),
            ));
        }
        None
    }

    /// Verifies where a scroll actually came to rest. Issues at most one
    /// instant correction when the selection ended up outside the window.
    pub fn on_settled(
        &mut self,
        settled: &ScrollSettled,
        env: &mut CarouselEnv<'_>,
    ) -> Option<ScrollCommand> {
        if settled.generation != self.generation {
            debug!(
                key = %self.key,
                settled = settled.generation,
                current = self.generation,
                "Discarding stale scroll completion"
            );
            return None;
        }

        env.positions.save_scroll_position(&self.key, settled.offset);
        self.offset = settled.offset;

        let selected = self.selected.filter(|_| self.focused)?;
        let tuning = env.config.tuning(self.kind);
        if is_visible(selected, settled.offset, tuning.capacity) {
            return None;
        }

        if self.correction_generation == Some(settled.generation) {
            warn!(
                key = %self.key,
                selected,
                landed = settled.offset,
                "Selection still off-screen after correction"
            );
            return None;
        }

        let placement = compute_placement(&PositionRequest {
            selected_index: selected,
            total_items: self.effective_total(env.data),
            current_offset: settled.offset,
            navigating_right: env.positions.is_navigating_right(&self.key),
            tuning,
        });
        warn!(
            key = %self.key,
            selected,
            landed = settled.offset,
            target = placement.offset,
            "Selection landed off-screen, correcting"
        );
        let command = self.issue(placement.offset, ScrollMode::Instant, ScrollReason::Correction);
        self.correction_generation = Some(command.generation);
        Some(command)
    }
}

/// All carousels the engine knows about, keyed by carousel key.
#[derive(Debug, Default)]
pub struct CarouselRegistry {
    carousels: HashMap<String, CarouselController>,
}

impl CarouselRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure(&mut self, key: &str, scope: &str, kind: CardKind) -> &mut CarouselController {
        self.carousels
            .entry(key.to_string())
            .or_insert_with(|| CarouselController::new(key, scope, kind))
    }

    pub fn get(&self, key: &str) -> Option<&CarouselController> {
        self.carousels.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut CarouselController> {
        self.carousels.get_mut(key)
    }

    pub fn view(&self, key: &str) -> Option<CarouselView> {
        self.carousels.get(key).map(CarouselController::view)
    }

    pub fn focused_key(&self) -> Option<&str> {
        self.carousels
            .values()
            .find(|c| c.is_focused())
            .map(CarouselController::key)
    }

    pub fn blur_all(&mut self) {
        for carousel in self.carousels.values_mut() {
            carousel.blur();
        }
    }

    /// Focuses one carousel and blurs every other one.
    pub fn focus_exclusive(
        &mut self,
        key: &str,
        scope: &str,
        kind: CardKind,
        env: &mut CarouselEnv<'_>,
    ) -> Option<ScrollCommand> {
        for (other_key, carousel) in self.carousels.iter_mut() {
            if other_key != key {
                carousel.blur();
            }
        }
        self.ensure(key, scope, kind).focus(env)
    }

    /// Forgets every carousel of a route that left the back stack.
    pub fn drop_scope(&mut self, scope: &str) -> usize {
        let before = self.carousels.len();
        self.carousels.retain(|_, c| c.scope() != scope);
        before - self.carousels.len()
    }

    pub fn on_data_changed(&mut self, key: &str, env: &mut CarouselEnv<'_>) -> Option<ScrollCommand> {
        self.carousels.get_mut(key)?.on_data_changed(env)
    }

    pub fn on_settled(
        &mut self,
        settled: &ScrollSettled,
        env: &mut CarouselEnv<'_>,
    ) -> Option<ScrollCommand> {
        match self.carousels.get_mut(&settled.key) {
            Some(carousel) => carousel.on_settled(settled, env),
            None => {
                debug!(key = %settled.key, "Settle for unknown carousel");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::testing::FakeData;

    const KEY: &str = "trending";

    struct Harness {
        positions: ScrollPositionManager,
        data: FakeData,
        config: EngineConfig,
        now: Instant,
    }

    impl Harness {
        fn new(count: usize) -> Self {
            Self {
                positions: ScrollPositionManager::new(),
                data: FakeData::default().with(KEY, count),
                config: EngineConfig::default(),
                now: Instant::now(),
            }
        }

        fn env(&mut self) -> CarouselEnv<'_> {
            CarouselEnv {
                positions: &mut self.positions,
                data: &mut self.data,
                config: &self.config,
                now: self.now,
            }
        }

        fn advance(&mut self, ms: u64) {
            self.now += Duration::from_millis(ms);
        }
    }

    fn focused(h: &mut Harness) -> CarouselController {
        let mut carousel = CarouselController::new(KEY, "main", CardKind::Media);
        assert_eq!(carousel.focus(&mut h.env()), None);
        carousel
    }

    #[test]
    fn test_focus_selects_first_item_and_blur_hides_selection() {
        let mut h = Harness::new(20);
        let mut carousel = focused(&mut h);
        assert_eq!(carousel.rendered_selected_index(), Some(0));
        assert_eq!(h.positions.user_index(KEY), Some(0));

        carousel.blur();
        assert_eq!(carousel.rendered_selected_index(), None);
        assert_eq!(carousel.view().selected, None);
    }

    #[test]
    fn test_stepping_right_scrolls_only_past_start_pin() {
        let mut h = Harness::new(20);
        let mut carousel = focused(&mut h);

        for _ in 0..4 {
            h.advance(50);
            assert_eq!(carousel.step(Step::Right, &mut h.env()), None);
        }
        h.advance(50);
        let command = carousel.step(Step::Right, &mut h.env()).unwrap();

        assert_eq!(command.target, 1);
        assert_eq!(command.mode, ScrollMode::Animated(Duration::from_millis(360)));
        assert_eq!(
            command.reason,
            ScrollReason::Navigation(PlacementRule::Centered)
        );
        assert_eq!(carousel.view().selected, Some(5));
        assert!(h.positions.is_navigating_right(KEY));
    }

    #[test]
    fn test_step_left_at_start_is_noop() {
        let mut h = Harness::new(20);
        let mut carousel = focused(&mut h);
        assert_eq!(carousel.step(Step::Left, &mut h.env()), None);
        assert_eq!(carousel.view().selected, Some(0));
    }

    #[test]
    fn test_external_jump_uses_instant_emergency_scroll() {
        let mut h = Harness::new(20);
        let mut carousel = focused(&mut h);

        let command = carousel.select(12, &mut h.env()).unwrap();
        assert_eq!(command.mode, ScrollMode::Instant);
        assert_eq!(
            command.reason,
            ScrollReason::Navigation(PlacementRule::OffScreenEmergency)
        );
        assert_eq!(command.target, 8);
    }

    #[test]
    fn test_last_item_requests_next_page_with_placeholder() {
        let mut h = Harness::new(6);
        h.data.set_has_more(KEY, true);
        let mut carousel = focused(&mut h);

        let command = carousel.select(5, &mut h.env()).unwrap();
        assert_eq!(h.data.load_calls, vec![KEY.to_string()]);
        assert_eq!(carousel.placeholder_index(), Some(6));
        // Placeholder counts as a slot, so the row pins to its end
        assert_eq!(command.target, 1);

        // No second request while the first is in flight
        h.advance(300);
        carousel.select(5, &mut h.env());
        assert_eq!(h.data.load_calls.len(), 1);

        h.data.set(KEY, 12);
        h.data.set_loading(KEY, false);
        assert_eq!(carousel.on_data_changed(&mut h.env()), None);
        assert_eq!(carousel.placeholder_index(), None);
        assert_eq!(carousel.view().selected, Some(5));
        assert_eq!(carousel.offset(), 1);
    }

    #[test]
    fn test_external_loading_shows_placeholder_at_end() {
        let mut h = Harness::new(8);
        let mut carousel = focused(&mut h);
        h.data.set_loading(KEY, true);
        carousel.on_data_changed(&mut h.env());
        assert_eq!(carousel.placeholder_index(), Some(8));

        h.data.set_loading(KEY, false);
        carousel.on_data_changed(&mut h.env());
        assert_eq!(carousel.placeholder_index(), None);
    }

    #[test]
    fn test_repeat_request_within_debounce_window_is_suppressed() {
        let mut h = Harness::new(20);
        let mut carousel = focused(&mut h);
        let command = carousel.select(10, &mut h.env()).unwrap();
        assert_eq!(command.target, 6);

        // Host undershoots but the selection is still visible
        let settled = ScrollSettled {
            key: KEY.to_string(),
            generation: command.generation,
            offset: 5,
        };
        assert_eq!(carousel.on_settled(&settled, &mut h.env()), None);
        assert_eq!(carousel.offset(), 5);

        h.advance(100);
        assert_eq!(carousel.select(10, &mut h.env()), None);

        h.advance(150);
        let command = carousel.select(10, &mut h.env()).unwrap();
        assert_eq!(command.target, 6);
    }

    #[test]
    fn test_off_screen_landing_is_corrected_once() {
        let mut h = Harness::new(20);
        let mut carousel = focused(&mut h);
        let command = carousel.select(10, &mut h.env()).unwrap();

        let settled = ScrollSettled {
            key: KEY.to_string(),
            generation: command.generation,
            offset: 0,
        };
        let correction = carousel.on_settled(&settled, &mut h.env()).unwrap();
        assert_eq!(correction.mode, ScrollMode::Instant);
        assert_eq!(correction.reason, ScrollReason::Correction);
        assert_eq!(correction.target, 6);
        assert_eq!(h.positions.scroll_position(KEY), 0);

        let settled_again = ScrollSettled {
            generation: correction.generation,
            ..settled
        };
        assert_eq!(carousel.on_settled(&settled_again, &mut h.env()), None);
    }

    #[test]
    fn test_stale_settle_is_discarded() {
        let mut h = Harness::new(20);
        let mut carousel = focused(&mut h);
        let first = carousel.select(10, &mut h.env()).unwrap();
        h.advance(10);
        let second = carousel.select(15, &mut h.env()).unwrap();
        assert!(second.generation > first.generation);

        let stale = ScrollSettled {
            key: KEY.to_string(),
            generation: first.generation,
            offset: 3,
        };
        assert_eq!(carousel.on_settled(&stale, &mut h.env()), None);
        assert_eq!(carousel.offset(), second.target);
        assert_eq!(h.positions.record(KEY).map(|r| r.scroll_offset), Some(0));
    }

    #[test]
    fn test_removed_items_clamp_selection_and_persist() {
        let mut h = Harness::new(20);
        let mut carousel = focused(&mut h);
        carousel.select(9, &mut h.env());

        h.data.set(KEY, 4);
        carousel.on_data_changed(&mut h.env());
        assert_eq!(carousel.view().selected, Some(3));
        assert_eq!(h.positions.user_index(KEY), Some(3));
        assert_eq!(carousel.offset(), 0);
    }

    #[test]
    fn test_focus_restores_and_clamps_remembered_index() {
        let mut h = Harness::new(5);
        h.positions.save_user_index(KEY, 9);
        let mut carousel = CarouselController::new(KEY, "main", CardKind::Media);
        carousel.focus(&mut h.env());
        assert_eq!(carousel.view().selected, Some(4));
        assert_eq!(h.positions.user_index(KEY), Some(4));
    }

    #[test]
    fn test_empty_carousel_selects_when_data_arrives() {
        let mut h = Harness::new(0);
        let mut carousel = focused(&mut h);
        assert_eq!(carousel.view().selected, None);

        h.data.set(KEY, 10);
        carousel.on_data_changed(&mut h.env());
        assert_eq!(carousel.view().selected, Some(0));
    }

    #[test]
    fn test_attach_restores_saved_offset_instantly() {
        let mut h = Harness::new(10);
        h.positions.save_scroll_position(KEY, 9);
        let mut carousel = CarouselController::new(KEY, "main", CardKind::Media);

        let command = carousel.attach(&mut h.env());
        assert_eq!(command.mode, ScrollMode::Instant);
        assert_eq!(command.reason, ScrollReason::Restore);
        assert_eq!(command.target, 4);
    }

    #[test]
    fn test_registry_focus_is_exclusive() {
        let mut h = Harness::new(10);
        h.data.set("studios", 10);
        let mut registry = CarouselRegistry::new();

        registry.focus_exclusive(KEY, "main", CardKind::Media, &mut h.env());
        registry.focus_exclusive("studios", "main", CardKind::Category, &mut h.env());

        assert_eq!(registry.focused_key(), Some("studios"));
        assert_eq!(registry.view(KEY).map(|v| v.selected), Some(None));

        registry.ensure("details/1/cast", "details/1/movie", CardKind::Media);
        assert_eq!(registry.drop_scope("details/1/movie"), 1);
        assert!(registry.get("details/1/cast").is_none());
        assert_eq!(registry.drop_scope("main"), 2);
    }
}
