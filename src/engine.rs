use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::carousel::{CarouselEnv, CarouselRegistry, CarouselView, ScrollCommand, ScrollSettled};
use crate::context::ScreenContext;
use crate::data_source::CarouselDataSource;
use crate::dpad::{DpadController, ScreenConfig};
use crate::focus_manager::AppFocusManager;
use crate::focus_state::FocusState;
use crate::input::KeyEvent;
use crate::messages::{Activation, NavRequest};
use crate::model::CardKind;
use crate::navigation::{NavigationCoordinator, RouteChange, Router};
use crate::route::Route;
use crate::screens::{default_screens, details_screen, DetailsLayout};
use crate::scroll_positions::ScrollPositionManager;
use crate::storage::EngineConfig;

/// Everything a key press produced besides the focus change itself.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    /// `false` means the platform should handle the key (e.g. exit on Back).
    pub consumed: bool,
    pub commands: Vec<ScrollCommand>,
    pub activations: Vec<Activation>,
}

/// Focus, d-pad dispatch and carousel positioning behind one entry point.
/// Runs on the UI thread; nothing in here is `Send`.
pub struct FocusEngine {
    config: EngineConfig,
    route: Route,
    focus: AppFocusManager,
    dpad: DpadController,
    coordinator: NavigationCoordinator,
    positions: ScrollPositionManager,
    carousels: CarouselRegistry,
}

impl FocusEngine {
    pub fn new(config: EngineConfig) -> Self {
        let mut dpad = DpadController::new();
        for screen in default_screens(&config) {
            dpad.register_screen(screen);
        }
        Self {
            config,
            route: Route::Main,
            focus: AppFocusManager::default(),
            dpad,
            coordinator: NavigationCoordinator::new(),
            positions: ScrollPositionManager::new(),
            carousels: CarouselRegistry::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn current_focus(&self) -> FocusState {
        self.focus.current_focus()
    }

    pub fn subscribe_focus(&self) -> watch::Receiver<FocusState> {
        self.focus.subscribe()
    }

    pub fn carousel_view(&self, key: &str) -> Option<CarouselView> {
        self.carousels.view(key)
    }

    /// Installs handlers for a route, replacing any earlier ones.
    pub fn register_screen(&mut self, screen: ScreenConfig) {
        self.dpad.register_screen(screen);
    }

    pub fn unregister_screen(&mut self, route: &str) -> bool {
        self.dpad.unregister_screen(route)
    }

    pub fn handle_key(
        &mut self,
        event: KeyEvent,
        router: &mut dyn Router,
        data: &mut dyn CarouselDataSource,
        now: Instant,
    ) -> KeyOutcome {
        let mut ctx = ScreenContext::new(
            &mut self.focus,
            &mut self.positions,
            &mut self.carousels,
            &mut *data,
            &self.config,
            &self.route,
            now,
        );
        let consumed = self.dpad.on_key_event(event, &mut ctx);
        if consumed {
            ctx.sync_carousel_focus();
        }
        let navigation = std::mem::take(&mut ctx.navigation);
        let mut commands = std::mem::take(&mut ctx.commands);
        let activations = std::mem::take(&mut ctx.activations);
        drop(ctx);

        for request in navigation {
            match request {
                NavRequest::Navigate(route) => {
                    info!(%route, "Navigating");
                    router.navigate(&route);
                }
                NavRequest::Back => {
                    if !router.pop_back() {
                        debug!("Back at root route");
                        continue;
                    }
                }
            }
            commands.extend(self.on_route_changed(&*router, data, now));
        }

        KeyOutcome {
            consumed,
            commands,
            activations,
        }
    }

    /// Must be called whenever the router's active route changes, including
    /// changes the engine did not request (system back, deep links).
    pub fn on_route_changed(
        &mut self,
        router: &dyn Router,
        data: &mut dyn CarouselDataSource,
        now: Instant,
    ) -> Vec<ScrollCommand> {
        self.route = Route::resolve(&router.current_route());
        if matches!(self.route, Route::Details { .. }) {
            let layout = self
                .coordinator
                .details_layout(&self.route)
                .cloned()
                .unwrap_or_default();
            self.dpad.register_screen(details_screen(layout));
        }
        let mut ctx = ScreenContext::new(
            &mut self.focus,
            &mut self.positions,
            &mut self.carousels,
            data,
            &self.config,
            &self.route,
            now,
        );
        let change = self.coordinator.enter(&mut ctx, router.depth());
        if change != RouteChange::Unchanged {
            debug!(route = %self.route, ?change, "Route change applied");
        }
        std::mem::take(&mut ctx.commands)
    }

    /// Tells the engine which parts a details page has once its media is
    /// known. Applies right away when `route` is on screen, pulling focus
    /// out of an area the page no longer shows.
    pub fn set_details_layout(&mut self, route: &str, layout: DetailsLayout) {
        let route = Route::resolve(route);
        if route == self.route {
            if let FocusState::Details(area) = self.focus.current_focus() {
                if !layout.contains(area) {
                    let first = layout.first_area();
                    warn!(?area, ?first, "Focused area is not part of the details layout");
                    self.focus.set_focus(FocusState::Details(first));
                    self.carousels.blur_all();
                }
            }
            self.dpad.register_screen(details_screen(layout.clone()));
        }
        self.coordinator.set_details_layout(route, layout);
    }

    /// A carousel row became visible; restores its saved scroll offset.
    pub fn attach_carousel(
        &mut self,
        key: &str,
        kind: CardKind,
        data: &mut dyn CarouselDataSource,
        now: Instant,
    ) -> ScrollCommand {
        let scope = self.route.to_string();
        let mut env = CarouselEnv {
            positions: &mut self.positions,
            data,
            config: &self.config,
            now,
        };
        self.carousels.ensure(key, &scope, kind).attach(&mut env)
    }

    pub fn on_data_changed(
        &mut self,
        key: &str,
        data: &mut dyn CarouselDataSource,
        now: Instant,
    ) -> Option<ScrollCommand> {
        let mut env = CarouselEnv {
            positions: &mut self.positions,
            data,
            config: &self.config,
            now,
        };
        self.carousels.on_data_changed(key, &mut env)
    }

    pub fn on_scroll_settled(
        &mut self,
        settled: &ScrollSettled,
        data: &mut dyn CarouselDataSource,
        now: Instant,
    ) -> Option<ScrollCommand> {
        let mut env = CarouselEnv {
            positions: &mut self.positions,
            data,
            config: &self.config,
            now,
        };
        self.carousels.on_settled(settled, &mut env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::ScrollMode;
    use crate::data_source::testing::FakeData;
    use crate::focus_state::{BrowseFocus, DetailsArea, TopBarTarget};
    use crate::input::Key;
    use crate::model::MediaCategory;

    #[derive(Debug)]
    struct FakeRouter {
        stack: Vec<String>,
    }

    impl FakeRouter {
        fn new() -> Self {
            Self {
                stack: vec!["main".to_string()],
            }
        }
    }

    impl Router for FakeRouter {
        fn current_route(&self) -> String {
            self.stack.last().cloned().unwrap_or_default()
        }

        fn depth(&self) -> usize {
            self.stack.len()
        }

        fn navigate(&mut self, route: &str) {
            self.stack.push(route.to_string());
        }

        fn pop_back(&mut self) -> bool {
            if self.stack.len() <= 1 {
                return false;
            }
            self.stack.pop();
            true
        }
    }

    struct Harness {
        engine: FocusEngine,
        router: FakeRouter,
        data: FakeData,
        now: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let data = FakeData::default()
                .with("recently_added", 12)
                .with("trending", 20)
                .with("browse/movie", 30);
            let mut harness = Self {
                engine: FocusEngine::new(EngineConfig::default()),
                router: FakeRouter::new(),
                data,
                now: Instant::now(),
            };
            harness
                .engine
                .on_route_changed(&harness.router, &mut harness.data, harness.now);
            harness
        }

        /// A route change the engine did not ask for, e.g. a deep link.
        fn open(&mut self, route: &str) {
            self.router.navigate(route);
            self.engine
                .on_route_changed(&self.router, &mut self.data, self.now);
        }

        fn press_times(&mut self, key: Key, times: usize) {
            for _ in 0..times {
                self.press(key);
            }
        }

        fn press(&mut self, key: Key) -> KeyOutcome {
            self.now += std::time::Duration::from_secs(1);
            self.engine
                .handle_key(KeyEvent::down(key), &mut self.router, &mut self.data, self.now)
        }
    }

    #[test]
    fn test_main_screen_moves_between_rows() {
        let mut harness = Harness::new();
        assert_eq!(harness.engine.carousel_view("recently_added").and_then(|v| v.selected), Some(0));

        harness.press(Key::Right);
        harness.press(Key::Down);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::MainScreen(MediaCategory::Trending)
        );
        assert_eq!(harness.engine.carousel_view("trending").and_then(|v| v.selected), Some(0));
        assert_eq!(harness.engine.carousel_view("recently_added").and_then(|v| v.selected), None);

        harness.press(Key::Up);
        assert_eq!(harness.engine.carousel_view("recently_added").and_then(|v| v.selected), Some(1));
    }

    #[test]
    fn test_scrolling_produces_commands() {
        let mut harness = Harness::new();
        for _ in 0..4 {
            harness.press(Key::Right);
        }
        let outcome = harness.press(Key::Right);
        assert!(outcome.consumed);
        assert_eq!(outcome.commands.len(), 1);
        assert_eq!(outcome.commands[0].target, 1);
        assert!(matches!(outcome.commands[0].mode, ScrollMode::Animated(_)));

        let settled = ScrollSettled {
            key: "recently_added".to_string(),
            generation: outcome.commands[0].generation,
            offset: 1,
        };
        let correction = harness
            .engine
            .on_scroll_settled(&settled, &mut harness.data, harness.now);
        assert_eq!(correction, None);

        let stale = ScrollSettled {
            generation: 0,
            ..settled
        };
        assert_eq!(
            harness
                .engine
                .on_scroll_settled(&stale, &mut harness.data, harness.now),
            None
        );
    }

    #[test]
    fn test_enter_and_back_restore_selection() {
        let mut harness = Harness::new();
        harness.press(Key::Right);
        harness.press(Key::Right);

        harness.press(Key::Enter);
        assert_eq!(harness.router.current_route(), "details/recently_added-2/movie");
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Overview)
        );

        let outcome = harness.press(Key::Back);
        assert!(outcome.consumed);
        assert_eq!(harness.router.current_route(), "main");
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::MainScreen(MediaCategory::RecentlyAdded)
        );
        assert_eq!(harness.engine.carousel_view("recently_added").and_then(|v| v.selected), Some(2));
    }

    #[test]
    fn test_back_on_main_is_left_to_platform() {
        let mut harness = Harness::new();
        let outcome = harness.press(Key::Back);
        assert!(!outcome.consumed);
        assert_eq!(harness.router.stack.len(), 1);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut harness = Harness::new();
        let outcome = harness.engine.handle_key(
            KeyEvent::up(Key::Right),
            &mut harness.router,
            &mut harness.data,
            harness.now,
        );
        assert!(!outcome.consumed);
        assert_eq!(harness.engine.carousel_view("recently_added").and_then(|v| v.selected), Some(0));
    }

    #[test]
    fn test_top_bar_opens_browse() {
        let mut harness = Harness::new();
        harness.press(Key::Up);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::TopBar(TopBarTarget::Search)
        );
        assert_eq!(harness.engine.carousel_view("recently_added").and_then(|v| v.selected), None);

        harness.press(Key::Right);
        harness.press(Key::Enter);
        assert_eq!(harness.router.current_route(), "browse/movie");
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Browse(BrowseFocus::Grid { row: 0, column: 0 })
        );

        harness.press(Key::Up);
        harness.press(Key::Up);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::TopBar(TopBarTarget::Movies)
        );
        harness.press(Key::Down);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Browse(BrowseFocus::Filters)
        );
    }

    #[test]
    fn test_browse_grid_requests_next_page_on_last_row() {
        let mut harness = Harness::new();
        harness.data.set_has_more("browse/movie", true);
        harness.open("browse/movie");

        // 30 items in 6 columns: rows 0..=4
        for _ in 0..3 {
            harness.press(Key::Down);
        }
        assert!(harness.data.load_calls.is_empty());
        harness.press(Key::Down);
        assert_eq!(harness.data.load_calls, vec!["browse/movie".to_string()]);
        harness.press(Key::Right);
        assert_eq!(harness.data.load_calls.len(), 1);
    }

    #[test]
    fn test_registered_screen_replaces_builtin() {
        let mut harness = Harness::new();
        harness
            .engine
            .register_screen(ScreenConfig::new("main").on(Key::Down, |ctx| {
                ctx.set_focus(FocusState::MainScreen(MediaCategory::Networks));
            }));

        let outcome = harness.press(Key::Down);
        assert!(outcome.consumed);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::MainScreen(MediaCategory::Networks)
        );
        assert!(!harness.press(Key::Right).consumed);
    }

    #[test]
    fn test_reopening_a_stacked_details_page_keeps_both_entries() {
        let mut harness = Harness::new();
        harness.data.set("details/recently_added-0/movie/cast", 5);

        harness.press(Key::Enter);
        harness.press_times(Key::Down, 2);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Cast)
        );

        harness.press(Key::Enter);
        let second = "details/details_recently_added-0_movie_cast-0/movie";
        assert_eq!(harness.router.current_route(), second);
        harness.press_times(Key::Down, 3);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Crew)
        );

        harness.open("details/recently_added-0/movie");
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Overview)
        );

        harness.press(Key::Back);
        assert_eq!(harness.router.current_route(), second);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Crew)
        );

        harness.press(Key::Back);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Cast)
        );
        assert_eq!(
            harness
                .engine
                .carousel_view("details/recently_added-0/movie/cast")
                .and_then(|v| v.selected),
            Some(0)
        );
    }

    #[test]
    fn test_details_layout_moves_focus_off_missing_rows() {
        let mut harness = Harness::new();
        harness.press(Key::Enter);
        let route = harness.router.current_route();
        harness.press_times(Key::Down, 2);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Cast)
        );

        harness.engine.set_details_layout(
            &route,
            DetailsLayout {
                cast: false,
                ..DetailsLayout::default()
            },
        );
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Play)
        );

        harness.press_times(Key::Down, 3);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Crew)
        );

        // Other details pages keep the full layout
        harness.open("details/other/movie");
        harness.press_times(Key::Down, 2);
        assert_eq!(
            harness.engine.current_focus(),
            FocusState::Details(DetailsArea::Cast)
        );
    }
}
