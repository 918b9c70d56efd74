//! Built-in spatial navigation for each screen.
//!
//! Handlers only move focus and carousel selections; the engine keeps the
//! focused carousel in sync with [`FocusState`] after every dispatch.

use tracing::debug;

use crate::carousel::Step;
use crate::context::ScreenContext;
use crate::dpad::ScreenConfig;
use crate::focus_state::{BrowseFocus, DetailsArea, DiscoveryFocus, FocusState};
use crate::input::Key;
use crate::messages::Activation;
use crate::model::CardKind;
use crate::route::{
    Route, BROWSE_PATTERN, DETAILS_PATTERN, DISCOVERY_PATTERN, MAIN_PATTERN, SEARCH_PATTERN,
    TOP_BAR_ROUTE,
};
use crate::storage::EngineConfig;

/// Carousel key holding discovery results.
pub const DISCOVERY_RESULTS_KEY: &str = "discovery";

/// Carousel that should hold focus for `focus` on `route`, if any.
pub fn carousel_for(focus: FocusState, route: &Route) -> Option<(String, CardKind)> {
    match focus {
        FocusState::MainScreen(category) => {
            Some((category.key().to_string(), category.card_kind()))
        }
        FocusState::Details(area) => {
            let suffix = area.carousel_suffix()?;
            let kind = if area == DetailsArea::Tags {
                CardKind::Category
            } else {
                CardKind::Media
            };
            Some((details_carousel_key(route, suffix), kind))
        }
        FocusState::TopBar(_) | FocusState::Discovery(_) | FocusState::Browse(_) => None,
    }
}

pub fn details_carousel_key(route: &Route, suffix: &str) -> String {
    format!("{}/{}", route, suffix)
}

/// List key behind the browse grid of `route`.
pub fn browse_key(route: &Route) -> String {
    route.to_string()
}

/// Moves inside a grid of `len` items laid out in `cols` columns.
/// Returns `None` when the move leaves the grid upwards; other edges clamp.
pub fn grid_move(
    row: usize,
    column: usize,
    key: Key,
    cols: usize,
    len: usize,
) -> Option<(usize, usize)> {
    let cols = cols.max(1);
    let index = row * cols + column;
    match key {
        Key::Up if row == 0 => None,
        Key::Up => Some((row - 1, column)),
        Key::Down if (row + 1) * cols < len => {
            let last_in_next_row = (len - 1).min((row + 2) * cols - 1);
            Some((row + 1, column.min(last_in_next_row - (row + 1) * cols)))
        }
        Key::Left if column > 0 => Some((row, column - 1)),
        Key::Right if column + 1 < cols && index + 1 < len => Some((row, column + 1)),
        _ => Some((row, column)),
    }
}

/// Clamps a grid cell to the items that exist. `None` when the grid is empty.
pub fn clamp_grid(row: usize, column: usize, cols: usize, len: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let cols = cols.max(1);
    let index = (row * cols + column.min(cols - 1)).min(len - 1);
    Some((index / cols, index % cols))
}

pub fn top_bar_screen() -> ScreenConfig {
    fn leave(ctx: &mut ScreenContext<'_>) -> bool {
        let target = ctx
            .focus
            .last_screen_focus()
            .unwrap_or_else(|| ctx.route.default_focus());
        if target.is_top_bar() {
            return false;
        }
        ctx.set_focus(target);
        true
    }

    ScreenConfig::new(TOP_BAR_ROUTE)
        .on(Key::Left, |ctx| {
            if let FocusState::TopBar(target) = ctx.current_focus() {
                ctx.set_focus(FocusState::TopBar(target.left()));
            }
        })
        .on(Key::Right, |ctx| {
            if let FocusState::TopBar(target) = ctx.current_focus() {
                ctx.set_focus(FocusState::TopBar(target.right()));
            }
        })
        .on(Key::Down, |ctx| {
            leave(ctx);
        })
        .on(Key::Enter, |ctx| {
            if let FocusState::TopBar(target) = ctx.current_focus() {
                if ctx.route.to_string() == target.route() {
                    leave(ctx);
                } else {
                    ctx.navigate(target.route());
                }
            }
        })
        .on(Key::Back, |ctx| {
            if !leave(ctx) {
                ctx.back();
            }
        })
}

pub fn main_screen() -> ScreenConfig {
    fn step(ctx: &mut ScreenContext<'_>, step: Step) {
        if let FocusState::MainScreen(category) = ctx.current_focus() {
            ctx.step_carousel(category.key(), step);
        }
    }

    ScreenConfig::new(MAIN_PATTERN)
        .on(Key::Up, |ctx| {
            if let FocusState::MainScreen(category) = ctx.current_focus() {
                let next = match category.above() {
                    Some(above) => FocusState::MainScreen(above),
                    None => FocusState::TopBar(ctx.route.top_bar_target()),
                };
                ctx.set_focus(next);
            }
        })
        .on(Key::Down, |ctx| {
            if let FocusState::MainScreen(category) = ctx.current_focus() {
                if let Some(below) = category.below() {
                    ctx.set_focus(FocusState::MainScreen(below));
                }
            }
        })
        .on(Key::Left, |ctx| step(ctx, Step::Left))
        .on(Key::Right, |ctx| step(ctx, Step::Right))
        .on(Key::Enter, |ctx| {
            if let FocusState::MainScreen(category) = ctx.current_focus() {
                let route = ctx
                    .selected_index(category.key())
                    .and_then(|index| ctx.item_route(category.key(), index));
                match route {
                    Some(route) => ctx.navigate(route),
                    None => debug!(category = category.key(), "Nothing to open"),
                }
            }
        })
        .on(Key::Refresh, |ctx| {
            let route = ctx.route.to_string();
            ctx.activate(Activation::Refresh(route));
        })
}

/// Which parts of the details page exist for the media on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsLayout {
    pub actions: Vec<DetailsArea>,
    pub read_more: bool,
    pub tags: bool,
    pub cast: bool,
    pub crew: bool,
    pub similar: bool,
}

impl Default for DetailsLayout {
    fn default() -> Self {
        Self {
            actions: vec![
                DetailsArea::Play,
                DetailsArea::RequestSingle,
                DetailsArea::Trailer,
                DetailsArea::Issue,
            ],
            read_more: true,
            tags: true,
            cast: true,
            crew: true,
            similar: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailsRow {
    Actions,
    Overview,
    Tags,
    Cast,
    Crew,
    Similar,
}

impl DetailsLayout {
    fn rows(&self) -> Vec<DetailsRow> {
        let mut rows = Vec::with_capacity(6);
        if !self.actions.is_empty() {
            rows.push(DetailsRow::Actions);
        }
        rows.push(DetailsRow::Overview);
        if self.tags {
            rows.push(DetailsRow::Tags);
        }
        if self.cast {
            rows.push(DetailsRow::Cast);
        }
        if self.crew {
            rows.push(DetailsRow::Crew);
        }
        if self.similar {
            rows.push(DetailsRow::Similar);
        }
        rows
    }

    fn row_of(&self, area: DetailsArea) -> Option<DetailsRow> {
        match area {
            DetailsArea::Overview | DetailsArea::ReadMore => Some(DetailsRow::Overview),
            DetailsArea::Tags => Some(DetailsRow::Tags),
            DetailsArea::Cast => Some(DetailsRow::Cast),
            DetailsArea::Crew => Some(DetailsRow::Crew),
            DetailsArea::SimilarMedia => Some(DetailsRow::Similar),
            DetailsArea::None => None,
            action => self
                .actions
                .contains(&action)
                .then_some(DetailsRow::Actions),
        }
    }

    fn entry(&self, row: DetailsRow) -> DetailsArea {
        match row {
            DetailsRow::Actions => self.actions.first().copied().unwrap_or(DetailsArea::Overview),
            DetailsRow::Overview => DetailsArea::Overview,
            DetailsRow::Tags => DetailsArea::Tags,
            DetailsRow::Cast => DetailsArea::Cast,
            DetailsRow::Crew => DetailsArea::Crew,
            DetailsRow::Similar => DetailsArea::SimilarMedia,
        }
    }

    pub fn first_area(&self) -> DetailsArea {
        self.rows()
            .first()
            .map(|row| self.entry(*row))
            .unwrap_or(DetailsArea::Overview)
    }

    /// Whether `area` can hold focus with this layout.
    pub fn contains(&self, area: DetailsArea) -> bool {
        match area {
            DetailsArea::ReadMore => self.read_more,
            DetailsArea::None => true,
            other => self.row_of(other).is_some_and(|row| self.rows().contains(&row)),
        }
    }

    /// Area reached from `area` by `key`; `None` when the key leads nowhere.
    pub fn next_area(&self, area: DetailsArea, key: Key) -> Option<DetailsArea> {
        let Some(row) = self.row_of(area) else {
            return key.is_directional().then(|| self.first_area());
        };
        let rows = self.rows();
        let position = rows.iter().position(|r| *r == row)?;

        match key {
            Key::Up => position
                .checked_sub(1)
                .and_then(|i| rows.get(i))
                .map(|r| self.entry(*r)),
            Key::Down => rows.get(position + 1).map(|r| self.entry(*r)),
            Key::Left | Key::Right => match row {
                DetailsRow::Actions => {
                    let i = self.actions.iter().position(|a| *a == area)?;
                    let j = if key == Key::Left {
                        i.checked_sub(1)?
                    } else {
                        i + 1
                    };
                    self.actions.get(j).copied()
                }
                DetailsRow::Overview => match (area, key) {
                    (DetailsArea::Overview, Key::Right) if self.read_more => {
                        Some(DetailsArea::ReadMore)
                    }
                    (DetailsArea::ReadMore, Key::Left) => Some(DetailsArea::Overview),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        }
    }
}

pub fn details_screen(layout: DetailsLayout) -> ScreenConfig {
    fn vertical(ctx: &mut ScreenContext<'_>, layout: &DetailsLayout, key: Key) {
        if let FocusState::Details(area) = ctx.current_focus() {
            if let Some(next) = layout.next_area(area, key) {
                ctx.set_focus(FocusState::Details(next));
            }
        }
    }

    fn horizontal(ctx: &mut ScreenContext<'_>, layout: &DetailsLayout, key: Key) {
        let FocusState::Details(area) = ctx.current_focus() else {
            return;
        };
        if let Some(suffix) = area.carousel_suffix() {
            let carousel = details_carousel_key(ctx.route, suffix);
            let step = if key == Key::Left { Step::Left } else { Step::Right };
            ctx.step_carousel(&carousel, step);
        } else if let Some(next) = layout.next_area(area, key) {
            ctx.set_focus(FocusState::Details(next));
        }
    }

    let up = layout.clone();
    let down = layout.clone();
    let left = layout.clone();
    let right = layout;

    ScreenConfig::new(DETAILS_PATTERN)
        .on(Key::Up, move |ctx| vertical(ctx, &up, Key::Up))
        .on(Key::Down, move |ctx| vertical(ctx, &down, Key::Down))
        .on(Key::Left, move |ctx| horizontal(ctx, &left, Key::Left))
        .on(Key::Right, move |ctx| horizontal(ctx, &right, Key::Right))
        .on(Key::Enter, |ctx| {
            let FocusState::Details(area) = ctx.current_focus() else {
                return;
            };
            if area.is_action() {
                ctx.activate(Activation::DetailsAction(area));
            } else if area == DetailsArea::ReadMore {
                ctx.activate(Activation::ReadMore);
            } else if let Some(suffix) = area.carousel_suffix() {
                let carousel = details_carousel_key(ctx.route, suffix);
                let route = ctx
                    .selected_index(&carousel)
                    .and_then(|index| ctx.item_route(&carousel, index));
                if let Some(route) = route {
                    ctx.navigate(route);
                }
            }
        })
        .on(Key::Back, |ctx| ctx.back())
}

/// Requests the next page once the focused row is the last one.
fn load_more_near_end(ctx: &mut ScreenContext<'_>, key: &str, row: usize, cols: usize) {
    let count = ctx.item_count(key);
    if count == 0 {
        return;
    }
    let last_row = (count - 1) / cols.max(1);
    if row >= last_row && ctx.has_more_pages(key) && !ctx.is_loading(key) {
        debug!(key, row, "Grid reached last row, requesting next page");
        ctx.load_more(key);
    }
}

pub fn discovery_screen(columns: usize) -> ScreenConfig {
    fn arrow(ctx: &mut ScreenContext<'_>, key: Key, cols: usize) {
        let count = ctx.item_count(DISCOVERY_RESULTS_KEY);
        match ctx.current_focus() {
            FocusState::Discovery(DiscoveryFocus::Search) => match key {
                Key::Up => {
                    let target = ctx.route.top_bar_target();
                    ctx.set_focus(FocusState::TopBar(target));
                }
                Key::Down if count > 0 => {
                    ctx.set_focus(FocusState::Discovery(DiscoveryFocus::Grid { row: 0, column: 0 }))
                }
                _ => {}
            },
            FocusState::Discovery(DiscoveryFocus::Grid { row, column }) => {
                let next = match grid_move(row, column, key, cols, count) {
                    Some((row, column)) => {
                        load_more_near_end(ctx, DISCOVERY_RESULTS_KEY, row, cols);
                        DiscoveryFocus::Grid { row, column }
                    }
                    None => DiscoveryFocus::Search,
                };
                ctx.set_focus(FocusState::Discovery(next));
            }
            _ => {}
        }
    }

    let mut config = ScreenConfig::new(DISCOVERY_PATTERN);
    for key in [Key::Up, Key::Down, Key::Left, Key::Right] {
        config = config.on(key, move |ctx| arrow(ctx, key, columns));
    }
    config
        .on(Key::Enter, move |ctx| match ctx.current_focus() {
            FocusState::Discovery(DiscoveryFocus::Search) => {
                ctx.activate(Activation::SearchField);
            }
            FocusState::Discovery(DiscoveryFocus::Grid { row, column }) => {
                if let Some(route) =
                    ctx.item_route(DISCOVERY_RESULTS_KEY, row * columns.max(1) + column)
                {
                    ctx.navigate(route);
                }
            }
            _ => {}
        })
        .on(Key::Back, |ctx| ctx.back())
}

/// Same handlers as discovery, registered under the `search` route.
pub fn search_screen(columns: usize) -> ScreenConfig {
    let mut config = discovery_screen(columns);
    config.route = SEARCH_PATTERN.to_string();
    config
}

pub fn browse_screen(columns: usize) -> ScreenConfig {
    fn arrow(ctx: &mut ScreenContext<'_>, key: Key, cols: usize) {
        let list = browse_key(ctx.route);
        let count = ctx.item_count(&list);
        match ctx.current_focus() {
            FocusState::Browse(BrowseFocus::Filters) => match key {
                Key::Up => {
                    let target = ctx.route.top_bar_target();
                    ctx.set_focus(FocusState::TopBar(target));
                }
                Key::Down if count > 0 => {
                    ctx.set_focus(FocusState::Browse(BrowseFocus::Grid { row: 0, column: 0 }))
                }
                _ => {}
            },
            FocusState::Browse(BrowseFocus::Grid { row, column }) => {
                let next = match grid_move(row, column, key, cols, count) {
                    Some((row, column)) => {
                        load_more_near_end(ctx, &list, row, cols);
                        BrowseFocus::Grid { row, column }
                    }
                    None => BrowseFocus::Filters,
                };
                ctx.set_focus(FocusState::Browse(next));
            }
            _ => {}
        }
    }

    let mut config = ScreenConfig::new(BROWSE_PATTERN);
    for key in [Key::Up, Key::Down, Key::Left, Key::Right] {
        config = config.on(key, move |ctx| arrow(ctx, key, columns));
    }
    config
        .on(Key::Enter, move |ctx| match ctx.current_focus() {
            FocusState::Browse(BrowseFocus::Filters) => {
                if let Route::Browse(media_type) = ctx.route {
                    let media_type = *media_type;
                    ctx.activate(Activation::Filters(media_type));
                }
            }
            FocusState::Browse(BrowseFocus::Grid { row, column }) => {
                let list = browse_key(ctx.route);
                if let Some(route) = ctx.item_route(&list, row * columns.max(1) + column) {
                    ctx.navigate(route);
                }
            }
            _ => {}
        })
        .on(Key::Back, |ctx| ctx.back())
}

/// Handlers installed by a freshly built engine.
pub fn default_screens(config: &EngineConfig) -> Vec<ScreenConfig> {
    vec![
        top_bar_screen(),
        main_screen(),
        details_screen(DetailsLayout::default()),
        discovery_screen(config.discovery_columns),
        search_screen(config.discovery_columns),
        browse_screen(config.browse_columns),
    ]
}
