use std::collections::HashMap;
use tracing::{info, warn};

use crate::context::ScreenContext;
use crate::focus_state::{BrowseFocus, DiscoveryFocus, FocusState};
use crate::route::Route;
use crate::screens::{browse_key, clamp_grid, DetailsLayout, DISCOVERY_RESULTS_KEY};

/// The host's navigation stack. The engine asks it to move and then reports
/// the route it landed on through [`NavigationCoordinator::enter`].
pub trait Router {
    fn current_route(&self) -> String;

    /// Entries on the stack, the current route included.
    fn depth(&self) -> usize;

    fn navigate(&mut self, route: &str);

    /// Returns `false` when already at the root.
    fn pop_back(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteChange {
    Unchanged,
    /// A new stack entry was entered and seeded with its default focus.
    Push,
    /// The stack shrank back to a saved entry whose focus was restored.
    /// Carries how many entries were dropped on the way.
    Pop { forgotten: usize },
    /// The top entry was swapped for another route at the same depth.
    Replace,
}

#[derive(Debug, Clone)]
struct RouteSnapshot {
    route: Route,
    focus: FocusState,
}

/// Keeps focus in step with the route stack: saves the screen focus of a
/// route being left and restores it when the stack shrinks back to it.
///
/// Entries are matched by stack depth, so the same route may sit on the
/// stack several times with its own saved focus each.
#[derive(Debug, Default)]
pub struct NavigationCoordinator {
    active: Option<Route>,
    stack: Vec<RouteSnapshot>,
    details_layouts: HashMap<Route, DetailsLayout>,
}

impl NavigationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes waiting underneath the active one.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn set_details_layout(&mut self, route: Route, layout: DetailsLayout) {
        self.details_layouts.insert(route, layout);
    }

    pub fn details_layout(&self, route: &Route) -> Option<&DetailsLayout> {
        self.details_layouts.get(route)
    }

    /// Reconciles focus with `ctx.route`, which the router has just made
    /// active at `depth` entries.
    pub fn enter(&mut self, ctx: &mut ScreenContext<'_>, depth: usize) -> RouteChange {
        let route = ctx.route.clone();
        let depth = depth.max(1);
        let known = self.stack.len() + usize::from(self.active.is_some());

        let (change, forgotten) = if self.active.is_none() || depth > known {
            if let Some(previous) = self.active.take() {
                let focus = screen_focus(ctx, &previous);
                self.stack.push(RouteSnapshot {
                    route: previous,
                    focus,
                });
            }
            info!(route = %route, depth = self.stack.len(), "Entering route");
            seed_focus(ctx, &route);
            (RouteChange::Push, Vec::new())
        } else if depth < known {
            let mut removed = self.stack.split_off(depth - 1);
            let snapshot = removed.remove(0);
            let mut forgotten: Vec<Route> = removed.into_iter().map(|s| s.route).collect();
            forgotten.extend(self.active.take());

            if snapshot.route == route {
                let focus = self.clamp_focus(ctx, snapshot.focus);
                info!(route = %route, focus = ?focus, forgotten = forgotten.len(), "Restoring route");
                ctx.focus.reset_screen_focus();
                ctx.set_focus(focus);
            } else {
                warn!(
                    saved = %snapshot.route,
                    route = %route,
                    "Router landed on a different route than the one saved at this depth"
                );
                forgotten.push(snapshot.route);
                seed_focus(ctx, &route);
            }
            let count = forgotten.len();
            (RouteChange::Pop { forgotten: count }, forgotten)
        } else if self.active.as_ref() == Some(&route) {
            return RouteChange::Unchanged;
        } else {
            info!(route = %route, depth, "Replacing route");
            let replaced = self.active.take();
            seed_focus(ctx, &route);
            (RouteChange::Replace, replaced.into_iter().collect())
        };

        self.active = Some(route);
        for old in &forgotten {
            self.forget_route(ctx, old);
        }
        ctx.sync_carousel_focus();
        change
    }

    fn is_live(&self, route: &Route) -> bool {
        self.active.as_ref() == Some(route) || self.stack.iter().any(|s| &s.route == route)
    }

    /// Drops carousel controllers and layout of a route no stack entry
    /// refers to any more. Remembered positions stay for the next visit.
    fn forget_route(&mut self, ctx: &mut ScreenContext<'_>, route: &Route) {
        if self.is_live(route) {
            return;
        }
        let dropped = ctx.carousels.drop_scope(&route.to_string());
        self.details_layouts.remove(route);
        if dropped > 0 {
            info!(route = %route, dropped, "Dropped carousels of a closed route");
        }
    }

    /// Pulls a restored focus back inside what the route still shows.
    fn clamp_focus(&self, ctx: &ScreenContext<'_>, focus: FocusState) -> FocusState {
        let clamped = match focus {
            FocusState::Discovery(DiscoveryFocus::Grid { row, column }) => {
                let count = ctx.item_count(DISCOVERY_RESULTS_KEY);
                match clamp_grid(row, column, ctx.config.discovery_columns, count) {
                    Some((row, column)) => {
                        FocusState::Discovery(DiscoveryFocus::Grid { row, column })
                    }
                    None => FocusState::Discovery(DiscoveryFocus::Search),
                }
            }
            FocusState::Browse(BrowseFocus::Grid { row, column }) => {
                let count = ctx.item_count(&browse_key(ctx.route));
                match clamp_grid(row, column, ctx.config.browse_columns, count) {
                    Some((row, column)) => FocusState::Browse(BrowseFocus::Grid { row, column }),
                    None => FocusState::Browse(BrowseFocus::Filters),
                }
            }
            FocusState::Details(area) => match self.details_layout(ctx.route) {
                Some(layout) if !layout.contains(area) => FocusState::Details(layout.first_area()),
                _ => focus,
            },
            other => other,
        };
        if clamped != focus {
            warn!(saved = ?focus, restored = ?clamped, "Saved focus no longer fits the screen");
        }
        clamped
    }
}

fn seed_focus(ctx: &mut ScreenContext<'_>, route: &Route) {
    ctx.focus.reset_screen_focus();
    ctx.set_focus(route.default_focus());
}

/// Focus worth restoring for a route being left. The top bar is never
/// restored; the screen focus it covered is.
fn screen_focus(ctx: &ScreenContext<'_>, route: &Route) -> FocusState {
    let current = ctx.current_focus();
    if !current.is_top_bar() {
        return current;
    }
    ctx.focus
        .last_screen_focus()
        .unwrap_or_else(|| route.default_focus())
}
