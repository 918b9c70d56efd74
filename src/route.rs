use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::focus_state::{
    BrowseFocus, DetailsArea, DiscoveryFocus, FocusState, TopBarTarget,
};
use crate::model::{MediaCategory, MediaType};

/// Pseudo-route the top bar registers its handlers under.
pub const TOP_BAR_ROUTE: &str = "topbar";

pub const MAIN_PATTERN: &str = "main";
pub const DETAILS_PATTERN: &str = "details/{id}/{type}";
pub const DISCOVERY_PATTERN: &str = "discovery";
pub const BROWSE_PATTERN: &str = "browse/{type}";
pub const SETTINGS_PATTERN: &str = "settings";
pub const SEARCH_PATTERN: &str = "search";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route is empty.")]
    Empty,
    #[error("Route `{0}` is missing a segment.")]
    MissingSegment(String),
    #[error("Unknown media type `{media_type}` in route `{route}`.")]
    UnknownMediaType { route: String, media_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Main,
    Details { id: String, media_type: MediaType },
    Discovery,
    Browse(MediaType),
    Settings,
    Search,
    Other(String),
}

impl Route {
    pub fn parse(route: &str) -> Result<Self, RouteError> {
        let route = route.trim().trim_matches('/');
        if route.is_empty() {
            return Err(RouteError::Empty);
        }

        let parts: Vec<&str> = route.split('/').collect();
        let media_type = |segment: Option<&&str>| -> Result<MediaType, RouteError> {
            let segment = segment.ok_or_else(|| RouteError::MissingSegment(route.to_string()))?;
            MediaType::parse(segment).ok_or_else(|| RouteError::UnknownMediaType {
                route: route.to_string(),
                media_type: segment.to_string(),
            })
        };

        match parts[0] {
            "main" | "home" => Ok(Route::Main),
            "details" => {
                let id = parts
                    .get(1)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| RouteError::MissingSegment(route.to_string()))?;
                Ok(Route::Details {
                    id: id.to_string(),
                    media_type: media_type(parts.get(2))?,
                })
            }
            "discovery" => Ok(Route::Discovery),
            "browse" => Ok(Route::Browse(media_type(parts.get(1))?)),
            "settings" => Ok(Route::Settings),
            "search" => Ok(Route::Search),
            _ => Ok(Route::Other(route.to_string())),
        }
    }

    /// Like [`Route::parse`], but malformed routes degrade to
    /// [`Route::Other`] instead of failing.
    pub fn resolve(route: &str) -> Self {
        match Self::parse(route) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(%err, "Falling back to generic route");
                Route::Other(route.to_string())
            }
        }
    }

    /// Key the screen handlers for this route are registered under.
    pub fn pattern(&self) -> &str {
        match self {
            Route::Main => MAIN_PATTERN,
            Route::Details { .. } => DETAILS_PATTERN,
            Route::Discovery => DISCOVERY_PATTERN,
            Route::Browse(_) => BROWSE_PATTERN,
            Route::Settings => SETTINGS_PATTERN,
            Route::Search => SEARCH_PATTERN,
            Route::Other(route) => route,
        }
    }

    /// Focus seeded when the route is entered fresh.
    pub fn default_focus(&self) -> FocusState {
        match self {
            Route::Main => FocusState::MainScreen(MediaCategory::RecentlyAdded),
            Route::Details { .. } => FocusState::Details(DetailsArea::Overview),
            Route::Discovery | Route::Search => FocusState::Discovery(DiscoveryFocus::Search),
            Route::Browse(_) => FocusState::Browse(BrowseFocus::Grid { row: 0, column: 0 }),
            Route::Settings => FocusState::TopBar(TopBarTarget::Settings),
            Route::Other(_) => FocusState::TopBar(TopBarTarget::Search),
        }
    }

    /// Top-bar entry that corresponds to this route.
    pub fn top_bar_target(&self) -> TopBarTarget {
        match self {
            Route::Browse(MediaType::Movie) => TopBarTarget::Movies,
            Route::Browse(MediaType::Tv) => TopBarTarget::Series,
            Route::Settings => TopBarTarget::Settings,
            _ => TopBarTarget::Search,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Main => write!(f, "main"),
            Route::Details { id, media_type } => {
                write!(f, "details/{}/{}", id, media_type.as_str())
            }
            Route::Discovery => write!(f, "discovery"),
            Route::Browse(media_type) => write!(f, "browse/{}", media_type.as_str()),
            Route::Settings => write!(f, "settings"),
            Route::Search => write!(f, "search"),
            Route::Other(route) => write!(f, "{}", route),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_details_route() {
        let route = Route::parse("details/550/movie").unwrap();
        assert_eq!(
            route,
            Route::Details {
                id: "550".to_string(),
                media_type: MediaType::Movie
            }
        );
        assert_eq!(route.pattern(), DETAILS_PATTERN);
        assert_eq!(route.to_string(), "details/550/movie");
        assert_eq!(route.default_focus(), FocusState::Details(DetailsArea::Overview));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Route::parse("  "), Err(RouteError::Empty));
        assert_eq!(
            Route::parse("details"),
            Err(RouteError::MissingSegment("details".to_string()))
        );
        assert!(matches!(
            Route::parse("browse/person"),
            Err(RouteError::UnknownMediaType { .. })
        ));
    }

    #[test]
    fn test_resolve_falls_back_to_other() {
        assert_eq!(
            Route::resolve("details/12"),
            Route::Other("details/12".to_string())
        );
        assert_eq!(Route::resolve("/main/"), Route::Main);
        assert_eq!(Route::resolve("about"), Route::Other("about".to_string()));
    }

    #[test]
    fn test_default_focus_per_route() {
        assert_eq!(
            Route::Main.default_focus(),
            FocusState::MainScreen(MediaCategory::RecentlyAdded)
        );
        assert_eq!(
            Route::Browse(MediaType::Tv).default_focus(),
            FocusState::Browse(BrowseFocus::Grid { row: 0, column: 0 })
        );
        assert_eq!(
            Route::Settings.default_focus(),
            FocusState::TopBar(TopBarTarget::Settings)
        );
        assert_eq!(Route::Browse(MediaType::Tv).top_bar_target(), TopBarTarget::Series);
    }
}
