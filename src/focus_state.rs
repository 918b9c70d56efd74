use crate::model::MediaCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopBarTarget {
    Search,
    Movies,
    Series,
    Settings,
}

impl TopBarTarget {
    pub fn right(self) -> Self {
        match self {
            TopBarTarget::Search => TopBarTarget::Movies,
            TopBarTarget::Movies => TopBarTarget::Series,
            TopBarTarget::Series | TopBarTarget::Settings => TopBarTarget::Settings,
        }
    }

    pub fn left(self) -> Self {
        match self {
            TopBarTarget::Search | TopBarTarget::Movies => TopBarTarget::Search,
            TopBarTarget::Series => TopBarTarget::Movies,
            TopBarTarget::Settings => TopBarTarget::Series,
        }
    }

    /// Route opened when the target is activated.
    pub fn route(self) -> &'static str {
        match self {
            TopBarTarget::Search => "discovery",
            TopBarTarget::Movies => "browse/movie",
            TopBarTarget::Series => "browse/tv",
            TopBarTarget::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailsArea {
    Overview,
    ReadMore,
    Tags,
    Cast,
    Crew,
    Play,
    RequestHD,
    Request4K,
    RequestSingle,
    ManageHD,
    Manage4K,
    ManageSingle,
    Trailer,
    SimilarMedia,
    Issue,
    None,
}

impl DetailsArea {
    /// Areas that are buttons in the action row.
    pub fn is_action(self) -> bool {
        matches!(
            self,
            DetailsArea::Play
                | DetailsArea::RequestHD
                | DetailsArea::Request4K
                | DetailsArea::RequestSingle
                | DetailsArea::ManageHD
                | DetailsArea::Manage4K
                | DetailsArea::ManageSingle
                | DetailsArea::Trailer
                | DetailsArea::Issue
        )
    }

    /// Carousel suffix for areas that are horizontally scrolling rows.
    pub fn carousel_suffix(self) -> Option<&'static str> {
        match self {
            DetailsArea::Tags => Some("tags"),
            DetailsArea::Cast => Some("cast"),
            DetailsArea::Crew => Some("crew"),
            DetailsArea::SimilarMedia => Some("similar"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryFocus {
    Search,
    Grid { row: usize, column: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowseFocus {
    Filters,
    Grid { row: usize, column: usize },
}

/// Where the remote-control highlight currently rests.
///
/// Exactly one value exists at a time; it is owned by
/// [`AppFocusManager`](crate::focus_manager::AppFocusManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusState {
    TopBar(TopBarTarget),
    MainScreen(MediaCategory),
    Details(DetailsArea),
    Discovery(DiscoveryFocus),
    Browse(BrowseFocus),
}

/// Logical screen a focus value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusScope {
    TopBar,
    Main,
    Details,
    Discovery,
    Browse,
}

impl FocusState {
    pub fn scope(&self) -> FocusScope {
        match self {
            FocusState::TopBar(_) => FocusScope::TopBar,
            FocusState::MainScreen(_) => FocusScope::Main,
            FocusState::Details(_) => FocusScope::Details,
            FocusState::Discovery(_) => FocusScope::Discovery,
            FocusState::Browse(_) => FocusScope::Browse,
        }
    }

    pub fn is_top_bar(&self) -> bool {
        matches!(self, FocusState::TopBar(_))
    }
}

impl Default for FocusState {
    fn default() -> Self {
        FocusState::MainScreen(MediaCategory::RecentlyAdded)
    }
}
