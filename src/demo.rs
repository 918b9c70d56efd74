//! In-memory stand-ins for the host: a paged catalog, a back-stack router
//! and a scroll surface that only logs. Used by the headless binary.

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::data_source::CarouselDataSource;
use crate::model::{CardKind, MediaCategory, MediaType};
use crate::navigation::Router;
use crate::scroll_driver::{ScrollError, ScrollSurface};
use crate::screens::DISCOVERY_RESULTS_KEY;

#[derive(Debug, Clone)]
struct DemoList {
    loaded: usize,
    total: usize,
    page_size: usize,
    loading: bool,
    media_type: MediaType,
}

impl DemoList {
    fn new(total: usize, page_size: usize, media_type: MediaType) -> Self {
        Self {
            loaded: page_size.min(total),
            total,
            page_size,
            loading: false,
            media_type,
        }
    }
}

/// Catalog whose lists arrive a page at a time. `load_more` only marks a
/// list as loading; the caller completes it with [`DemoCatalog::finish_load`].
#[derive(Debug, Default)]
pub struct DemoCatalog {
    lists: HashMap<String, DemoList>,
    pending: Vec<String>,
}

impl DemoCatalog {
    pub fn new() -> Self {
        let mut lists = HashMap::new();
        for category in MediaCategory::ALL {
            let media_type = match category {
                MediaCategory::PopularSeries
                | MediaCategory::SeriesGenres
                | MediaCategory::UpcomingSeries
                | MediaCategory::Networks => MediaType::Tv,
                _ => MediaType::Movie,
            };
            let list = match category.card_kind() {
                CardKind::Media => DemoList::new(60, 20, media_type),
                CardKind::Category => DemoList::new(16, 16, media_type),
            };
            lists.insert(category.key().to_string(), list);
        }
        lists.insert(
            DISCOVERY_RESULTS_KEY.to_string(),
            DemoList::new(40, 20, MediaType::Movie),
        );
        lists.insert(
            "browse/movie".to_string(),
            DemoList::new(120, 30, MediaType::Movie),
        );
        lists.insert("browse/tv".to_string(), DemoList::new(90, 30, MediaType::Tv));
        Self {
            lists,
            pending: Vec::new(),
        }
    }

    /// Keys whose next page was requested since the last call.
    pub fn take_pending(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }

    /// Delivers the next page of `key`. Returns `false` if nothing was loading.
    pub fn finish_load(&mut self, key: &str) -> bool {
        let Some(list) = self.lists.get_mut(key) else {
            return false;
        };
        if !list.loading {
            return false;
        }
        list.loaded = (list.loaded + list.page_size).min(list.total);
        list.loading = false;
        debug!(key, loaded = list.loaded, total = list.total, "Page delivered");
        true
    }

    /// Rows on a details page are generated from the key suffix.
    fn details_list(key: &str) -> Option<DemoList> {
        let (route, suffix) = key.rsplit_once('/')?;
        if !route.starts_with("details/") {
            return None;
        }
        let media_type = if route.ends_with("/tv") {
            MediaType::Tv
        } else {
            MediaType::Movie
        };
        let total = match suffix {
            "tags" => 6,
            "cast" => 18,
            "crew" => 9,
            "similar" => 20,
            _ => return None,
        };
        Some(DemoList::new(total, total, media_type))
    }

    fn list(&self, key: &str) -> Option<DemoList> {
        self.lists
            .get(key)
            .cloned()
            .or_else(|| Self::details_list(key))
    }
}

impl CarouselDataSource for DemoCatalog {
    fn item_count(&self, key: &str) -> usize {
        self.list(key).map(|l| l.loaded).unwrap_or(0)
    }

    fn is_loading(&self, key: &str) -> bool {
        self.lists.get(key).is_some_and(|l| l.loading)
    }

    fn has_more_pages(&self, key: &str) -> bool {
        self.list(key).is_some_and(|l| l.loaded < l.total)
    }

    fn load_more(&mut self, key: &str) {
        if let Some(list) = self.lists.get_mut(key) {
            if !list.loading && list.loaded < list.total {
                list.loading = true;
                self.pending.push(key.to_string());
            }
        }
    }

    fn item_route(&self, key: &str, index: usize) -> Option<String> {
        let list = self.list(key)?;
        if index >= list.loaded {
            return None;
        }
        let is_category_row = MediaCategory::ALL
            .iter()
            .any(|c| c.key() == key && c.card_kind() == CardKind::Category);
        if is_category_row || key.ends_with("/tags") {
            return Some(format!("browse/{}", list.media_type.as_str()));
        }
        Some(format!(
            "details/{}/{}",
            1000 + index,
            list.media_type.as_str()
        ))
    }
}

/// Router backed by a plain stack of route strings.
#[derive(Debug)]
pub struct DemoRouter {
    stack: Vec<String>,
}

impl DemoRouter {
    pub fn new(root: &str) -> Self {
        Self {
            stack: vec![root.to_string()],
        }
    }
}

impl Router for DemoRouter {
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

/// Remembers offsets and traces every frame.
#[derive(Debug, Default)]
pub struct LogSurface {
    offsets: HashMap<String, f32>,
}

impl ScrollSurface for LogSurface {
    fn offset(&self, key: &str) -> f32 {
        self.offsets.get(key).copied().unwrap_or(0.0)
    }

    fn set_offset(&mut self, key: &str, offset: f32) -> Result<(), ScrollError> {
        if !offset.is_finite() || offset < 0.0 {
            return Err(ScrollError::Rejected {
                key: key.to_string(),
                offset,
            });
        }
        trace!(key, offset, "Scroll frame");
        self.offsets.insert(key.to_string(), offset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_pages_in() {
        let mut catalog = DemoCatalog::new();
        assert_eq!(catalog.item_count("trending"), 20);
        assert!(catalog.has_more_pages("trending"));

        catalog.load_more("trending");
        catalog.load_more("trending");
        assert!(catalog.is_loading("trending"));
        assert_eq!(catalog.take_pending(), vec!["trending".to_string()]);
        assert!(catalog.take_pending().is_empty());

        assert!(catalog.finish_load("trending"));
        assert!(!catalog.finish_load("trending"));
        assert_eq!(catalog.item_count("trending"), 40);
        assert!(!catalog.is_loading("trending"));
    }

    #[test]
    fn test_item_routes() {
        let catalog = DemoCatalog::new();
        assert_eq!(
            catalog.item_route("popular_series", 3),
            Some("details/1003/tv".to_string())
        );
        assert_eq!(
            catalog.item_route("studios", 0),
            Some("browse/movie".to_string())
        );
        assert_eq!(catalog.item_route("trending", 25), None);
        assert_eq!(catalog.item_count("details/1003/tv/cast"), 18);
        assert_eq!(
            catalog.item_route("details/1003/tv/similar", 1),
            Some("details/1001/tv".to_string())
        );
    }

    #[test]
    fn test_router_stays_at_root() {
        let mut router = DemoRouter::new("main");
        assert!(!router.pop_back());
        router.navigate("details/1/movie");
        assert_eq!(router.depth(), 2);
        assert!(router.pop_back());
        assert_eq!(router.current_route(), "main");
    }

    #[test]
    fn test_surface_rejects_negative_offsets() {
        let mut surface = LogSurface::default();
        assert!(surface.set_offset("trending", -1.0).is_err());
        assert!(surface.set_offset("trending", 2.5).is_ok());
        assert_eq!(surface.offset("trending"), 2.5);
    }
}
