//! Remembered carousel positions, keyed by carousel identity.
//!
//! Lives for the whole process and is handed to whoever needs it; nothing
//! here is global. Records are created lazily on first write.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarouselRecord {
    /// First visible item once the last scroll settled.
    pub scroll_offset: usize,
    /// Last index the user settled on, `None` if the carousel was never focused.
    pub last_user_index: Option<usize>,
    pub navigating_right: bool,
}

#[derive(Debug, Default)]
pub struct ScrollPositionManager {
    records: HashMap<String, CarouselRecord>,
}

impl ScrollPositionManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_mut(&mut self, key: &str) -> &mut CarouselRecord {
        self.records.entry(key.to_string()).or_default()
    }

    pub fn save_scroll_position(&mut self, key: &str, offset: usize) {
        self.record_mut(key).scroll_offset = offset;
    }

    pub fn scroll_position(&self, key: &str) -> usize {
        self.records
            .get(key)
            .map(|r| r.scroll_offset)
            .unwrap_or(0)
    }

    pub fn save_user_index(&mut self, key: &str, index: usize) {
        self.record_mut(key).last_user_index = Some(index);
    }

    pub fn user_index(&self, key: &str) -> Option<usize> {
        self.records.get(key).and_then(|r| r.last_user_index)
    }

    /// Compares `requested` against the last saved index, stores the
    /// resulting direction and returns it. With no prior index the move
    /// counts as rightward.
    pub fn record_navigation(&mut self, key: &str, requested: usize) -> bool {
        let record = self.record_mut(key);
        let right = match record.last_user_index {
            Some(previous) => requested > previous,
            None => true,
        };
        record.navigating_right = right;
        right
    }

    pub fn is_navigating_right(&self, key: &str) -> bool {
        self.records
            .get(key)
            .map(|r| r.navigating_right)
            .unwrap_or(true)
    }

    pub fn record(&self, key: &str) -> Option<&CarouselRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_unknown_key() {
        let store = ScrollPositionManager::new();
        assert_eq!(store.scroll_position("trending"), 0);
        assert_eq!(store.user_index("trending"), None);
        assert!(store.is_navigating_right("trending"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_and_read_back() {
        let mut store = ScrollPositionManager::new();
        store.save_scroll_position("trending", 6);
        store.save_user_index("trending", 10);

        assert_eq!(store.scroll_position("trending"), 6);
        assert_eq!(store.user_index("trending"), Some(10));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_navigation_direction_derived_from_last_index() {
        let mut store = ScrollPositionManager::new();
        store.save_user_index("studios", 5);

        assert!(store.record_navigation("studios", 6));
        assert!(store.is_navigating_right("studios"));

        assert!(!store.record_navigation("studios", 4));
        assert!(!store.is_navigating_right("studios"));

        // Same index counts as left
        assert!(!store.record_navigation("studios", 5));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut store = ScrollPositionManager::new();
        store.save_user_index("a", 3);
        store.save_user_index("b", 7);
        store.record_navigation("a", 1);

        assert_eq!(store.user_index("a"), Some(3));
        assert!(!store.is_navigating_right("a"));
        assert!(store.is_navigating_right("b"));
        assert_eq!(store.user_index("b"), Some(7));
    }
}
