/// Read access to the lists behind carousels and grids, plus the hook used
/// to request the next page. Implemented by the data-loading layer.
pub trait CarouselDataSource {
    fn item_count(&self, key: &str) -> usize;

    fn is_loading(&self, key: &str) -> bool;

    fn has_more_pages(&self, key: &str) -> bool;

    fn load_more(&mut self, key: &str);

    /// Route opened when the item at `index` is activated.
    fn item_route(&self, _key: &str, _index: usize) -> Option<String> {
        None
    }
}
