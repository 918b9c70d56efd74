use serde::{Deserialize, Serialize};

/// Card layout used by a carousel; decides how many slots fit on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// Standard poster cards.
    Media,
    /// Compact genre/studio/network cards.
    Category,
}

/// The rows of the main screen, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    RecentlyAdded,
    Trending,
    PopularMovies,
    MovieGenres,
    UpcomingMovies,
    Studios,
    PopularSeries,
    SeriesGenres,
    UpcomingSeries,
    Networks,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 10] = [
        MediaCategory::RecentlyAdded,
        MediaCategory::Trending,
        MediaCategory::PopularMovies,
        MediaCategory::MovieGenres,
        MediaCategory::UpcomingMovies,
        MediaCategory::Studios,
        MediaCategory::PopularSeries,
        MediaCategory::SeriesGenres,
        MediaCategory::UpcomingSeries,
        MediaCategory::Networks,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MediaCategory::RecentlyAdded => "Recently Added",
            MediaCategory::Trending => "Trending",
            MediaCategory::PopularMovies => "Popular Movies",
            MediaCategory::MovieGenres => "Movie Genres",
            MediaCategory::UpcomingMovies => "Upcoming Movies",
            MediaCategory::Studios => "Studios",
            MediaCategory::PopularSeries => "Popular Series",
            MediaCategory::SeriesGenres => "Series Genres",
            MediaCategory::UpcomingSeries => "Upcoming Series",
            MediaCategory::Networks => "Networks",
        }
    }

    /// Carousel key used by the position store and the data source.
    pub fn key(self) -> &'static str {
        match self {
            MediaCategory::RecentlyAdded => "recently_added",
            MediaCategory::Trending => "trending",
            MediaCategory::PopularMovies => "popular_movies",
            MediaCategory::MovieGenres => "movie_genres",
            MediaCategory::UpcomingMovies => "upcoming_movies",
            MediaCategory::Studios => "studios",
            MediaCategory::PopularSeries => "popular_series",
            MediaCategory::SeriesGenres => "series_genres",
            MediaCategory::UpcomingSeries => "upcoming_series",
            MediaCategory::Networks => "networks",
        }
    }

    pub fn card_kind(self) -> CardKind {
        match self {
            MediaCategory::MovieGenres
            | MediaCategory::Studios
            | MediaCategory::SeriesGenres
            | MediaCategory::Networks => CardKind::Category,
            _ => CardKind::Media,
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Next row down, `None` at the bottom of the screen.
    pub fn below(self) -> Option<Self> {
        Self::ALL.get(self.position() + 1).copied()
    }

    /// Next row up, `None` at the top of the screen.
    pub fn above(self) -> Option<Self> {
        self.position()
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(MediaType::Movie),
            "tv" | "series" => Some(MediaType::Tv),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_rows_stop_at_edges() {
        assert_eq!(MediaCategory::RecentlyAdded.above(), None);
        assert_eq!(
            MediaCategory::RecentlyAdded.below(),
            Some(MediaCategory::Trending)
        );
        assert_eq!(MediaCategory::Networks.below(), None);
        assert_eq!(
            MediaCategory::Networks.above(),
            Some(MediaCategory::UpcomingSeries)
        );
    }

    #[test]
    fn test_card_kinds() {
        assert_eq!(MediaCategory::Studios.card_kind(), CardKind::Category);
        assert_eq!(MediaCategory::Trending.card_kind(), CardKind::Media);
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<&str> = MediaCategory::ALL.iter().map(|c| c.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), MediaCategory::ALL.len());
    }

    #[test]
    fn test_media_type_parse() {
        assert_eq!(MediaType::parse("movie"), Some(MediaType::Movie));
        assert_eq!(MediaType::parse("series"), Some(MediaType::Tv));
        assert_eq!(MediaType::parse("person"), None);
    }
}
