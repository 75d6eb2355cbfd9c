//! Album selection by id and exact title.

use crate::models::Album;
use std::collections::BTreeSet;

/// Selection criteria for albums
///
/// An empty filter selects every album. Otherwise an album is selected when
/// its id is in `ids` or its title exactly equals one of `titles`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumFilter {
    pub ids: BTreeSet<i64>,
    pub titles: BTreeSet<String>,
}

impl AlbumFilter {
    pub fn new<I, T, S>(ids: I, titles: T) -> Self
    where
        I: IntoIterator<Item = i64>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().collect(),
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    /// True when no criteria were given
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.titles.is_empty()
    }

    /// Whether a single album passes the filter
    pub fn matches(&self, album: &Album) -> bool {
        self.is_empty() || self.ids.contains(&album.id) || self.titles.contains(&album.title)
    }

    /// Returns the selected albums in their original order
    pub fn apply(&self, albums: &[Album]) -> Vec<Album> {
        albums
            .iter()
            .filter(|album| self.matches(album))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn album(id: i64, title: &str) -> Album {
        Album {
            id,
            title: title.to_string(),
            photo_count: 0,
        }
    }

    fn sample() -> Vec<Album> {
        vec![album(1, "Summer/2024"), album(2, "Winter"), album(3, "Spring")]
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let albums = sample();
        assert_eq!(AlbumFilter::default().apply(&albums), albums);
    }

    #[test]
    fn test_title_match() {
        let filter = AlbumFilter::new([], ["Winter"]);
        let selected = filter.apply(&sample());
        assert_eq!(selected, vec![album(2, "Winter")]);
    }

    #[test]
    fn test_union_of_ids_and_titles_preserves_order() {
        let filter = AlbumFilter::new([3], ["Summer/2024"]);
        let ids: Vec<i64> = filter.apply(&sample()).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_title_match_is_exact() {
        let filter = AlbumFilter::new([], ["winter", "Wint"]);
        assert!(filter.apply(&sample()).is_empty());
    }

    #[test]
    fn test_no_match_yields_empty() {
        let filter = AlbumFilter::new([99], ["Autumn"]);
        assert!(!filter.is_empty());
        assert!(filter.apply(&sample()).is_empty());
    }
}
