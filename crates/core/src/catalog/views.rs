//! Derived views over the show index.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::GenreCollection;
use crate::tvmaze::{SearchResult, Show};

/// Catalog order: rating descending (unrated counts as 0), then name
/// ascending, then id so the order never depends on insertion order.
pub fn compare_by_rating(a: &Show, b: &Show) -> Ordering {
    b.rating_value()
        .total_cmp(&a.rating_value())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort shows into catalog order.
pub fn sort_shows_by_rating<'a>(shows: impl IntoIterator<Item = &'a Show>) -> Vec<Show> {
    let mut sorted: Vec<Show> = shows.into_iter().cloned().collect();
    sorted.sort_by(compare_by_rating);
    sorted
}

/// Group shows by genre label.
///
/// A show with several genres lands in each of their groups. Groups are
/// ordered by label and their shows by [`compare_by_rating`].
pub fn group_by_genre(shows: &[Show]) -> Vec<GenreCollection> {
    let mut groups: BTreeMap<&str, Vec<Show>> = BTreeMap::new();

    for show in shows {
        for genre in &show.genres {
            groups.entry(genre.as_str()).or_default().push(show.clone());
        }
    }

    groups
        .into_iter()
        .map(|(genre, mut shows)| {
            shows.sort_by(compare_by_rating);
            GenreCollection {
                genre: genre.to_string(),
                shows,
            }
        })
        .collect()
}

/// Keep search hits rated at least `min_rating`, preserving relevance order.
pub fn filter_by_min_rating(results: &[SearchResult], min_rating: f64) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|r| r.show.rating_value() >= min_rating)
        .cloned()
        .collect()
}
