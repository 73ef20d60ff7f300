//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`ShowApi`](crate::tvmaze::ShowApi) and an
//! in-memory storage backend, so the catalog and collections can be tested
//! without network or disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use popcorn_core::testing::{fixtures, MockShowApi};
//!
//! let api = MockShowApi::new();
//! api.set_page(0, vec![fixtures::show(1, "Under the Dome", Some(6.5), &["Drama"])]).await;
//! api.set_next_error(TvMazeError::RequestFailed("down".into())).await;
//! ```

mod mock_show_api;

pub use crate::storage::MemoryStorage;
pub use mock_show_api::{MockShowApi, RecordedShowQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::tvmaze::{
        CastCharacter, CastMember, CastPerson, Rating, Schedule, SearchResult, Show,
    };

    /// Create a lean show (no summary) with reasonable defaults.
    pub fn show(id: u32, name: &str, rating: Option<f64>, genres: &[&str]) -> Show {
        Show {
            id,
            name: name.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            kind: "Scripted".to_string(),
            language: Some("English".to_string()),
            runtime: Some(60),
            premiered: Some("2015-01-01".to_string()),
            ended: None,
            schedule: Schedule::default(),
            rating: Rating { average: rating },
            image: None,
            summary: None,
            url: format!("https://www.tvmaze.com/shows/{}", id),
            official_site: None,
            status: "Running".to_string(),
            network: None,
            externals: None,
        }
    }

    /// Create a full show (summary present).
    pub fn full_show(id: u32, name: &str, rating: Option<f64>, genres: &[&str]) -> Show {
        let mut show = show(id, name, rating, genres);
        show.summary = Some(format!("<p>{} is a show.</p>", name));
        show
    }

    /// Wrap a show in a search hit.
    pub fn search_result(score: f64, show: Show) -> SearchResult {
        SearchResult { score, show }
    }

    /// Create a cast entry.
    pub fn cast_member(person_id: u32, person: &str, character: &str) -> CastMember {
        CastMember {
            person: CastPerson {
                id: person_id,
                name: person.to_string(),
                image: None,
            },
            character: Some(CastCharacter {
                id: person_id + 10_000,
                name: character.to_string(),
                image: None,
            }),
            is_self: false,
            voice: false,
        }
    }
}
