//! Types for TVMaze API payloads.
//!
//! These structs are the schema enforced at the client boundary: a payload
//! that does not deserialize into them is rejected instead of being trusted.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// Show
// ============================================================================

/// A TV show as returned by TVMaze.
///
/// The same show can arrive "lean" (no summary, e.g. from some listings)
/// or "full" (summary present, from the detail endpoint).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    /// TVMaze show ID.
    pub id: u32,
    /// Show name.
    pub name: String,
    /// Genre labels.
    #[serde(default)]
    pub genres: Vec<String>,
    /// Show type (e.g. "Scripted", "Reality").
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Spoken language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Episode runtime in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    /// Premiere date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premiered: Option<String>,
    /// End date (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<String>,
    /// Airing schedule.
    #[serde(default)]
    pub schedule: Schedule,
    /// Average rating.
    #[serde(default)]
    pub rating: Rating,
    /// Poster images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageLinks>,
    /// HTML summary. Presence marks the full representation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// TVMaze page URL.
    #[serde(default)]
    pub url: String,
    /// Official site URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_site: Option<String>,
    /// Running status (e.g. "Running", "Ended").
    #[serde(default)]
    pub status: String,
    /// Broadcasting network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    /// Identifiers in other catalogs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub externals: Option<Externals>,
}

impl Show {
    /// Whether this is the full representation (non-empty summary).
    pub fn is_full(&self) -> bool {
        self.summary.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Rating average, with a missing rating counted as 0.
    pub fn rating_value(&self) -> f64 {
        self.rating.average.unwrap_or(0.0)
    }

    /// Get the premiere year from the premiere date.
    pub fn premiered_year(&self) -> Option<i32> {
        self.premiered
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d.year())
    }

    /// Overlay `newer` onto this show.
    ///
    /// Fields always present on the wire are replaced. Optional fields are
    /// replaced only when `newer` carries them, and the summary only when
    /// `newer` is full, so a full show never becomes lean.
    pub fn merge_from(&mut self, newer: &Show) {
        self.name.clone_from(&newer.name);
        self.genres.clone_from(&newer.genres);
        self.kind.clone_from(&newer.kind);
        self.schedule.clone_from(&newer.schedule);
        self.rating = newer.rating;
        self.url.clone_from(&newer.url);
        self.status.clone_from(&newer.status);

        overlay(&mut self.language, &newer.language);
        overlay(&mut self.runtime, &newer.runtime);
        overlay(&mut self.premiered, &newer.premiered);
        overlay(&mut self.ended, &newer.ended);
        overlay(&mut self.image, &newer.image);
        if newer.is_full() {
            self.summary.clone_from(&newer.summary);
        }
        overlay(&mut self.official_site, &newer.official_site);
        overlay(&mut self.network, &newer.network);
        overlay(&mut self.externals, &newer.externals);
    }
}

fn overlay<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if let Some(value) = source {
        *target = Some(value.clone());
    }
}

/// Rating block of a show.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    /// Average rating (0-10), absent for unrated shows.
    #[serde(default)]
    pub average: Option<f64>,
}

/// Airing schedule of a show.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    /// Local airing time (HH:MM), empty when unknown.
    #[serde(default)]
    pub time: String,
    /// Airing weekdays.
    #[serde(default)]
    pub days: Vec<String>,
}

/// Image links at the sizes TVMaze serves.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

/// Broadcasting network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Network {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Country>,
}

/// Network country.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub name: String,
    pub code: String,
    pub timezone: String,
}

/// Identifiers of the show in other catalogs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Externals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvrage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thetvdb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
}

// ============================================================================
// Search and cast
// ============================================================================

/// A search hit: relevance score plus the matched show.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub score: f64,
    pub show: Show,
}

/// A cast entry for a show.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub person: CastPerson,
    #[serde(default)]
    pub character: Option<CastCharacter>,
    /// Whether the person plays themselves.
    #[serde(rename = "self", default)]
    pub is_self: bool,
    /// Whether this is a voice role.
    #[serde(default)]
    pub voice: bool,
}

/// The person behind a cast entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastPerson {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageLinks>,
}

/// The character played in a cast entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastCharacter {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageLinks>,
}
