//! TMDB movie/TV response types.

use serde::Deserialize;

/// Base URL for poster thumbnails.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w200";

/// Fallback shown when a result has no usable title.
const UNTITLED: &str = "Untitled";

/// Builds a poster thumbnail URL from a TMDB image path.
#[must_use]
pub fn poster_url(poster_path: Option<&str>) -> Option<String> {
    poster_path
        .filter(|p| !p.is_empty())
        .map(|p| format!("{POSTER_BASE_URL}{p}"))
}

/// A genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    /// TMDB genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

// --- Movies ---

/// A movie entry in a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Release date (YYYY-MM-DD).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl MovieSummary {
    /// Title shown to users.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            return &self.title;
        }
        self.original_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
    }
}

/// Paged movie listing (`movie/popular`, `search/movie`, `discover/movie`).
#[derive(Debug, Clone, Deserialize)]
pub struct MovieListResponse {
    /// Current page number.
    pub page: u32,
    /// Results on this page.
    pub results: Vec<MovieSummary>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of results.
    pub total_results: u32,
}

/// Response from `movie/{movie_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Appended `videos` payload.
    #[serde(default)]
    pub videos: Option<serde_json::Value>,
    /// Appended `credits` payload.
    #[serde(default)]
    pub credits: Option<serde_json::Value>,
}

// --- TV ---

/// A TV show entry in a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TvShow {
    /// TMDB series ID.
    pub id: u64,
    /// Localized name.
    pub name: String,
    /// Original name.
    #[serde(default)]
    pub original_name: Option<String>,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: Option<String>,
    /// Origin countries (ISO 3166-1).
    #[serde(default)]
    pub origin_country: Vec<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// First air date.
    #[serde(default)]
    pub first_air_date: Option<String>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: Option<f64>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Vote count.
    #[serde(default)]
    pub vote_count: Option<u32>,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult flag.
    #[serde(default)]
    pub adult: bool,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

impl TvShow {
    /// Name shown to users.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.original_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(UNTITLED)
    }
}

/// Paged TV listing (`tv/popular`, `search/tv`, `discover/tv`).
#[derive(Debug, Clone, Deserialize)]
pub struct TvListResponse {
    /// Current page number.
    pub page: u32,
    /// Results on this page.
    pub results: Vec<TvShow>,
    /// Total number of pages.
    pub total_pages: u32,
    /// Total number of results.
    pub total_results: u32,
}

/// Response from `tv/{series_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TvDetails {
    /// TMDB series ID.
    pub id: u64,
    /// Localized name.
    pub name: String,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// First air date.
    #[serde(default)]
    pub first_air_date: Option<String>,
    /// Last air date.
    #[serde(default)]
    pub last_air_date: Option<String>,
    /// Total number of seasons.
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    /// Total number of episodes.
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Typical episode runtimes in minutes.
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
}
