//! Listing query builder and endpoint selection.

use std::time::Duration;

use crate::gateway::DEFAULT_RETRY_DELAY;

/// Default response language.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Catalog media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Movies.
    Movie,
    /// TV shows.
    Tv,
}

impl MediaKind {
    /// Path segment used by TMDB (`movie` / `tv`).
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// Whether listing endpoints of this kind accept `region`.
    const fn uses_region(self) -> bool {
        matches!(self, Self::Movie)
    }
}

/// Listing endpoint shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Full-text search (`/search/{kind}`).
    Search,
    /// Filtered discovery (`/discover/{kind}`).
    Discover,
    /// Default popular listing (`/{kind}/popular`).
    Popular,
}

impl Endpoint {
    /// Resource path for `kind`.
    #[must_use]
    pub fn path(self, kind: MediaKind) -> String {
        let segment = kind.segment();
        match self {
            Self::Search => format!("/search/{segment}"),
            Self::Discover => format!("/discover/{segment}"),
            Self::Popular => format!("/{segment}/popular"),
        }
    }
}

/// Genre filter for discovery (`with_genres`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenreFilter {
    /// Genre IDs, sent comma-joined.
    Ids(Vec<u32>),
    /// Pre-formatted value, sent as-is (e.g. `"28|12"` for OR).
    Raw(String),
}

impl GenreFilter {
    /// Whether the filter selects the discover endpoint.
    ///
    /// An empty ID list does not; any raw string does.
    const fn selects_discover(&self) -> bool {
        match self {
            Self::Ids(ids) => !ids.is_empty(),
            Self::Raw(_) => true,
        }
    }

    /// Value for `with_genres`, or `None` when there is nothing to send.
    fn to_param(&self) -> Option<String> {
        match self {
            Self::Ids(ids) if ids.is_empty() => None,
            Self::Ids(ids) => Some(
                ids.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            Self::Raw(raw) if raw.is_empty() => None,
            Self::Raw(raw) => Some(raw.clone()),
        }
    }
}

/// Parameters for movie/TV listings.
///
/// [`ListingQuery::endpoint`] picks search when a query is present,
/// discover when genre/sort filters are present, popular otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// Page number (default: 1).
    pub page: u32,
    /// Response language (default: `en-US`).
    pub language: String,
    /// Full-text query.
    pub query: Option<String>,
    /// Genre filter.
    pub genres: Option<GenreFilter>,
    /// Sort order (e.g. `popularity.desc`).
    pub sort_by: Option<String>,
    /// Include adult results (default: `false`).
    pub include_adult: bool,
    /// ISO 3166-1 region (movies only).
    pub region: Option<String>,
    /// Retry count forwarded to the gateway (default: 0).
    pub retry: u32,
    /// Base backoff delay forwarded to the gateway.
    pub retry_delay: Duration,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page: 1,
            language: String::from(DEFAULT_LANGUAGE),
            query: None,
            genres: None,
            sort_by: None,
            include_adult: false,
            region: None,
            retry: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl ListingQuery {
    /// Creates a query with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the full-text query.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Filters by genre IDs.
    #[must_use]
    pub fn genre_ids(mut self, ids: Vec<u32>) -> Self {
        self.genres = Some(GenreFilter::Ids(ids));
        self
    }

    /// Filters by a raw `with_genres` value.
    #[must_use]
    pub fn genres_raw(mut self, raw: impl Into<String>) -> Self {
        self.genres = Some(GenreFilter::Raw(raw.into()));
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    /// Sets the adult flag.
    #[must_use]
    pub const fn include_adult(mut self, include_adult: bool) -> Self {
        self.include_adult = include_adult;
        self
    }

    /// Sets the region.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the retry count.
    #[must_use]
    pub const fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the base backoff delay.
    #[must_use]
    pub const fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Trimmed query text, if non-empty.
    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Sort order, if non-empty.
    fn sort_order(&self) -> Option<&str> {
        self.sort_by.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether genre or sort filters are present.
    #[must_use]
    pub fn has_discover_filters(&self) -> bool {
        self.genres.as_ref().is_some_and(GenreFilter::selects_discover)
            || self.sort_order().is_some()
    }

    /// Endpoint this query resolves to.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        if self.search_text().is_some() {
            Endpoint::Search
        } else if self.has_discover_filters() {
            Endpoint::Discover
        } else {
            Endpoint::Popular
        }
    }

    /// Path and query parameters for the selected endpoint.
    #[must_use]
    pub fn to_request(&self, kind: MediaKind) -> (String, Vec<(&'static str, String)>) {
        self.request_for(self.endpoint(), kind)
    }

    /// Path and query parameters for an explicitly chosen endpoint.
    #[must_use]
    pub fn request_for(
        &self,
        endpoint: Endpoint,
        kind: MediaKind,
    ) -> (String, Vec<(&'static str, String)>) {
        let params = match endpoint {
            Endpoint::Search => self.search_params(kind, self.search_text().unwrap_or_default()),
            Endpoint::Discover => self.discover_params(kind),
            Endpoint::Popular => self.popular_params(kind),
        };
        (endpoint.path(kind), params)
    }

    /// `page`, `language`, `include_adult` and, for movies, `region`.
    fn base_params(&self, kind: MediaKind) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("language", self.language.clone()),
            ("include_adult", self.include_adult.to_string()),
        ];
        self.push_region(kind, &mut params);
        params
    }

    fn push_region(&self, kind: MediaKind, params: &mut Vec<(&'static str, String)>) {
        if kind.uses_region()
            && let Some(ref region) = self.region
            && !region.is_empty()
        {
            params.push(("region", region.clone()));
        }
    }

    /// Parameters for `/search/{kind}`; `text` is trimmed.
    fn search_params(&self, kind: MediaKind, text: &str) -> Vec<(&'static str, String)> {
        let mut params = self.base_params(kind);
        params.push(("query", String::from(text.trim())));
        params
    }

    /// Parameters for `/discover/{kind}`.
    fn discover_params(&self, kind: MediaKind) -> Vec<(&'static str, String)> {
        let mut params = self.base_params(kind);
        if let Some(with_genres) = self.genres.as_ref().and_then(GenreFilter::to_param) {
            params.push(("with_genres", with_genres));
        }
        if let Some(sort_by) = self.sort_order() {
            params.push(("sort_by", String::from(sort_by)));
        }
        params
    }

    /// Parameters for `/{kind}/popular` (no `include_adult`).
    fn popular_params(&self, kind: MediaKind) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("language", self.language.clone()),
        ];
        self.push_region(kind, &mut params);
        params
    }
}
