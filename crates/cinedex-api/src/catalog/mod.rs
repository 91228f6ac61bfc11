//! Movie/TV catalog lookups.
//!
//! Builds endpoint paths and query parameters from a [`ListingQuery`] and
//! sends them through the shared [`Gateway`](crate::gateway::Gateway).

mod api;
mod params;
mod service;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalMovieCatalog, LocalTvCatalog, MovieCatalog, TvCatalog};
pub use params::{DEFAULT_LANGUAGE, Endpoint, GenreFilter, ListingQuery, MediaKind};
#[allow(clippy::module_name_repetitions)]
pub use service::CatalogService;
pub use types::{
    Genre, MovieDetails, MovieListResponse, MovieSummary, POSTER_BASE_URL, TvDetails,
    TvListResponse, TvShow, poster_url,
};
