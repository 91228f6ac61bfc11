//! `MovieCatalog` / `TvCatalog` trait definitions.
#![allow(clippy::future_not_send)]

use super::params::{Endpoint, ListingQuery};
use super::types::{MovieDetails, MovieListResponse, TvDetails, TvListResponse};
use crate::gateway::ApiError;

/// Movie lookups.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MovieCatalog: Send)]
pub trait LocalMovieCatalog {
    /// Lists movies, picking search, discover or popular from `query`.
    ///
    /// # Errors
    ///
    /// Returns the gateway error once the call fails terminally.
    async fn get_movies(&self, query: &ListingQuery) -> Result<MovieListResponse, ApiError>;

    /// Lists movies from a specific endpoint, bypassing selection.
    ///
    /// # Errors
    ///
    /// Returns the gateway error once the call fails terminally.
    async fn movies_at(
        &self,
        endpoint: Endpoint,
        query: &ListingQuery,
    ) -> Result<MovieListResponse, ApiError>;

    /// Fetches a single movie, optionally with `append_to_response`.
    ///
    /// # Errors
    ///
    /// Returns the gateway error once the call fails terminally.
    async fn get_movie(
        &self,
        movie_id: u64,
        append_to_response: Option<&str>,
    ) -> Result<MovieDetails, ApiError>;
}

/// TV lookups.
///
/// Same selection rules as [`LocalMovieCatalog`], without `region`.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TvCatalog: Send)]
pub trait LocalTvCatalog {
    /// Lists TV shows, picking search, discover or popular from `query`.
    ///
    /// # Errors
    ///
    /// Returns the gateway error once the call fails terminally.
    async fn get_tv(&self, query: &ListingQuery) -> Result<TvListResponse, ApiError>;

    /// Lists TV shows from a specific endpoint, bypassing selection.
    ///
    /// # Errors
    ///
    /// Returns the gateway error once the call fails terminally.
    async fn tv_at(
        &self,
        endpoint: Endpoint,
        query: &ListingQuery,
    ) -> Result<TvListResponse, ApiError>;

    /// Fetches a single TV show, optionally with `append_to_response`.
    ///
    /// # Errors
    ///
    /// Returns the gateway error once the call fails terminally.
    async fn get_tv_show(
        &self,
        series_id: u64,
        append_to_response: Option<&str>,
    ) -> Result<TvDetails, ApiError>;
}
