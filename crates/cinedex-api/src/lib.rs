//! API client library for cinedex.
//!
//! Provides the request gateway used for every call to the TMDB API and
//! the movie/TV catalog call-sites built on top of it.

/// Movie and TV catalog call-sites.
pub mod catalog;

/// HTTP request gateway (auth, retry, error normalization).
pub mod gateway;
