//! `CatalogService` - movie/TV lookups over the shared [`Gateway`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::instrument;

use super::api::{MovieCatalog, TvCatalog};
use super::params::{Endpoint, ListingQuery, MediaKind};
use super::types::{MovieDetails, MovieListResponse, TvDetails, TvListResponse};
use crate::gateway::{ApiError, Gateway, Outcome, RequestOptions};

/// Movie and TV lookups.
///
/// Holds no state of its own; every call is one gateway request.
#[derive(Clone)]
pub struct CatalogService {
    gateway: Arc<Gateway>,
}

impl CatalogService {
    /// Creates a service over a shared gateway.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Underlying gateway.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[instrument(skip_all, fields(kind = kind.segment(), endpoint = ?endpoint, page = query.page))]
    async fn list<T: DeserializeOwned>(
        &self,
        kind: MediaKind,
        endpoint: Endpoint,
        query: &ListingQuery,
    ) -> Result<T, ApiError> {
        let (path, params) = query.request_for(endpoint, kind);
        tracing::debug!(%path, "listing request");
        let options = RequestOptions::new()
            .retry(query.retry)
            .retry_delay(query.retry_delay);
        self.gateway
            .get(&path, &params, options)
            .await
            .and_then(Outcome::into_result)
    }

    #[instrument(skip(self))]
    async fn details<T: DeserializeOwned>(
        &self,
        kind: MediaKind,
        id: u64,
        append_to_response: Option<&str>,
    ) -> Result<T, ApiError> {
        let path = format!("/{}/{id}", kind.segment());
        let params: Vec<(&str, String)> = append_to_response
            .filter(|a| !a.is_empty())
            .map(|a| ("append_to_response", String::from(a)))
            .into_iter()
            .collect();
        self.gateway
            .get(&path, &params, RequestOptions::new().retry(0))
            .await
            .and_then(Outcome::into_result)
    }
}

impl MovieCatalog for CatalogService {
    async fn get_movies(&self, query: &ListingQuery) -> Result<MovieListResponse, ApiError> {
        self.list(MediaKind::Movie, query.endpoint(), query).await
    }

    async fn movies_at(
        &self,
        endpoint: Endpoint,
        query: &ListingQuery,
    ) -> Result<MovieListResponse, ApiError> {
        self.list(MediaKind::Movie, endpoint, query).await
    }

    async fn get_movie(
        &self,
        movie_id: u64,
        append_to_response: Option<&str>,
    ) -> Result<MovieDetails, ApiError> {
        self.details(MediaKind::Movie, movie_id, append_to_response)
            .await
    }
}

impl TvCatalog for CatalogService {
    async fn get_tv(&self, query: &ListingQuery) -> Result<TvListResponse, ApiError> {
        self.list(MediaKind::Tv, query.endpoint(), query).await
    }

    async fn tv_at(
        &self,
        endpoint: Endpoint,
        query: &ListingQuery,
    ) -> Result<TvListResponse, ApiError> {
        self.list(MediaKind::Tv, endpoint, query).await
    }

    async fn get_tv_show(
        &self,
        series_id: u64,
        append_to_response: Option<&str>,
    ) -> Result<TvDetails, ApiError> {
        self.details(MediaKind::Tv, series_id, append_to_response)
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::time::Duration;

    use futures::future::BoxFuture;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::gateway::{ErrorKind, Sleeper, StaticToken};

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _delay: Duration) -> BoxFuture<'_, ()> {
            Box::pin(async {})
        }
    }

    fn service(server: &MockServer) -> CatalogService {
        let base: Url = format!("{}/3/", server.uri()).parse().unwrap();
        let gateway = Gateway::builder()
            .base_url(base)
            .token_provider(StaticToken::new("test-token"))
            .sleeper(Arc::new(NoSleep))
            .build()
            .unwrap();
        CatalogService::new(Arc::new(gateway))
    }

    fn movie_listing() -> serde_json::Value {
        json!({
            "page": 1,
            "results": [{"id": 27205, "title": "Inception", "poster_path": "/inception.jpg"}],
            "total_pages": 1,
            "total_results": 1
        })
    }

    fn tv_listing() -> serde_json::Value {
        json!({
            "page": 2,
            "results": [{"id": 1399, "name": "Game of Thrones"}],
            "total_pages": 3,
            "total_results": 41
        })
    }

    #[tokio::test]
    async fn test_get_movies_search() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/search/movie"))
            .and(query_param("query", "inception"))
            .and(query_param("page", "1"))
            .and(query_param("language", "en-US"))
            .and(query_param("include_adult", "false"))
            .and(query_param("region", "US"))
            .respond_with(ResponseTemplate::new(200).set_body_json(movie_listing()))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);
        let query = ListingQuery::new().query(" inception ").region("US");

        // Act
        let listing = catalog.get_movies(&query).await.unwrap();

        // Assert
        assert_eq!(listing.results.len(), 1);
        assert_eq!(listing.results[0].display_title(), "Inception");
    }

    #[tokio::test]
    async fn test_get_movies_discover_with_genres() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/discover/movie"))
            .and(query_param("with_genres", "28,12"))
            .and(query_param("sort_by", "popularity.desc"))
            .and(query_param_is_missing("query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(movie_listing()))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);
        let query = ListingQuery::new()
            .genre_ids(vec![28, 12])
            .sort_by("popularity.desc");

        // Act
        let result = catalog.get_movies(&query).await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_get_movies_popular_by_default() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/popular"))
            .and(query_param("page", "1"))
            .and(query_param_is_missing("include_adult"))
            .respond_with(ResponseTemplate::new(200).set_body_json(movie_listing()))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);

        // Act
        let result = catalog.get_movies(&ListingQuery::new()).await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_movies_at_forces_endpoint() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/discover/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(movie_listing()))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);

        // Act
        let result = catalog
            .movies_at(Endpoint::Discover, &ListingQuery::new())
            .await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_get_tv_never_sends_region() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/tv/popular"))
            .and(query_param("page", "2"))
            .and(query_param_is_missing("region"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tv_listing()))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);
        let query = ListingQuery::new().page(2).region("JP");

        // Act
        let listing = catalog.get_tv(&query).await.unwrap();

        // Assert
        assert_eq!(listing.total_results, 41);
        assert_eq!(listing.results[0].display_name(), "Game of Thrones");
    }

    #[tokio::test]
    async fn test_get_tv_search() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/search/tv"))
            .and(query_param("query", "thrones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tv_listing()))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);

        // Act
        let result = catalog.get_tv(&ListingQuery::new().query("thrones")).await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_get_movie_with_append() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/27205"))
            .and(query_param("append_to_response", "videos,credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 27205,
                "title": "Inception",
                "runtime": 148,
                "videos": {"results": []},
                "credits": {"cast": []}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);

        // Act
        let details = catalog
            .get_movie(27205, Some("videos,credits"))
            .await
            .unwrap();

        // Assert
        assert_eq!(details.runtime, Some(148));
        assert!(details.videos.is_some());
    }

    #[tokio::test]
    async fn test_get_tv_show_without_append() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/tv/1399"))
            .and(query_param_is_missing("append_to_response"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1399,
                "name": "Game of Thrones",
                "number_of_seasons": 8
            })))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);

        // Act
        let details = catalog.get_tv_show(1399, None).await.unwrap();

        // Assert
        assert_eq!(details.number_of_seasons, Some(8));
    }

    #[tokio::test]
    async fn test_details_are_not_retried() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/1"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);

        // Act
        let err = catalog.get_movie(1, None).await.unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_listing_retry_is_forwarded() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/3/movie/popular"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/3/movie/popular"))
            .respond_with(ResponseTemplate::new(200).set_body_json(movie_listing()))
            .expect(1)
            .mount(&server)
            .await;
        let catalog = service(&server);

        // Act
        let result = catalog.get_movies(&ListingQuery::new().retry(1)).await;

        // Assert
        assert!(result.is_ok());
    }
}
