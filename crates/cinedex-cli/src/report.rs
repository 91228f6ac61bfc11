//! Log-based rendering of catalog responses.

use cinedex_api::catalog::{
    Genre, MovieDetails, MovieListResponse, TvDetails, TvListResponse, poster_url,
};

/// Placeholder for missing values.
const NONE: &str = "-";

fn rating(vote_average: Option<f64>) -> String {
    vote_average.map_or_else(|| String::from(NONE), |v| format!("{v:.1}"))
}

fn genre_names(genres: &[Genre]) -> String {
    if genres.is_empty() {
        return String::from(NONE);
    }
    genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn poster(path: Option<&str>) -> String {
    poster_url(path).unwrap_or_else(|| String::from(NONE))
}

/// Logs a movie listing page.
pub fn movie_listing(response: &MovieListResponse) {
    tracing::info!(
        "Page {}/{} ({} results)",
        response.page,
        response.total_pages,
        response.total_results
    );
    tracing::info!("ID\tTitle\tReleaseDate\tRating");
    for movie in &response.results {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            movie.id,
            movie.display_title(),
            movie.release_date.as_deref().unwrap_or(NONE),
            rating(movie.vote_average),
        );
    }
}

/// Logs a TV listing page.
pub fn tv_listing(response: &TvListResponse) {
    tracing::info!(
        "Page {}/{} ({} results)",
        response.page,
        response.total_pages,
        response.total_results
    );
    tracing::info!("ID\tName\tFirstAirDate\tRating");
    for show in &response.results {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            show.id,
            show.display_name(),
            show.first_air_date.as_deref().unwrap_or(NONE),
            rating(show.vote_average),
        );
    }
}

/// Logs movie details.
pub fn movie_details(details: &MovieDetails) {
    tracing::info!("ID: {}", details.id);
    tracing::info!("Title: {}", details.title);
    tracing::info!(
        "Release Date: {}",
        details.release_date.as_deref().unwrap_or(NONE)
    );
    match details.runtime {
        Some(minutes) => tracing::info!("Runtime: {minutes} min"),
        None => tracing::info!("Runtime: {NONE}"),
    }
    tracing::info!("Genres: {}", genre_names(&details.genres));
    tracing::info!("Rating: {}", rating(details.vote_average));
    tracing::info!("Poster: {}", poster(details.poster_path.as_deref()));
    tracing::info!("Overview: {}", details.overview.as_deref().unwrap_or(NONE));
}

/// Logs TV show details.
pub fn tv_details(details: &TvDetails) {
    tracing::info!("ID: {}", details.id);
    tracing::info!("Name: {}", details.name);
    tracing::info!(
        "First Air Date: {}",
        details.first_air_date.as_deref().unwrap_or(NONE)
    );
    tracing::info!(
        "Last Air Date: {}",
        details.last_air_date.as_deref().unwrap_or(NONE)
    );
    tracing::info!(
        "Seasons: {}",
        details
            .number_of_seasons
            .map_or_else(|| String::from(NONE), |n| n.to_string())
    );
    tracing::info!(
        "Episodes: {}",
        details
            .number_of_episodes
            .map_or_else(|| String::from(NONE), |n| n.to_string())
    );
    tracing::info!("Genres: {}", genre_names(&details.genres));
    tracing::info!("Rating: {}", rating(details.vote_average));
    tracing::info!("Poster: {}", poster(details.poster_path.as_deref()));
}
