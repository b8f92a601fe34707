use chrono::{DateTime, NaiveDate, Utc};

/// Movie as seen by other modules, with its genres loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: NaiveDate,
    pub plot: Option<String>,
    pub duration_minutes: i32,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub genres: Vec<Genre>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Scalar fields of a movie, used both for creation and for full updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieData {
    pub title: String,
    pub release_date: NaiveDate,
    pub plot: Option<String>,
    pub duration_minutes: i32,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
}

/// Movie listing filters. Empty values disable the corresponding predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilters {
    pub search: Option<String>,
    pub genre_ids: Vec<i64>,
}

/// Raw listing request; normalized by the listing engine.
#[derive(Debug, Clone, Default)]
pub struct ListMovies {
    pub limit: u64,
    pub page: u64,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub filters: MovieFilters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoviePage {
    pub total: u64,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User ready to be stored; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
