use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::model::{
    Genre, ListMovies, Movie, MovieData, MovieFilters, MoviePage, Registration, TokenPair,
};
use crate::domain::error::DomainError;
use crate::domain::validation::parse_release_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDto {
    pub id: i64,
    pub title: String,
    pub release: NaiveDate,
    pub plot: Option<String>,
    pub duration_minutes: i32,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    /// Genre names, sorted.
    pub genres: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /movies` and `PUT /movies/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieReq {
    pub title: String,
    /// `YYYY-MM-DD` or RFC 3339.
    pub release: String,
    #[serde(default)]
    pub plot: Option<String>,
    pub duration_minutes: i32,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
    /// Genre ids; duplicates are ignored.
    #[serde(default)]
    pub genres: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieListDto {
    pub movies: Vec<MovieDto>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMoviesQuery {
    pub search: Option<String>,
    /// Comma-separated genre ids.
    pub genres: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreDto {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreListDto {
    pub genres: Vec<GenreDto>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterReq {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginReq {
    /// Username or email.
    #[serde(alias = "email", alias = "username")]
    pub login: String,
    pub password: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshReq {
    pub refresh_token: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TokenPairDto {
    pub access_token: String,
    pub refresh_token: String,
}

// Credentials and tokens never reach the logs.

impl fmt::Debug for RegisterReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterReq")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LoginReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginReq")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for RefreshReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshReq").finish_non_exhaustive()
    }
}

impl fmt::Debug for TokenPairDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPairDto").finish_non_exhaustive()
    }
}

// Conversions between REST DTOs and contract models

impl From<Movie> for MovieDto {
    fn from(m: Movie) -> Self {
        Self {
            id: m.id,
            title: m.title,
            release: m.release_date,
            plot: m.plot,
            duration_minutes: m.duration_minutes,
            poster_url: m.poster_url,
            trailer_url: m.trailer_url,
            genres: m.genres.into_iter().map(|g| g.name).collect(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<MoviePage> for MovieListDto {
    fn from(page: MoviePage) -> Self {
        Self {
            movies: page.movies.into_iter().map(MovieDto::from).collect(),
            total: page.total,
        }
    }
}

impl MovieReq {
    /// Scalar fields plus the requested genre ids.
    pub fn into_parts(self) -> Result<(MovieData, Vec<i64>), DomainError> {
        let data = MovieData {
            title: self.title.trim().to_string(),
            release_date: parse_release_date(&self.release)?,
            plot: self.plot,
            duration_minutes: self.duration_minutes,
            poster_url: self.poster_url,
            trailer_url: self.trailer_url,
        };
        Ok((data, self.genres))
    }
}

impl ListMoviesQuery {
    pub fn into_request(self, default_limit: u64) -> Result<ListMovies, DomainError> {
        let genre_ids = match self.genres.as_deref() {
            Some(csv) => parse_genre_ids(csv)?,
            None => Vec::new(),
        };
        Ok(ListMovies {
            limit: self.limit.unwrap_or(default_limit),
            page: self.page.unwrap_or(1),
            order_by: self.order_by,
            order_dir: self.order_dir,
            filters: MovieFilters {
                search: self.search,
                genre_ids,
            },
        })
    }
}

fn parse_genre_ids(csv: &str) -> Result<Vec<i64>, DomainError> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| DomainError::validation("genres", format!("invalid genre id '{s}'")))
        })
        .collect()
}

impl From<Genre> for GenreDto {
    fn from(g: Genre) -> Self {
        Self {
            id: g.id,
            name: g.name,
        }
    }
}

impl From<RegisterReq> for Registration {
    fn from(req: RegisterReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            username: req.username,
            password: req.password,
        }
    }
}

impl From<TokenPair> for TokenPairDto {
    fn from(p: TokenPair) -> Self {
        Self {
            access_token: p.access_token,
            refresh_token: p.refresh_token,
        }
    }
}
