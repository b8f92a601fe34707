use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};

use crate::contract::model::{Genre, Movie, MovieData, User};
use crate::domain::listing::fold_title;
use crate::infra::storage::entity::{genre, movie, user};

/// Movie row plus its loaded genres.
pub fn movie_to_contract(row: movie::Model, genres: Vec<Genre>) -> Movie {
    Movie {
        id: row.id,
        title: row.title,
        release_date: row.release_date,
        plot: row.plot,
        duration_minutes: row.duration_minutes,
        poster_url: row.poster_url,
        trailer_url: row.trailer_url,
        genres,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

impl From<genre::Model> for Genre {
    fn from(row: genre::Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

impl From<user::Model> for User {
    fn from(row: user::Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            username: row.username,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Active model for a movie row. `None` fields stay unset: a missing `id` is
/// generated by the database, a missing `created_at` is left untouched on update.
pub fn movie_active_model(
    id: Option<i64>,
    data: MovieData,
    created_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
) -> movie::ActiveModel {
    movie::ActiveModel {
        id: id.map_or(NotSet, Set),
        title_folded: Set(fold_title(&data.title)),
        title: Set(data.title),
        release_date: Set(data.release_date),
        plot: Set(data.plot),
        duration_minutes: Set(data.duration_minutes),
        poster_url: Set(data.poster_url),
        trailer_url: Set(data.trailer_url),
        created_at: created_at.map_or(NotSet, Set),
        updated_at: Set(updated_at),
    }
}
