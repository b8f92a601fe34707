//! Movie storage: the generic repository plus the listing query, genre
//! association maintenance and eager genre loading.

use std::collections::HashMap;

use futures::future::BoxFuture;
use modkit_db::errors::classify;
use modkit_db::{Filter, RepoError, RepoResult, Repository};
use sea_orm::sea_query::{Expr, LikeExpr, Query};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;

use crate::contract::model::{Genre, Movie, MoviePage};
use crate::domain::listing::{like_pattern, ListParams, SortDir, SortField};
use crate::infra::storage::entity::{genre, movie, movie_genre};
use crate::infra::storage::mapper::movie_to_contract;

#[derive(Clone, Debug)]
pub struct MovieRepository {
    movies: Repository<movie::Entity>,
    links: Repository<movie_genre::Entity>,
}

impl MovieRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            movies: Repository::new(conn.clone()),
            links: Repository::new(conn),
        }
    }

    /// Base CRUD over the `movies` table.
    pub fn movies(&self) -> &Repository<movie::Entity> {
        &self.movies
    }

    pub async fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, E>>,
        E: From<RepoError>,
    {
        self.movies.with_transaction(f).await
    }

    /// Associate `movie_id` with every genre in `genre_ids` (already distinct).
    pub async fn insert_genres(
        &self,
        tx: Option<&DatabaseTransaction>,
        movie_id: i64,
        genre_ids: &[i64],
    ) -> RepoResult<()> {
        let links = genre_ids
            .iter()
            .map(|&genre_id| movie_genre::ActiveModel {
                movie_id: Set(movie_id),
                genre_id: Set(genre_id),
            })
            .collect();
        self.links.batch_create(tx, links).await
    }

    /// Replace the whole association set of `movie_id`.
    pub async fn replace_genres(
        &self,
        tx: Option<&DatabaseTransaction>,
        movie_id: i64,
        genre_ids: &[i64],
    ) -> RepoResult<()> {
        let removed = self
            .links
            .delete(tx, Filter::new().eq(movie_genre::Column::MovieId, movie_id))
            .await?;
        debug!(movie_id, removed, added = genre_ids.len(), "replacing genres");
        self.insert_genres(tx, movie_id, genre_ids).await
    }

    /// Delete the movie and its associations; returns deleted movie rows.
    pub async fn delete(&self, tx: Option<&DatabaseTransaction>, id: i64) -> RepoResult<u64> {
        self.links
            .delete(tx, Filter::new().eq(movie_genre::Column::MovieId, id))
            .await?;
        self.movies
            .delete(tx, Filter::new().eq(movie::Column::Id, id))
            .await
    }

    /// One movie with its genres; `NotFound` if missing.
    pub async fn find_with_genres(
        &self,
        tx: Option<&DatabaseTransaction>,
        id: i64,
    ) -> RepoResult<Movie> {
        let row = self
            .movies
            .find_one(tx, Filter::new().eq(movie::Column::Id, id))
            .await?;
        let mut genres = match tx {
            Some(tx) => load_genres(tx, &[id]).await?,
            None => load_genres(self.movies.conn(), &[id]).await?,
        };
        Ok(movie_to_contract(row, genres.remove(&id).unwrap_or_default()))
    }

    /// Filtered, ordered page of movies plus the total match count.
    pub async fn list_with_filters(
        &self,
        tx: Option<&DatabaseTransaction>,
        params: &ListParams,
    ) -> RepoResult<MoviePage> {
        match tx {
            Some(tx) => list_on(tx, params).await,
            None => list_on(self.movies.conn(), params).await,
        }
    }
}

fn map_err(err: sea_orm::DbErr) -> RepoError {
    classify(err, "movies")
}

async fn list_on<C: ConnectionTrait>(conn: &C, params: &ListParams) -> RepoResult<MoviePage> {
    let mut query = movie::Entity::find();

    if let Some(term) = &params.search {
        query = query.filter(
            Expr::col((movie::Entity, movie::Column::TitleFolded))
                .like(LikeExpr::new(like_pattern(term)).escape('\\')),
        );
    }

    if !params.genre_ids.is_empty() {
        // a movie matching several requested genres must still appear once
        let matching = Query::select()
            .column(movie_genre::Column::MovieId)
            .from(movie_genre::Entity)
            .and_where(movie_genre::Column::GenreId.is_in(params.genre_ids.iter().copied()))
            .to_owned();
        query = query.filter(movie::Column::Id.in_subquery(matching));
    }

    let total = query.clone().count(conn).await.map_err(map_err)?;
    if total == 0 || params.offset() >= total {
        return Ok(MoviePage {
            total,
            movies: Vec::new(),
        });
    }

    let column = match params.sort.field {
        SortField::Title => movie::Column::Title,
        SortField::ReleaseDate => movie::Column::ReleaseDate,
        SortField::CreatedAt => movie::Column::CreatedAt,
    };
    let order = match params.sort.dir {
        SortDir::Asc => Order::Asc,
        SortDir::Desc => Order::Desc,
    };

    let rows = query
        .order_by(column, order)
        .order_by_asc(movie::Column::Id)
        .offset(params.offset())
        .limit(params.limit)
        .all(conn)
        .await
        .map_err(map_err)?;

    let ids: Vec<i64> = rows.iter().map(|m| m.id).collect();
    let mut genres = load_genres(conn, &ids).await?;

    let movies = rows
        .into_iter()
        .map(|row| {
            let g = genres.remove(&row.id).unwrap_or_default();
            movie_to_contract(row, g)
        })
        .collect();

    Ok(MoviePage { total, movies })
}

/// movie id → genres (sorted by name) for the given movies only.
async fn load_genres<C: ConnectionTrait>(
    conn: &C,
    movie_ids: &[i64],
) -> RepoResult<HashMap<i64, Vec<Genre>>> {
    let mut out: HashMap<i64, Vec<Genre>> = HashMap::new();
    if movie_ids.is_empty() {
        return Ok(out);
    }

    let rows = movie_genre::Entity::find()
        .filter(movie_genre::Column::MovieId.is_in(movie_ids.iter().copied()))
        .find_also_related(genre::Entity)
        .order_by_asc(genre::Column::Name)
        .all(conn)
        .await
        .map_err(|e| classify(e, "movie_genres"))?;

    for (link, genre) in rows {
        if let Some(genre) = genre {
            out.entry(link.movie_id).or_default().push(genre.into());
        }
    }
    Ok(out)
}
