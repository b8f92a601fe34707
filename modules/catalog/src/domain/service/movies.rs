use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, info, instrument};

use super::{with_deadline, ServiceConfig};
use crate::contract::model::{ListMovies, Movie, MovieData, MoviePage};
use crate::domain::error::DomainError;
use crate::domain::listing::{dedup_ids, ListParams};
use crate::domain::validation::validate_movie;
use crate::infra::storage::mapper::movie_active_model;
use crate::infra::storage::MovieRepository;

/// Movie use cases. Writes touching associations run in one transaction.
#[derive(Clone, Debug)]
pub struct MovieService {
    repo: MovieRepository,
    config: ServiceConfig,
}

impl MovieService {
    pub fn new(repo: MovieRepository, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(
        name = "catalog.service.movies.create",
        skip(self, data, genre_ids),
        fields(title = %data.title, genres = genre_ids.len())
    )]
    pub async fn create(&self, data: MovieData, genre_ids: Vec<i64>) -> Result<Movie, DomainError> {
        let data = validate_movie(data)?;
        let genre_ids = dedup_ids(genre_ids);
        let now = Utc::now();
        let repo = self.repo.clone();

        let movie = with_deadline(self.config.call_timeout, "movies.create", async move {
            let inner = repo.clone();
            repo.with_transaction(move |tx| {
                async move {
                    let row = inner
                        .movies()
                        .create(Some(tx), movie_active_model(None, data, Some(now), now))
                        .await?;
                    inner.insert_genres(Some(tx), row.id, &genre_ids).await?;
                    let movie = inner.find_with_genres(Some(tx), row.id).await?;
                    Ok::<_, DomainError>(movie)
                }
                .boxed()
            })
            .await
        })
        .await?;

        info!(movie_id = movie.id, "movie created");
        Ok(movie)
    }

    /// Full overwrite: every scalar field and the whole genre set.
    #[instrument(
        name = "catalog.service.movies.update",
        skip(self, data, genre_ids),
        fields(movie_id = id, genres = genre_ids.len())
    )]
    pub async fn update(
        &self,
        id: i64,
        data: MovieData,
        genre_ids: Vec<i64>,
    ) -> Result<Movie, DomainError> {
        let data = validate_movie(data)?;
        let genre_ids = dedup_ids(genre_ids);
        let now = Utc::now();
        let repo = self.repo.clone();

        let movie = with_deadline(self.config.call_timeout, "movies.update", async move {
            let inner = repo.clone();
            repo.with_transaction(move |tx| {
                async move {
                    inner
                        .movies()
                        .update(Some(tx), movie_active_model(Some(id), data, None, now))
                        .await?;
                    inner.replace_genres(Some(tx), id, &genre_ids).await?;
                    let movie = inner.find_with_genres(Some(tx), id).await?;
                    Ok::<_, DomainError>(movie)
                }
                .boxed()
            })
            .await
        })
        .await?;

        info!("movie updated");
        Ok(movie)
    }

    #[instrument(name = "catalog.service.movies.get", skip(self), fields(movie_id = id))]
    pub async fn get_by_id(&self, id: i64) -> Result<Movie, DomainError> {
        with_deadline(self.config.call_timeout, "movies.get", async {
            Ok(self.repo.find_with_genres(None, id).await?)
        })
        .await
    }

    /// Idempotent: deleting a missing movie succeeds.
    #[instrument(name = "catalog.service.movies.delete", skip(self), fields(movie_id = id))]
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let repo = self.repo.clone();
        let deleted = with_deadline(self.config.call_timeout, "movies.delete", async move {
            let inner = repo.clone();
            repo.with_transaction(move |tx| {
                async move { Ok::<_, DomainError>(inner.delete(Some(tx), id).await?) }.boxed()
            })
            .await
        })
        .await?;

        debug!(deleted, "movie delete finished");
        Ok(())
    }

    #[instrument(
        name = "catalog.service.movies.list",
        skip(self, req),
        fields(limit = req.limit, page = req.page)
    )]
    pub async fn list(&self, req: ListMovies) -> Result<MoviePage, DomainError> {
        let params = ListParams::normalize(req);
        debug!(?params, "listing movies");
        with_deadline(self.config.call_timeout, "movies.list", async {
            Ok(self.repo.list_with_filters(None, &params).await?)
        })
        .await
    }
}
