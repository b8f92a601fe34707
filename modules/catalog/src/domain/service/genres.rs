use tracing::instrument;

use super::{with_deadline, ServiceConfig};
use crate::contract::model::Genre;
use crate::domain::error::DomainError;
use crate::infra::storage::GenreRepository;

#[derive(Clone, Debug)]
pub struct GenreService {
    repo: GenreRepository,
    config: ServiceConfig,
}

impl GenreService {
    pub fn new(repo: GenreRepository, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// All genres, ordered by name.
    #[instrument(name = "catalog.service.genres.get_all", skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Genre>, DomainError> {
        with_deadline(self.config.call_timeout, "genres.get_all", async {
            Ok(self.repo.all(None).await?)
        })
        .await
    }
}
