use modkit_db::{Filter, RepoResult, Repository};
use sea_orm::{ActiveValue::Set, DatabaseConnection, DatabaseTransaction, NotSet, Order};

use crate::contract::model::Genre;
use crate::infra::storage::entity::genre;

#[derive(Clone, Debug)]
pub struct GenreRepository {
    genres: Repository<genre::Entity>,
}

impl GenreRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            genres: Repository::new(conn),
        }
    }

    /// Every genre, ordered by name.
    pub async fn all(&self, tx: Option<&DatabaseTransaction>) -> RepoResult<Vec<Genre>> {
        let (_, rows) = self
            .genres
            .find_all(tx, 0, 0, Some((genre::Column::Name, Order::Asc)), Filter::new())
            .await?;
        Ok(rows.into_iter().map(Genre::from).collect())
    }

    /// Genres are administered outside the HTTP surface; this is used by
    /// provisioning code and tests.
    pub async fn create(&self, tx: Option<&DatabaseTransaction>, name: &str) -> RepoResult<Genre> {
        let row = self
            .genres
            .create(
                tx,
                genre::ActiveModel {
                    id: NotSet,
                    name: Set(name.to_string()),
                },
            )
            .await?;
        Ok(row.into())
    }
}
