use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{with_deadline, ServiceConfig};
use crate::contract::model::{NewUser, User};
use crate::domain::error::DomainError;
use crate::infra::storage::{Credentials, UserRepository};

#[derive(Clone, Debug)]
pub struct UserService {
    repo: UserRepository,
    config: ServiceConfig,
}

impl UserService {
    pub fn new(repo: UserRepository, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Store a user. A missing id becomes a fresh UUID v4; timestamps are now.
    #[instrument(
        name = "catalog.service.users.create",
        skip(self, new_user),
        fields(email = %new_user.email, username = %new_user.username)
    )]
    pub async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let id = new_user
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let user = with_deadline(self.config.call_timeout, "users.create", async {
            if self
                .repo
                .identity_taken(None, &new_user.email, &new_user.username)
                .await?
            {
                return Err(DomainError::conflict("email or username already registered"));
            }
            // the unique indexes still catch a concurrent registration
            Ok(self.repo.create(None, id, new_user, Utc::now()).await?)
        })
        .await?;

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    #[instrument(name = "catalog.service.users.get", skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<User, DomainError> {
        with_deadline(self.config.call_timeout, "users.get", async {
            Ok(self.repo.find_by_id(None, id).await?)
        })
        .await
    }

    pub(crate) async fn credentials(&self, login: &str) -> Result<Option<Credentials>, DomainError> {
        with_deadline(self.config.call_timeout, "users.find_by_login", async {
            Ok(self.repo.find_by_login(None, login).await?)
        })
        .await
    }
}
