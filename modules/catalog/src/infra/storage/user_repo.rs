use modkit_db::errors::classify;
use modkit_db::{Filter, RepoResult, Repository};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter,
};

use crate::contract::model::{NewUser, User};
use crate::infra::storage::entity::user;

/// A stored user together with its password hash. Never leaves the domain.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Clone, Debug)]
pub struct UserRepository {
    users: Repository<user::Entity>,
}

impl UserRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            users: Repository::new(conn),
        }
    }

    /// Insert a user whose id and timestamps are already decided.
    pub async fn create(
        &self,
        tx: Option<&DatabaseTransaction>,
        id: String,
        new_user: NewUser,
        now: chrono::DateTime<chrono::Utc>,
    ) -> RepoResult<User> {
        let row = self
            .users
            .create(
                tx,
                user::ActiveModel {
                    id: Set(id),
                    name: Set(new_user.name),
                    email: Set(new_user.email),
                    username: Set(new_user.username),
                    password_hash: Set(new_user.password_hash),
                    created_at: Set(now),
                    updated_at: Set(now),
                },
            )
            .await?;
        Ok(row.into())
    }

    pub async fn find_by_id(&self, tx: Option<&DatabaseTransaction>, id: &str) -> RepoResult<User> {
        let row = self
            .users
            .find_one(tx, Filter::new().eq(user::Column::Id, id))
            .await?;
        Ok(row.into())
    }

    /// User whose username OR email equals `login`.
    pub async fn find_by_login(
        &self,
        tx: Option<&DatabaseTransaction>,
        login: &str,
    ) -> RepoResult<Option<Credentials>> {
        let cond = Condition::any()
            .add(user::Column::Username.eq(login))
            .add(user::Column::Email.eq(login));
        let row = match tx {
            Some(tx) => first_matching(tx, cond).await?,
            None => first_matching(self.users.conn(), cond).await?,
        };
        Ok(row.map(|m| Credentials {
            password_hash: m.password_hash.clone(),
            user: m.into(),
        }))
    }

    /// Whether `email` or `username` is already taken. Login matches either
    /// column, so both values are checked against both columns.
    pub async fn identity_taken(
        &self,
        tx: Option<&DatabaseTransaction>,
        email: &str,
        username: &str,
    ) -> RepoResult<bool> {
        let cond = Condition::any()
            .add(user::Column::Email.is_in([email, username]))
            .add(user::Column::Username.is_in([email, username]));
        let row = match tx {
            Some(tx) => first_matching(tx, cond).await?,
            None => first_matching(self.users.conn(), cond).await?,
        };
        Ok(row.is_some())
    }
}

async fn first_matching<C: ConnectionTrait>(
    conn: &C,
    cond: Condition,
) -> RepoResult<Option<user::Model>> {
    user::Entity::find()
        .filter(cond)
        .one(conn)
        .await
        .map_err(|e| classify(e, "users"))
}
