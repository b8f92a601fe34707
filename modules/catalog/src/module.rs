use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::handlers::PageDefaults;
use crate::api::rest::routes::{self, RestServices};
use crate::config::CatalogConfig;
use crate::domain::service::{AuthService, GenreService, MovieService, ServiceConfig, UserService};
use crate::domain::token::TokenCodec;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{GenreRepository, MovieRepository, UserRepository};

/// Catalog wiring: repositories, services and the REST router built over one
/// connection pool.
#[derive(Clone)]
pub struct Catalog {
    movies: Arc<MovieService>,
    genres: Arc<GenreService>,
    users: Arc<UserService>,
    auth: Arc<AuthService>,
    page_defaults: PageDefaults,
}

impl Catalog {
    pub fn new(conn: DatabaseConnection, cfg: &CatalogConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        info!("Initializing catalog module");
        debug!(
            "Loaded catalog config: access_token_ttl={:?}, refresh_token_ttl={:?}, call_timeout={:?}, default_page_size={}",
            cfg.access_token_ttl, cfg.refresh_token_ttl, cfg.call_timeout, cfg.default_page_size
        );

        let service_config = ServiceConfig {
            call_timeout: cfg.call_timeout,
        };
        let tokens = TokenCodec::new(
            cfg.token_secret.as_bytes(),
            cfg.access_token_ttl,
            cfg.refresh_token_ttl,
        );

        let users = UserService::new(UserRepository::new(conn.clone()), service_config.clone());
        let auth = AuthService::new(users.clone(), tokens);
        let movies = MovieService::new(MovieRepository::new(conn.clone()), service_config.clone());
        let genres = GenreService::new(GenreRepository::new(conn), service_config);

        Ok(Self {
            movies: Arc::new(movies),
            genres: Arc::new(genres),
            users: Arc::new(users),
            auth: Arc::new(auth),
            page_defaults: PageDefaults {
                limit: cfg.default_page_size,
            },
        })
    }

    /// Apply pending schema migrations.
    pub async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running catalog database migrations");
        Migrator::up(conn, None).await?;
        info!("Catalog database migrations completed successfully");
        Ok(())
    }

    pub fn router(&self) -> axum::Router {
        info!("Registering catalog REST routes");
        routes::router(RestServices {
            movies: self.movies.clone(),
            genres: self.genres.clone(),
            auth: self.auth.clone(),
            page_defaults: self.page_defaults,
        })
    }

    pub fn movies(&self) -> &Arc<MovieService> {
        &self.movies
    }

    pub fn genres(&self) -> &Arc<GenreService> {
        &self.genres
    }

    pub fn users(&self) -> &Arc<UserService> {
        &self.users
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }
}
