use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::auth::require_bearer;
use crate::api::rest::handlers::{self, PageDefaults};
use crate::domain::service::{AuthService, GenreService, MovieService};

/// Services shared by the REST handlers.
#[derive(Clone)]
pub struct RestServices {
    pub movies: Arc<MovieService>,
    pub genres: Arc<GenreService>,
    pub auth: Arc<AuthService>,
    pub page_defaults: PageDefaults,
}

/// Version prefix every catalog route is served under.
pub const API_PREFIX: &str = "/api/v1";

/// Catalog routes under [`API_PREFIX`]. `/auth/*` is public; `/movies/*`
/// requires an access token.
pub fn router(services: RestServices) -> Router {
    let public = Router::new()
        // POST /auth/register - Create an account
        .route("/auth/register", post(handlers::register))
        // POST /auth/login - Exchange credentials for a token pair
        .route("/auth/login", post(handlers::login))
        // POST /auth/refresh - Exchange a refresh token for a new pair
        .route("/auth/refresh", post(handlers::refresh));

    let protected = Router::new()
        .route(
            "/movies",
            get(handlers::list_movies).post(handlers::create_movie),
        )
        .route("/movies/genres", get(handlers::list_genres))
        .route(
            "/movies/{id}",
            get(handlers::get_movie)
                .put(handlers::update_movie)
                .delete(handlers::delete_movie),
        )
        .route_layer(middleware::from_fn_with_state(
            services.auth.clone(),
            require_bearer,
        ));

    let api = public
        .merge(protected)
        .layer(Extension(services.movies))
        .layer(Extension(services.genres))
        .layer(Extension(services.auth))
        .layer(Extension(services.page_defaults));

    Router::new().nest(API_PREFIX, api)
}
