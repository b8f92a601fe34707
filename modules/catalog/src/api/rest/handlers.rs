use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::rest::auth::AuthUser;
use crate::api::rest::dto::{
    GenreDto, GenreListDto, ListMoviesQuery, LoginReq, MovieDto, MovieListDto, MovieReq,
    RefreshReq, RegisterReq, TokenPairDto,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::problem::ProblemResponse;
use crate::domain::service::{AuthService, GenreService, MovieService};

/// Page size applied when `GET /movies` omits `limit`.
#[derive(Debug, Clone, Copy)]
pub struct PageDefaults {
    pub limit: u64,
}

pub async fn list_movies(
    Extension(svc): Extension<Arc<MovieService>>,
    Extension(defaults): Extension<PageDefaults>,
    Query(query): Query<ListMoviesQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<MovieListDto>, ProblemResponse> {
    info!("Listing movies with query: {:?}", query);

    let req = query
        .into_request(defaults.limit)
        .map_err(|e| map_domain_error(&e, uri.path()))?;

    match svc.list(req).await {
        Ok(page) => Ok(Json(MovieListDto::from(page))),
        Err(e) => {
            error!("Failed to list movies: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a movie with its genres
pub async fn get_movie(
    Extension(svc): Extension<Arc<MovieService>>,
    Path(id): Path<i64>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<MovieDto>, ProblemResponse> {
    info!("Getting movie with id: {}", id);

    match svc.get_by_id(id).await {
        Ok(movie) => Ok(Json(MovieDto::from(movie))),
        Err(e) => {
            error!("Failed to get movie {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn create_movie(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<MovieService>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req_body): Json<MovieReq>,
) -> Result<(StatusCode, Json<MovieDto>), ProblemResponse> {
    info!(%user_id, "Creating movie: {:?}", req_body.title);

    let (data, genre_ids) = req_body
        .into_parts()
        .map_err(|e| map_domain_error(&e, uri.path()))?;

    match svc.create(data, genre_ids).await {
        Ok(movie) => Ok((StatusCode::CREATED, Json(MovieDto::from(movie)))),
        Err(e) => {
            error!("Failed to create movie: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Replace a movie's fields and genre links
pub async fn update_movie(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<MovieService>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req_body): Json<MovieReq>,
) -> Result<Json<MovieDto>, ProblemResponse> {
    info!(%user_id, "Updating movie {}", id);

    let (data, genre_ids) = req_body
        .into_parts()
        .map_err(|e| map_domain_error(&e, uri.path()))?;

    match svc.update(id, data, genre_ids).await {
        Ok(movie) => Ok(Json(MovieDto::from(movie))),
        Err(e) => {
            error!("Failed to update movie {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete_movie(
    Extension(svc): Extension<Arc<MovieService>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<i64>,
    OriginalUri(uri): OriginalUri,
) -> Result<StatusCode, ProblemResponse> {
    info!(%user_id, "Deleting movie {}", id);

    match svc.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete movie {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn list_genres(
    Extension(svc): Extension<Arc<GenreService>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<GenreListDto>, ProblemResponse> {
    match svc.get_all().await {
        Ok(genres) => Ok(Json(GenreListDto {
            genres: genres.into_iter().map(GenreDto::from).collect(),
        })),
        Err(e) => {
            error!("Failed to list genres: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create an account; responds with a fresh token pair
pub async fn register(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<AuthService>>,
    Json(req_body): Json<RegisterReq>,
) -> Result<(StatusCode, Json<TokenPairDto>), ProblemResponse> {
    info!("Registering user: {:?}", req_body);

    match svc.register(req_body.into()).await {
        Ok((user, pair)) => {
            info!(user_id = %user.id, "user registered");
            Ok((StatusCode::CREATED, Json(TokenPairDto::from(pair))))
        }
        Err(e) => {
            error!("Failed to register user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn login(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<AuthService>>,
    Json(req_body): Json<LoginReq>,
) -> Result<Json<TokenPairDto>, ProblemResponse> {
    match svc.login(&req_body.login, &req_body.password).await {
        Ok((_, pair)) => Ok(Json(TokenPairDto::from(pair))),
        Err(e) => {
            info!("Login rejected for {:?}: {}", req_body.login, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn refresh(
    OriginalUri(uri): OriginalUri,
    Extension(svc): Extension<Arc<AuthService>>,
    Json(req_body): Json<RefreshReq>,
) -> Result<Json<TokenPairDto>, ProblemResponse> {
    match svc.refresh(&req_body.refresh_token).await {
        Ok((_, pair)) => Ok(Json(TokenPairDto::from(pair))),
        Err(e) => {
            info!("Refresh rejected: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
