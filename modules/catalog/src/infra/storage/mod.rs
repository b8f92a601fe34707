pub mod entity;
pub mod genre_repo;
pub mod mapper;
pub mod migrations;
pub mod movie_repo;
pub mod user_repo;

pub use genre_repo::GenreRepository;
pub use movie_repo::MovieRepository;
pub use user_repo::{Credentials, UserRepository};
