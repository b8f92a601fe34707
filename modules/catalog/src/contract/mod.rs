//! Public types shared with other modules and the server binary.

pub mod model;

pub use model::{
    Genre, ListMovies, Movie, MovieData, MovieFilters, MoviePage, NewUser, Registration,
    TokenPair, User,
};
