pub mod error;
pub mod listing;
pub mod password;
pub mod service;
pub mod token;
pub mod validation;
