// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

pub mod config;
pub use config::CatalogConfig;

pub mod module;
pub use module::Catalog;

// === INTERNAL MODULES ===
// Exposed for integration tests; only `contract`, `config` and `module` are
// stable.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
