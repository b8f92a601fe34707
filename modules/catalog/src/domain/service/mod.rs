//! Catalog services. Each public operation runs under the per-call deadline
//! configured at startup; when it fires the in-flight storage future is
//! dropped and the caller gets `Timeout`.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::domain::error::DomainError;

mod auth;
mod genres;
mod movies;
mod users;

pub use auth::AuthService;
pub use genres::GenreService;
pub use movies::MovieService;
pub use users::UserService;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub call_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
        }
    }
}

async fn with_deadline<T, F>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => {
            warn!(operation, ?limit, "deadline exceeded");
            Err(DomainError::Timeout { operation })
        }
    }
}
