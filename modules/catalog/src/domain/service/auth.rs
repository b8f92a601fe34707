use tracing::{debug, info, instrument};

use super::UserService;
use crate::contract::model::{NewUser, Registration, TokenPair, User};
use crate::domain::error::DomainError;
use crate::domain::password::{hash_password, verify_password};
use crate::domain::token::{TokenCodec, TokenKind};
use crate::domain::validation::validate_email;

/// Stateless authentication: tokens are the only carrier of session state.
///
/// Refresh tokens are not revoked when used; a stolen refresh token stays
/// valid until it expires.
#[derive(Clone, Debug)]
pub struct AuthService {
    users: UserService,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(users: UserService, tokens: TokenCodec) -> Self {
        Self { users, tokens }
    }

    /// `login` matches either the username or the email. Unknown login and
    /// wrong password yield the same `Unauthorized`.
    #[instrument(name = "catalog.service.auth.login", skip(self, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<(User, TokenPair), DomainError> {
        let Some(creds) = self.users.credentials(login.trim()).await? else {
            debug!("unknown login");
            return Err(DomainError::Unauthorized);
        };

        if !verify_password(password.to_string(), creds.password_hash).await? {
            debug!(user_id = %creds.user.id, "password mismatch");
            return Err(DomainError::Unauthorized);
        }

        let pair = self.tokens.issue_pair(&creds.user.id)?;
        info!(user_id = %creds.user.id, "user logged in");
        Ok((creds.user, pair))
    }

    /// Create an account and log it in. The username defaults to the email.
    #[instrument(
        name = "catalog.service.auth.register",
        skip(self, reg),
        fields(email = %reg.email)
    )]
    pub async fn register(&self, reg: Registration) -> Result<(User, TokenPair), DomainError> {
        let email = reg.email.trim().to_string();
        validate_email(&email)?;
        if reg.name.trim().is_empty() {
            return Err(DomainError::validation("name", "must not be empty"));
        }
        if reg.password.is_empty() {
            return Err(DomainError::validation("password", "must not be empty"));
        }
        let username = reg
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| email.clone());

        let password_hash = hash_password(reg.password).await?;
        let user = self
            .users
            .create(NewUser {
                id: None,
                name: reg.name.trim().to_string(),
                email,
                username,
                password_hash,
            })
            .await?;

        let pair = self.tokens.issue_pair(&user.id)?;
        Ok((user, pair))
    }

    /// Exchange a valid refresh token for a new pair. The user must still exist.
    #[instrument(name = "catalog.service.auth.refresh", skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<(User, TokenPair), DomainError> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let user = self.users.get_by_id(&claims.sub).await.map_err(|e| match e {
            DomainError::NotFound { .. } => DomainError::Unauthorized,
            other => other,
        })?;
        let pair = self.tokens.issue_pair(&user.id)?;
        debug!(user_id = %user.id, "tokens refreshed");
        Ok((user, pair))
    }

    /// User id carried by a valid access token.
    pub fn authenticate(&self, access_token: &str) -> Result<String, DomainError> {
        self.tokens
            .verify(access_token, TokenKind::Access)
            .map(|claims| claims.sub)
    }
}
