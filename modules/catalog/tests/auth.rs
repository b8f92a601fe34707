//! Registration, login and token refresh over a real user table.

mod common;

use catalog::contract::model::Registration;
use catalog::domain::error::DomainError;
use catalog::domain::token::{TokenClaims, TokenKind};
use catalog::infra::storage::entity::user;
use chrono::Utc;
use common::setup;
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::{EntityTrait, PaginatorTrait};

fn registration(email: &str, username: Option<&str>) -> Registration {
    Registration {
        name: "Trinity".to_string(),
        email: email.to_string(),
        username: username.map(str::to_string),
        password: "follow-the-white-rabbit".to_string(),
    }
}

#[tokio::test]
async fn register_then_login_by_email_or_username() {
    let t = setup().await;
    let auth = t.catalog.auth();

    let (user, pair) = auth
        .register(registration("trinity@zion.io", Some("trinity")))
        .await
        .unwrap();
    assert_eq!(auth.authenticate(&pair.access_token).unwrap(), user.id);

    let (by_email, _) = auth
        .login("trinity@zion.io", "follow-the-white-rabbit")
        .await
        .unwrap();
    let (by_username, pair) = auth
        .login("trinity", "follow-the-white-rabbit")
        .await
        .unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_username.id, user.id);
    assert_eq!(auth.authenticate(&pair.access_token).unwrap(), user.id);
}

#[tokio::test]
async fn username_defaults_to_email() {
    let t = setup().await;
    let auth = t.catalog.auth();

    let (user, _) = auth.register(registration("neo@zion.io", None)).await.unwrap();
    assert_eq!(user.username, "neo@zion.io");
    let stored = t.catalog.users().get_by_id(&user.id).await.unwrap();
    assert_eq!(stored.username, user.username);
    assert_eq!(stored.email, user.email);
}

#[tokio::test]
async fn wrong_password_and_unknown_login_are_indistinguishable() {
    let t = setup().await;
    let auth = t.catalog.auth();
    auth.register(registration("morpheus@zion.io", Some("morpheus")))
        .await
        .unwrap();

    let wrong = auth.login("morpheus", "blue-pill").await.unwrap_err();
    let unknown = auth.login("smith", "blue-pill").await.unwrap_err();
    assert_eq!(wrong, DomainError::Unauthorized);
    assert_eq!(unknown, DomainError::Unauthorized);
}

#[tokio::test]
async fn identity_may_not_collide_across_email_and_username() {
    let t = setup().await;
    let auth = t.catalog.auth();
    auth.register(registration("tank@zion.io", Some("dozer@zion.io")))
        .await
        .unwrap();

    // new email equals an existing username
    let err = auth
        .register(registration("dozer@zion.io", Some("dozer")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));

    // new username equals an existing email
    let err = auth
        .register(registration("apoc@zion.io", Some("tank@zion.io")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict { .. }));

    assert_eq!(user::Entity::find().count(t.db.seaorm()).await.unwrap(), 1);

    let (user, _) = auth
        .register(registration("switch@zion.io", Some("switch")))
        .await
        .unwrap();
    let (by_email, _) = auth
        .login("switch@zion.io", "follow-the-white-rabbit")
        .await
        .unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn duplicate_identity_is_a_conflict_and_stores_nothing() {
    let t = setup().await;
    let auth = t.catalog.auth();
    auth.register(registration("oracle@zion.io", Some("oracle")))
        .await
        .unwrap();

    let same_email = auth
        .register(registration("oracle@zion.io", Some("other")))
        .await
        .unwrap_err();
    let same_username = auth
        .register(registration("other@zion.io", Some("oracle")))
        .await
        .unwrap_err();
    assert!(matches!(same_email, DomainError::Conflict { .. }));
    assert!(matches!(same_username, DomainError::Conflict { .. }));

    assert_eq!(user::Entity::find().count(t.db.seaorm()).await.unwrap(), 1);
}

#[tokio::test]
async fn register_validates_input() {
    let t = setup().await;
    let auth = t.catalog.auth();

    let err = auth
        .register(registration("not-an-email", None))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "email"));

    let mut reg = registration("tank@zion.io", None);
    reg.password.clear();
    let err = auth.register(reg).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "password"));
}

#[tokio::test]
async fn refresh_issues_a_new_pair_for_the_same_user() {
    let t = setup().await;
    let auth = t.catalog.auth();
    let (user, pair) = auth.register(registration("link@zion.io", None)).await.unwrap();

    let (refreshed_user, new_pair) = auth.refresh(&pair.refresh_token).await.unwrap();
    assert_eq!(refreshed_user.id, user.id);
    assert_ne!(new_pair.access_token, pair.access_token);
    assert_eq!(auth.authenticate(&new_pair.access_token).unwrap(), user.id);
}

#[tokio::test]
async fn refresh_rejects_access_tokens_and_garbage() {
    let t = setup().await;
    let auth = t.catalog.auth();
    let (_, pair) = auth.register(registration("niobe@zion.io", None)).await.unwrap();

    assert_eq!(
        auth.refresh(&pair.access_token).await.unwrap_err(),
        DomainError::Unauthorized
    );
    assert_eq!(
        auth.refresh("not.a.token").await.unwrap_err(),
        DomainError::Unauthorized
    );
    // and access checks reject refresh tokens
    assert_eq!(
        auth.authenticate(&pair.refresh_token).unwrap_err(),
        DomainError::Unauthorized
    );
}

#[tokio::test]
async fn expired_or_foreign_refresh_tokens_are_rejected() {
    let t = setup().await;
    let auth = t.catalog.auth();
    let (user, _) = auth.register(registration("ghost@zion.io", None)).await.unwrap();

    let now = Utc::now().timestamp();
    let expired = TokenClaims {
        sub: user.id.clone(),
        kind: TokenKind::Refresh,
        iat: now - 120,
        exp: now - 60,
        jti: "expired".to_string(),
    };
    let token = encode(
        &Header::default(),
        &expired,
        &EncodingKey::from_secret(common::test_config().token_secret.as_bytes()),
    )
    .unwrap();
    assert_eq!(auth.refresh(&token).await.unwrap_err(), DomainError::Unauthorized);

    let forged = TokenClaims {
        exp: now + 600,
        ..expired
    };
    let token = encode(
        &Header::default(),
        &forged,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();
    assert_eq!(auth.refresh(&token).await.unwrap_err(), DomainError::Unauthorized);
}

#[tokio::test]
async fn refresh_for_deleted_user_is_unauthorized() {
    let t = setup().await;
    let auth = t.catalog.auth();
    let (user, pair) = auth.register(registration("mouse@zion.io", None)).await.unwrap();

    user::Entity::delete_by_id(user.id.clone())
        .exec(t.db.seaorm())
        .await
        .unwrap();
    assert_eq!(
        auth.refresh(&pair.refresh_token).await.unwrap_err(),
        DomainError::Unauthorized
    );
}
