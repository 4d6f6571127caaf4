//! Bearer-token authentication.
//!
//! Token issuance lives elsewhere; this layer only resolves already-issued
//! tokens to an [`Actor`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use order_saga::Actor;

use crate::error::ApiError;

/// Resolves a bearer token to the actor behind it.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Option<Actor>;
}

/// Fixed token-to-actor table, for tests and local development.
#[derive(Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: Arc<HashMap<String, Actor>>,
}

impl StaticTokenAuthenticator {
    /// Creates an authenticator over a fixed token table.
    pub fn new(tokens: HashMap<String, Actor>) -> Self {
        Self {
            tokens: Arc::new(tokens),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Option<Actor> {
        self.tokens.get(token).cloned()
    }
}

/// Extracts and resolves the request's bearer token.
pub async fn require_actor(
    authenticator: &dyn Authenticator,
    headers: &HeaderMap,
) -> Result<Actor, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    authenticator
        .authenticate(token)
        .await
        .ok_or_else(|| ApiError::Unauthorized("unknown token".to_string()))
}

/// Rejects actors without the admin role.
pub fn require_admin(actor: &Actor) -> Result<(), ApiError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;

    fn authenticator() -> StaticTokenAuthenticator {
        let mut tokens = HashMap::new();
        tokens.insert("user-token".to_string(), Actor::user(UserId::new()));
        tokens.insert("admin-token".to_string(), Actor::admin(UserId::new()));
        StaticTokenAuthenticator::new(tokens)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn known_token_resolves_to_actor() {
        let auth = authenticator();
        let actor = require_actor(&auth, &bearer("admin-token")).await.unwrap();
        assert!(actor.is_admin());
    }

    #[tokio::test]
    async fn missing_and_unknown_tokens_are_unauthorized() {
        let auth = authenticator();

        assert!(matches!(
            require_actor(&auth, &HeaderMap::new()).await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            require_actor(&auth, &bearer("nope")).await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn admin_gate() {
        let auth = authenticator();
        let user = require_actor(&auth, &bearer("user-token")).await.unwrap();
        let admin = require_actor(&auth, &bearer("admin-token")).await.unwrap();

        assert!(matches!(require_admin(&user), Err(ApiError::Forbidden)));
        assert!(require_admin(&admin).is_ok());
    }
}
