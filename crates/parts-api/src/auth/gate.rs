//! Ordered access guards: token verification, then role lookup

use super::token::{bearer_token, TokenClaims, TokenService};
use axum::http::HeaderMap;
use parts_core::{Collection, Document, DocumentStore, Filter, PartsError, PartsResult};
use serde_json::Value;
use tracing::{debug, warn};

/// Role value that grants admin routes
pub const ADMIN_ROLE: &str = "admin";

/// One precondition checked before a handler body runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Valid bearer token; its claims become available to later guards
    VerifyToken,
    /// Verified caller whose user document has `role == "admin"`
    AdminRole,
}

/// Guards for routes open to any verified caller
pub const USER_GUARDS: &[Guard] = &[Guard::VerifyToken];

/// Guards for admin-only routes
pub const ADMIN_GUARDS: &[Guard] = &[Guard::VerifyToken, Guard::AdminRole];

/// True if the user document carries the admin role
pub fn is_admin(user: &Document) -> bool {
    user.get("role").and_then(Value::as_str) == Some(ADMIN_ROLE)
}

pub struct AccessGate<'a> {
    tokens: &'a TokenService,
    store: &'a dyn DocumentStore,
}

impl<'a> AccessGate<'a> {
    pub fn new(tokens: &'a TokenService, store: &'a dyn DocumentStore) -> Self {
        Self { tokens, store }
    }

    /// Run `guards` in order, stopping at the first failure.
    /// Returns the verified claims if any guard produced them.
    pub async fn require(
        &self,
        headers: &HeaderMap,
        guards: &[Guard],
    ) -> PartsResult<Option<TokenClaims>> {
        let mut claims: Option<TokenClaims> = None;

        for guard in guards {
            match guard {
                Guard::VerifyToken => {
                    let token = bearer_token(headers)?;
                    claims = Some(self.tokens.verify(token)?);
                }
                Guard::AdminRole => {
                    let verified = claims.as_ref().ok_or_else(|| {
                        PartsError::Unauthenticated(
                            "Role check requires a verified identity".to_string(),
                        )
                    })?;
                    self.authorize_admin(verified).await?;
                }
            }
        }

        Ok(claims)
    }

    async fn authorize_admin(&self, claims: &TokenClaims) -> PartsResult<()> {
        let filter = Filter::eq("email", claims.email.as_str());
        let Some(user) = self.store.find_one(Collection::Users, &filter).await? else {
            warn!(email = %claims.email, "Verified token for unknown user");
            return Err(PartsError::Forbidden("No account for this identity".to_string()));
        };

        if !is_admin(&user) {
            debug!(email = %claims.email, "Admin route refused");
            return Err(PartsError::Forbidden("Admin role required".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};
    use parts_core::InMemoryStore;
    use serde_json::json;

    const SECRET: &str = "gate-secret";

    fn with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    async fn seed_user(store: &InMemoryStore, email: &str, role: Option<&str>) {
        let mut user = Document::new();
        user.insert("email".into(), json!(email));
        if let Some(role) = role {
            user.insert("role".into(), json!(role));
        }
        store.insert_one(Collection::Users, user).await.unwrap();
    }

    #[tokio::test]
    async fn test_user_guards_return_claims() {
        let tokens = TokenService::new(SECRET);
        let store = InMemoryStore::new();
        let gate = AccessGate::new(&tokens, &store);

        let headers = with_token(&tokens.issue("ann@parts.io").unwrap());
        let claims = gate.require(&headers, USER_GUARDS).await.unwrap().unwrap();
        assert_eq!(claims.email, "ann@parts.io");
    }

    #[tokio::test]
    async fn test_admin_guards_admit_admin() {
        let tokens = TokenService::new(SECRET);
        let store = InMemoryStore::new();
        seed_user(&store, "boss@parts.io", Some("admin")).await;
        let gate = AccessGate::new(&tokens, &store);

        let headers = with_token(&tokens.issue("boss@parts.io").unwrap());
        assert!(gate.require(&headers, ADMIN_GUARDS).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_guards_refuse_plain_user() {
        let tokens = TokenService::new(SECRET);
        let store = InMemoryStore::new();
        seed_user(&store, "ann@parts.io", None).await;
        let gate = AccessGate::new(&tokens, &store);

        let headers = with_token(&tokens.issue("ann@parts.io").unwrap());
        let err = gate.require(&headers, ADMIN_GUARDS).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_unknown_user_is_forbidden_not_a_crash() {
        let tokens = TokenService::new(SECRET);
        let store = InMemoryStore::new();
        let gate = AccessGate::new(&tokens, &store);

        let headers = with_token(&tokens.issue("ghost@parts.io").unwrap());
        let err = gate.require(&headers, ADMIN_GUARDS).await.unwrap_err();
        assert!(matches!(err, PartsError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_role_check_without_verification_fails_closed() {
        let tokens = TokenService::new(SECRET);
        let store = InMemoryStore::new();
        let gate = AccessGate::new(&tokens, &store);

        let err = gate
            .require(&HeaderMap::new(), &[Guard::AdminRole])
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_missing_header_stops_before_role_lookup() {
        let tokens = TokenService::new(SECRET);
        let store = InMemoryStore::new();
        let gate = AccessGate::new(&tokens, &store);

        let err = gate
            .require(&HeaderMap::new(), ADMIN_GUARDS)
            .await
            .unwrap_err();
        assert!(matches!(err, PartsError::Unauthenticated(_)));
    }

    #[test]
    fn test_is_admin() {
        let mut user = Document::new();
        assert!(!is_admin(&user));
        user.insert("role".into(), json!("admin"));
        assert!(is_admin(&user));
        user.insert("role".into(), json!("editor"));
        assert!(!is_admin(&user));
    }
}
