#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{header, HeaderValue};
use axum_test::TestServer;
use parts_api::{create_router, AppConfig, AppState};
use parts_core::{
    Collection, Document, DocumentStore, InMemoryStore, PartsResult, PaymentGateway,
    PaymentIntent, PaymentIntentRequest,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

pub const ADMIN_EMAIL: &str = "boss@parts.io";
pub const CLIENT_SECRET: &str = "pi_test_secret_123";

/// Payment gateway double that records every request
#[derive(Default)]
pub struct FixedGateway {
    pub requests: Mutex<Vec<PaymentIntentRequest>>,
}

#[async_trait]
impl PaymentGateway for FixedGateway {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> PartsResult<PaymentIntent> {
        self.requests.lock().unwrap().push(*request);
        Ok(PaymentIntent {
            id: "pi_test".to_string(),
            client_secret: CLIENT_SECRET.to_string(),
            amount: request.amount,
            currency: request.currency,
        })
    }

    fn provider_name(&self) -> &'static str {
        "fixed"
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: InMemoryStore,
    pub gateway: Arc<FixedGateway>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            token_secret: "integration-secret".to_string(),
            database_url: None,
        };
        let store = InMemoryStore::new();
        let gateway = Arc::new(FixedGateway::default());
        let state = AppState::new(config, Arc::new(store.clone()), gateway.clone());
        let server = TestServer::new(create_router(state.clone())).unwrap();

        Self {
            server,
            state,
            store,
            gateway,
        }
    }

    /// Token for `email`, signed with the app's secret
    pub fn token_for(&self, email: &str) -> String {
        self.state.tokens.issue(email).unwrap()
    }

    pub async fn seed_user(&self, email: &str, role: Option<&str>) {
        let mut user = Document::new();
        user.insert("email".into(), json!(email));
        if let Some(role) = role {
            user.insert("role".into(), json!(role));
        }
        self.store.insert_one(Collection::Users, user).await.unwrap();
    }

    /// Seed an admin account and return its token
    pub async fn admin_token(&self) -> String {
        self.seed_user(ADMIN_EMAIL, Some("admin")).await;
        self.token_for(ADMIN_EMAIL)
    }
}

pub fn raw_authorization(value: &'static str) -> (header::HeaderName, HeaderValue) {
    (header::AUTHORIZATION, HeaderValue::from_static(value))
}
