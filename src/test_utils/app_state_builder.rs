//! Builder producing an `AppState` wired to in-memory mocks.

use std::sync::Arc;

use crate::{
    adapters::http::app_state::AppState,
    application::ports::{
        commerce::CommerceSubscriptionsPort, identity::IdentityPort,
        mirror::SubscriptionMirrorPort,
    },
    application::use_cases::{
        customer_auth::CustomerAuthUseCases, subscriptions::SubscriptionUseCases,
    },
    infra::config::AppConfig,
    test_utils::{MockCommercePort, MockIdentityPort, MockMirrorPort, test_token_set},
};

pub fn test_config() -> AppConfig {
    AppConfig {
        shop_id: Some("12345678".into()),
        client_id: Some("test-client-id".into()),
        identity_origin: "https://shopify.com".parse().unwrap(),
        customer_api_origin: "https://shopify.com".parse().unwrap(),
        customer_api_version: "2024-10".into(),
        loop_api_key: None,
        loop_api_base: "https://api.loopsubscriptions.com/admin/v2".parse().unwrap(),
        cors_origin: "http://localhost:3000".parse().unwrap(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        refresh_token_ttl_days: 30,
        oauth_cookie_ttl_minutes: 10,
    }
}

pub struct TestAppStateBuilder {
    config: AppConfig,
    identity: Option<Arc<dyn IdentityPort>>,
    commerce: Option<Arc<dyn CommerceSubscriptionsPort>>,
    mirror: Option<Arc<dyn SubscriptionMirrorPort>>,
    shop_configured: bool,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: test_config(),
            identity: None,
            commerce: None,
            mirror: None,
            shop_configured: true,
        }
    }

    /// Simulates a deployment with no OAuth configuration at all.
    pub fn without_shop_config(mut self) -> Self {
        self.config.shop_id = None;
        self.config.client_id = None;
        self.shop_configured = false;
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityPort>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_commerce(mut self, commerce: Arc<dyn CommerceSubscriptionsPort>) -> Self {
        self.commerce = Some(commerce);
        self
    }

    pub fn with_mirror(mut self, mirror: Arc<dyn SubscriptionMirrorPort>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn build(self) -> AppState {
        if !self.shop_configured {
            return AppState {
                config: Arc::new(self.config),
                auth: None,
                subscriptions: None,
            };
        }

        let identity = self
            .identity
            .unwrap_or_else(|| Arc::new(MockIdentityPort::succeeding(test_token_set("nonce"))));
        let commerce = self
            .commerce
            .unwrap_or_else(|| Arc::new(MockCommercePort::new()));
        let mirror = self
            .mirror
            .or_else(|| Some(Arc::new(MockMirrorPort::new()) as Arc<dyn SubscriptionMirrorPort>));

        AppState {
            config: Arc::new(self.config),
            auth: Some(Arc::new(CustomerAuthUseCases::new(identity))),
            subscriptions: Some(Arc::new(SubscriptionUseCases::new(commerce, mirror))),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
