use std::sync::Arc;

use crate::{
    application::use_cases::customer_auth::CustomerAuthUseCases,
    application::use_cases::subscriptions::SubscriptionUseCases,
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Absent when the shop/client OAuth configuration is missing; auth
    /// routes then answer with a configuration error.
    pub auth: Option<Arc<CustomerAuthUseCases>>,
    /// Absent when the shop configuration is missing.
    pub subscriptions: Option<Arc<SubscriptionUseCases>>,
}
