//! In-memory mock implementations of the external-system ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::commerce::CommerceSubscriptionsPort,
    application::ports::identity::{ExchangeError, IdentityPort, TokenSet},
    application::ports::mirror::{MirrorPaymentMethod, SubscriptionMirrorPort, UpcomingOrder},
    domain::entities::subscription_contract::{IntervalUnit, SubscriptionContract},
};

// ============================================================================
// MockIdentityPort
// ============================================================================

enum MockExchange {
    Success(TokenSet),
    ProviderError { status: u16, error_code: Option<String> },
}

pub struct MockIdentityPort {
    calls: AtomicUsize,
    response: Mutex<MockExchange>,
}

impl MockIdentityPort {
    pub fn succeeding(tokens: TokenSet) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Mutex::new(MockExchange::Success(tokens)),
        }
    }

    pub fn failing(status: u16, error_code: Option<&str>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Mutex::new(MockExchange::ProviderError {
                status,
                error_code: error_code.map(str::to_string),
            }),
        }
    }

    pub fn exchange_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityPort for MockIdentityPort {
    async fn exchange_code(
        &self,
        _code: &str,
        _redirect_uri: &str,
        _code_verifier: &str,
    ) -> Result<TokenSet, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.response.lock().unwrap() {
            MockExchange::Success(tokens) => Ok(tokens.clone()),
            MockExchange::ProviderError { status, error_code } => Err(ExchangeError::Provider {
                status: *status,
                error_code: error_code.clone(),
                message: "mock provider error".into(),
            }),
        }
    }
}

// ============================================================================
// MockCommercePort
// ============================================================================

#[derive(Default)]
pub struct MockCommercePort {
    calls: Mutex<Vec<(&'static str, String)>>,
    failures: Mutex<HashMap<&'static str, AppError>>,
    contract: Mutex<Option<SubscriptionContract>>,
}

impl MockCommercePort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call to `method` fail with `error` (consumed on use).
    pub fn fail_next(&self, method: &'static str, error: AppError) {
        self.failures.lock().unwrap().insert(method, error);
    }

    pub fn set_contract(&self, contract: SubscriptionContract) {
        *self.contract.lock().unwrap() = Some(contract);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| *m == method)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_gid(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(_, gid)| gid.clone())
    }

    fn record(&self, method: &'static str, gid: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push((method, gid.to_string()));
        match self.failures.lock().unwrap().remove(method) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CommerceSubscriptionsPort for MockCommercePort {
    async fn get_contract(
        &self,
        _access_token: &str,
        contract_gid: &str,
    ) -> AppResult<SubscriptionContract> {
        self.record("get_contract", contract_gid)?;
        self.contract
            .lock()
            .unwrap()
            .clone()
            .ok_or(AppError::NotFound)
    }

    async fn pause_contract(&self, _access_token: &str, contract_gid: &str) -> AppResult<()> {
        self.record("pause", contract_gid)
    }

    async fn resume_contract(&self, _access_token: &str, contract_gid: &str) -> AppResult<()> {
        self.record("resume", contract_gid)
    }

    async fn cancel_contract(&self, _access_token: &str, contract_gid: &str) -> AppResult<()> {
        self.record("cancel", contract_gid)
    }
}

// ============================================================================
// MockMirrorPort
// ============================================================================

#[derive(Default)]
pub struct MockMirrorPort {
    calls: Mutex<Vec<(&'static str, String)>>,
    failures: Mutex<HashMap<&'static str, String>>,
    upcoming_order: Mutex<Option<i64>>,
    last_frequency: Mutex<Option<(IntervalUnit, u32)>>,
    payment_methods: Mutex<Vec<MirrorPaymentMethod>>,
}

impl MockMirrorPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call to `method` fail upstream (consumed on use).
    pub fn fail_next(&self, method: &'static str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(method, message.to_string());
    }

    pub fn set_upcoming_order(&self, order_id: i64) {
        *self.upcoming_order.lock().unwrap() = Some(order_id);
    }

    pub fn set_payment_methods(&self, methods: Vec<MirrorPaymentMethod>) {
        *self.payment_methods.lock().unwrap() = methods;
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| *m == method)
            .count()
    }

    pub fn last_id(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(_, id)| id.clone())
    }

    pub fn last_frequency(&self) -> Option<(IntervalUnit, u32)> {
        *self.last_frequency.lock().unwrap()
    }

    fn record(&self, method: &'static str, id: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push((method, id.to_string()));
        match self.failures.lock().unwrap().remove(method) {
            Some(message) => Err(AppError::Upstream(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SubscriptionMirrorPort for MockMirrorPort {
    async fn pause(&self, mirror_id: &str) -> AppResult<()> {
        self.record("pause", mirror_id)
    }

    async fn resume(&self, mirror_id: &str) -> AppResult<()> {
        self.record("resume", mirror_id)
    }

    async fn cancel(
        &self,
        mirror_id: &str,
        _reason: Option<&str>,
        _comment: Option<&str>,
    ) -> AppResult<()> {
        self.record("cancel", mirror_id)
    }

    async fn get_upcoming_order(&self, mirror_id: &str) -> AppResult<Option<UpcomingOrder>> {
        self.record("get_upcoming_order", mirror_id)?;
        Ok(self
            .upcoming_order
            .lock()
            .unwrap()
            .map(|id| UpcomingOrder {
                id,
                scheduled_at: None,
            }))
    }

    async fn skip_order(&self, order_id: i64) -> AppResult<()> {
        self.record("skip_order", &order_id.to_string())
    }

    async fn skip_next(&self, mirror_id: &str) -> AppResult<()> {
        self.record("skip_next", mirror_id)
    }

    async fn change_frequency(
        &self,
        mirror_id: &str,
        unit: IntervalUnit,
        count: u32,
    ) -> AppResult<()> {
        self.record("change_frequency", mirror_id)?;
        *self.last_frequency.lock().unwrap() = Some((unit, count));
        Ok(())
    }

    async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> AppResult<Vec<MirrorPaymentMethod>> {
        self.record("list_payment_methods", customer_id)?;
        Ok(self.payment_methods.lock().unwrap().clone())
    }

    async fn send_payment_method_email(&self, payment_method_id: i64) -> AppResult<()> {
        self.record("send_payment_method_email", &payment_method_id.to_string())
    }
}
