//! REST client for the Loop Subscriptions admin API (the mirror system).

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::mirror::{MirrorPaymentMethod, SubscriptionMirrorPort, UpcomingOrder},
    domain::entities::subscription_contract::IntervalUnit,
    infra::http_client,
};

use async_trait::async_trait;

pub struct LoopClient {
    client: Client,
    base: Url,
    api_key: SecretString,
}

impl LoopClient {
    pub fn new(base: Url, api_key: SecretString) -> Self {
        Self {
            client: http_client::build_client(),
            base,
            api_key,
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        // The base URL carries a path prefix (/admin/v2), so joins must stay
        // relative.
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .expect("Loop base URL cannot be a base");
            segments.pop_if_empty();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        url
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> AppResult<serde_json::Value> {
        let response = self
            .client
            .post(self.endpoint(path))
            .header("X-Loop-Token", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Loop request failed: {e}")))?;

        Self::read_json(response).await
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> AppResult<serde_json::Value> {
        let mut url = self.endpoint(path);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let response = self
            .client
            .get(url)
            .header("X-Loop-Token", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Loop request failed: {e}")))?;

        Self::read_json(response).await
    }

    async fn read_json(response: reqwest::Response) -> AppResult<serde_json::Value> {
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(AppError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Loop returned {status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Loop response: {e}")))
    }
}

#[async_trait]
impl SubscriptionMirrorPort for LoopClient {
    async fn pause(&self, mirror_id: &str) -> AppResult<()> {
        self.post(&format!("subscriptions/{mirror_id}/pause"), json!({}))
            .await
            .map(|_| ())
    }

    async fn resume(&self, mirror_id: &str) -> AppResult<()> {
        self.post(&format!("subscriptions/{mirror_id}/resume"), json!({}))
            .await
            .map(|_| ())
    }

    async fn cancel(
        &self,
        mirror_id: &str,
        reason: Option<&str>,
        comment: Option<&str>,
    ) -> AppResult<()> {
        self.post(
            &format!("subscriptions/{mirror_id}/cancel"),
            json!({
                "cancellationReason": reason,
                "cancellationComment": comment,
            }),
        )
        .await
        .map(|_| ())
    }

    async fn get_upcoming_order(&self, mirror_id: &str) -> AppResult<Option<UpcomingOrder>> {
        let value = match self
            .get(
                &format!("subscriptions/{mirror_id}/orders"),
                &[("status", "upcoming")],
            )
            .await
        {
            Ok(value) => value,
            Err(AppError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };

        let orders: WireOrderList = serde_json::from_value(value)
            .map_err(|e| AppError::Upstream(format!("Malformed Loop order schedule: {e}")))?;

        Ok(orders
            .data
            .into_iter()
            .next()
            .map(|o| UpcomingOrder {
                id: o.id,
                scheduled_at: o.scheduled_at,
            }))
    }

    async fn skip_order(&self, order_id: i64) -> AppResult<()> {
        self.post(&format!("orders/{order_id}/skip"), json!({}))
            .await
            .map(|_| ())
    }

    async fn skip_next(&self, mirror_id: &str) -> AppResult<()> {
        self.post(&format!("subscriptions/{mirror_id}/skip"), json!({}))
            .await
            .map(|_| ())
    }

    async fn change_frequency(
        &self,
        mirror_id: &str,
        unit: IntervalUnit,
        count: u32,
    ) -> AppResult<()> {
        self.post(
            &format!("subscriptions/{mirror_id}/frequency"),
            json!({
                "deliveryIntervalUnit": unit.as_str(),
                "deliveryIntervalCount": count,
            }),
        )
        .await
        .map(|_| ())
    }

    async fn list_payment_methods(
        &self,
        customer_id: &str,
    ) -> AppResult<Vec<MirrorPaymentMethod>> {
        let value = self
            .get(&format!("customers/shopify-{customer_id}/payment-methods"), &[])
            .await?;

        let list: WirePaymentMethodList = serde_json::from_value(value)
            .map_err(|e| AppError::Upstream(format!("Malformed Loop payment methods: {e}")))?;

        Ok(list
            .data
            .into_iter()
            .map(|m| MirrorPaymentMethod {
                id: m.id,
                brand: m.brand.unwrap_or_else(|| "card".to_string()),
                last_digits: m.last_digits.unwrap_or_default(),
                expiry_month: m.expiry_month,
                expiry_year: m.expiry_year,
            })
            .collect())
    }

    async fn send_payment_method_email(&self, payment_method_id: i64) -> AppResult<()> {
        self.post(
            &format!("payment-methods/{payment_method_id}/update-email"),
            json!({}),
        )
        .await
        .map(|_| ())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Deserialize)]
struct WireOrderList {
    #[serde(default)]
    data: Vec<WireOrder>,
}

#[derive(Deserialize)]
struct WireOrder {
    id: i64,
    #[serde(rename = "scheduledAt", default)]
    scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize)]
struct WirePaymentMethodList {
    #[serde(default)]
    data: Vec<WirePaymentMethod>,
}

#[derive(Deserialize)]
struct WirePaymentMethod {
    id: i64,
    #[serde(default)]
    brand: Option<String>,
    #[serde(rename = "lastDigits", default)]
    last_digits: Option<String>,
    #[serde(rename = "expiryMonth")]
    expiry_month: u32,
    #[serde(rename = "expiryYear")]
    expiry_year: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_preserves_base_path_prefix() {
        let client = LoopClient::new(
            "https://api.loopsubscriptions.com/admin/v2".parse().unwrap(),
            SecretString::new("key".into()),
        );
        assert_eq!(
            client.endpoint("subscriptions/shopify-42/pause").as_str(),
            "https://api.loopsubscriptions.com/admin/v2/subscriptions/shopify-42/pause"
        );
    }

    #[test]
    fn payment_method_wire_shape_parses() {
        let list: WirePaymentMethodList = serde_json::from_value(serde_json::json!({
            "data": [
                { "id": 1, "brand": "visa", "lastDigits": "4242",
                  "expiryMonth": 6, "expiryYear": 25 },
                { "id": 2, "expiryMonth": 12, "expiryYear": 2030 }
            ]
        }))
        .unwrap();
        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[0].expiry_year, 25);
        assert!(list.data[1].brand.is_none());
    }
}
