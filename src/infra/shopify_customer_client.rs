//! GraphQL client for the Customer Account API subscription surface.
//!
//! Responses are parsed into typed structs right here at the edge; nothing
//! downstream sees raw JSON. Mutation `userErrors` become `InvalidInput`
//! with the platform's own user-facing message; transport and HTTP-level
//! failures become `Upstream`.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::commerce::CommerceSubscriptionsPort,
    domain::entities::subscription_contract::{
        ContractLineItem, DeliveryInterval, IntervalUnit, Money, SubscriptionContract,
        SubscriptionStatus,
    },
    infra::http_client,
};

use async_trait::async_trait;

const CONTRACT_QUERY: &str = r#"
query SubscriptionContract($id: ID!) {
  customer {
    subscriptionContract(id: $id) {
      id
      status
      nextBillingDate
      deliveryPolicy { interval intervalCount { count } }
      lines(first: 10) {
        nodes {
          name
          quantity
          currentPrice { amount currencyCode }
        }
      }
    }
  }
}
"#;

const PAUSE_MUTATION: &str = r#"
mutation SubscriptionContractPause($subscriptionContractId: ID!) {
  subscriptionContractPause(subscriptionContractId: $subscriptionContractId) {
    contract { id status }
    userErrors { field message }
  }
}
"#;

const ACTIVATE_MUTATION: &str = r#"
mutation SubscriptionContractActivate($subscriptionContractId: ID!) {
  subscriptionContractActivate(subscriptionContractId: $subscriptionContractId) {
    contract { id status }
    userErrors { field message }
  }
}
"#;

const CANCEL_MUTATION: &str = r#"
mutation SubscriptionContractCancel($subscriptionContractId: ID!) {
  subscriptionContractCancel(subscriptionContractId: $subscriptionContractId) {
    contract { id status }
    userErrors { field message }
  }
}
"#;

pub struct ShopifyCustomerClient {
    client: Client,
    graphql_endpoint: Url,
}

impl ShopifyCustomerClient {
    pub fn new(api_origin: &Url, shop_id: &str, api_version: &str) -> Self {
        let graphql_endpoint = api_origin
            .join(&format!(
                "{shop_id}/account/customer/api/{api_version}/graphql"
            ))
            .expect("customer API origin is a valid base URL");
        Self {
            client: http_client::build_client(),
            graphql_endpoint,
        }
    }

    async fn execute<T: for<'de> Deserialize<'de>>(
        &self,
        access_token: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> AppResult<T> {
        let response = self
            .client
            .post(self.graphql_endpoint.clone())
            .header("Authorization", access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Customer Account API request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Customer Account API returned {status}: {body}"
            )));
        }

        let envelope: GraphQlEnvelope<T> = response.json().await.map_err(|e| {
            AppError::Upstream(format!("Failed to parse Customer Account API response: {e}"))
        })?;

        if let Some(errors) = envelope.errors {
            if let Some(first) = errors.first() {
                return Err(AppError::Upstream(format!(
                    "Customer Account API error: {}",
                    first.message
                )));
            }
        }

        envelope
            .data
            .ok_or_else(|| AppError::Upstream("Customer Account API returned no data".into()))
    }

    async fn mutate_contract(
        &self,
        access_token: &str,
        mutation: &str,
        field: &str,
        contract_gid: &str,
    ) -> AppResult<()> {
        let data: serde_json::Value = self
            .execute(
                access_token,
                mutation,
                json!({ "subscriptionContractId": contract_gid }),
            )
            .await?;

        let payload: MutationPayload = serde_json::from_value(
            data.get(field)
                .cloned()
                .unwrap_or(serde_json::Value::Null),
        )
        .map_err(|e| AppError::Upstream(format!("Malformed {field} payload: {e}")))?;

        if let Some(first) = payload.user_errors.first() {
            // userErrors are written for customers; safe to pass through.
            return Err(AppError::InvalidInput(first.message.clone()));
        }

        Ok(())
    }
}

#[async_trait]
impl CommerceSubscriptionsPort for ShopifyCustomerClient {
    async fn get_contract(
        &self,
        access_token: &str,
        contract_gid: &str,
    ) -> AppResult<SubscriptionContract> {
        let data: ContractQueryData = self
            .execute(access_token, CONTRACT_QUERY, json!({ "id": contract_gid }))
            .await?;

        let contract = data
            .customer
            .and_then(|c| c.subscription_contract)
            .ok_or(AppError::NotFound)?;

        Ok(contract.into_domain())
    }

    async fn pause_contract(&self, access_token: &str, contract_gid: &str) -> AppResult<()> {
        self.mutate_contract(
            access_token,
            PAUSE_MUTATION,
            "subscriptionContractPause",
            contract_gid,
        )
        .await
    }

    async fn resume_contract(&self, access_token: &str, contract_gid: &str) -> AppResult<()> {
        self.mutate_contract(
            access_token,
            ACTIVATE_MUTATION,
            "subscriptionContractActivate",
            contract_gid,
        )
        .await
    }

    async fn cancel_contract(&self, access_token: &str, contract_gid: &str) -> AppResult<()> {
        self.mutate_contract(
            access_token,
            CANCEL_MUTATION,
            "subscriptionContractCancel",
            contract_gid,
        )
        .await
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Deserialize)]
struct GraphQlEnvelope<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct MutationPayload {
    #[serde(rename = "userErrors", default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
struct UserError {
    message: String,
}

#[derive(Deserialize)]
struct ContractQueryData {
    customer: Option<CustomerField>,
}

#[derive(Deserialize)]
struct CustomerField {
    #[serde(rename = "subscriptionContract")]
    subscription_contract: Option<WireContract>,
}

#[derive(Deserialize)]
struct WireContract {
    id: String,
    status: String,
    #[serde(rename = "nextBillingDate")]
    next_billing_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "deliveryPolicy")]
    delivery_policy: Option<WireDeliveryPolicy>,
    lines: Option<WireLines>,
}

#[derive(Deserialize)]
struct WireDeliveryPolicy {
    interval: String,
    #[serde(rename = "intervalCount")]
    interval_count: Option<WireIntervalCount>,
}

#[derive(Deserialize)]
struct WireIntervalCount {
    count: u32,
}

#[derive(Deserialize)]
struct WireLines {
    nodes: Vec<WireLine>,
}

#[derive(Deserialize)]
struct WireLine {
    name: String,
    quantity: u32,
    #[serde(rename = "currentPrice")]
    current_price: Option<WireMoney>,
}

#[derive(Deserialize)]
struct WireMoney {
    amount: String,
    #[serde(rename = "currencyCode")]
    currency_code: String,
}

impl WireContract {
    fn into_domain(self) -> SubscriptionContract {
        // Platform vocabulary is upper-case; anything unknown reads as
        // expired rather than active (fail conservative).
        let status =
            SubscriptionStatus::from_provider(&self.status).unwrap_or(SubscriptionStatus::Expired);

        let delivery_interval = self.delivery_policy.and_then(|p| {
            let unit = match p.interval.to_ascii_lowercase().as_str() {
                "week" => Some(IntervalUnit::Week),
                "month" => Some(IntervalUnit::Month),
                _ => None,
            }?;
            Some(DeliveryInterval {
                value: p.interval_count.map(|c| c.count).unwrap_or(1),
                unit,
            })
        });

        let line_items: Vec<ContractLineItem> = self
            .lines
            .map(|l| l.nodes)
            .unwrap_or_default()
            .into_iter()
            .map(|line| ContractLineItem {
                title: line.name,
                quantity: line.quantity,
                price: line.current_price.map(|m| Money {
                    amount: m.amount,
                    currency_code: m.currency_code,
                }),
            })
            .collect();

        let current_price = line_items.first().and_then(|l| l.price.clone());

        SubscriptionContract {
            id: self.id,
            status,
            next_billing_date: self.next_billing_date,
            delivery_interval,
            line_items,
            current_price,
        }
    }
}
