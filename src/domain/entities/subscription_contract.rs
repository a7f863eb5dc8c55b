use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized subscription status shared by both backing systems.
///
/// Shopify and Loop use slightly different vocabularies ("ACTIVE",
/// "canceled", ...); everything is lower-cased and mapped at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    pub fn from_provider(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "active" => Some(SubscriptionStatus::Active),
            "paused" => Some(SubscriptionStatus::Paused),
            "cancelled" | "canceled" => Some(SubscriptionStatus::Cancelled),
            "expired" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Week,
    Month,
}

impl IntervalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Week => "week",
            IntervalUnit::Month => "month",
        }
    }
}

/// How often the subscription delivers, e.g. every 2 months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInterval {
    pub value: u32,
    pub unit: IntervalUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractLineItem {
    pub title: String,
    pub quantity: u32,
    pub price: Option<Money>,
}

/// A subscription contract as the storefront sees it. The commerce platform
/// is authoritative for every field here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionContract {
    /// Canonical ID: `gid://shopify/SubscriptionContract/<n>`.
    pub id: String,
    pub status: SubscriptionStatus,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub delivery_interval: Option<DeliveryInterval>,
    pub line_items: Vec<ContractLineItem>,
    pub current_price: Option<Money>,
}

/// Coarse plan identifiers sold on the site, mapped to a concrete billing
/// frequency for the mirror system's frequency-change call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Starter,
    Pro,
    Max,
}

impl Plan {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "starter" => Some(Plan::Starter),
            "pro" => Some(Plan::Pro),
            "max" => Some(Plan::Max),
            _ => None,
        }
    }

    pub fn delivery_interval(&self) -> DeliveryInterval {
        match self {
            Plan::Starter => DeliveryInterval {
                value: 3,
                unit: IntervalUnit::Month,
            },
            Plan::Pro => DeliveryInterval {
                value: 2,
                unit: IntervalUnit::Month,
            },
            Plan::Max => DeliveryInterval {
                value: 1,
                unit: IntervalUnit::Month,
            },
        }
    }
}
