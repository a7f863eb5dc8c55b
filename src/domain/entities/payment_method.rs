use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days before end-of-expiry-month at which a card starts counting as
/// "expiring soon".
const EXPIRY_WARNING_DAYS: i64 = 60;

/// Derived card health, ordered for display (safe first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Safe,
    ExpiringSoon,
    Expired,
}

impl CardStatus {
    /// Sort rank: safe → expiring_soon → expired.
    pub fn rank(&self) -> u8 {
        match self {
            CardStatus::Safe => 0,
            CardStatus::ExpiringSoon => 1,
            CardStatus::Expired => 2,
        }
    }
}

/// A customer's stored card, mirrored read-only from Loop. Updates happen
/// through an emailed self-service link, never through this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: i64,
    pub brand: String,
    pub last_digits: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub status: CardStatus,
}

/// Providers report expiry years in 2- or 4-digit form; years under 100 are
/// treated as 2000+year.
pub fn normalize_expiry_year(year: i32) -> i32 {
    if year < 100 { 2000 + year } else { year }
}

/// Last calendar day of the card's expiry month.
fn end_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).map(|d| d.pred_opt().unwrap())
}

/// Derives card status from today's date versus end-of-expiry-month.
///
/// An unparseable month/year counts as expired.
pub fn derive_card_status(expiry_month: u32, expiry_year: i32, today: NaiveDate) -> CardStatus {
    let year = normalize_expiry_year(expiry_year);
    let Some(last_valid_day) = end_of_month(year, expiry_month) else {
        return CardStatus::Expired;
    };

    if today > last_valid_day {
        return CardStatus::Expired;
    }

    let days_left = (last_valid_day - today).num_days();
    if days_left <= EXPIRY_WARNING_DAYS {
        CardStatus::ExpiringSoon
    } else {
        CardStatus::Safe
    }
}

impl PaymentMethod {
    pub fn with_derived_status(
        id: i64,
        brand: String,
        last_digits: String,
        expiry_month: u32,
        expiry_year: i32,
        today: NaiveDate,
    ) -> Self {
        let expiry_year = normalize_expiry_year(expiry_year);
        let status = derive_card_status(expiry_month, expiry_year, today);
        Self {
            id,
            brand,
            last_digits,
            expiry_month,
            expiry_year,
            status,
        }
    }
}
