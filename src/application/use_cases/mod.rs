pub mod customer_auth;
pub mod subscriptions;
