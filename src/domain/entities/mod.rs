pub mod contract_id;
pub mod customer;
pub mod payment_method;
pub mod subscription_contract;
