pub mod app_error;
pub mod id_token;
pub mod ports;
pub mod use_cases;
