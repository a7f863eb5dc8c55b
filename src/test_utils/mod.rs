pub mod app_state_builder;
pub mod mocks;
pub mod tokens;

pub use app_state_builder::{TestAppStateBuilder, test_config};
pub use mocks::{MockCommercePort, MockIdentityPort, MockMirrorPort};
pub use tokens::{forge_id_token, test_token_set};
