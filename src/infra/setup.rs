use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    application::ports::{
        commerce::CommerceSubscriptionsPort, identity::IdentityPort,
        mirror::SubscriptionMirrorPort,
    },
    application::use_cases::{
        customer_auth::CustomerAuthUseCases, subscriptions::SubscriptionUseCases,
    },
    infra::{
        config::AppConfig, loop_client::LoopClient,
        shopify_customer_client::ShopifyCustomerClient, shopify_identity::ShopifyIdentityClient,
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    // Shop/client configuration is optional at startup: without it, auth and
    // subscription routes answer with CONFIG_ERROR instead of the process
    // refusing to boot.
    let (auth, subscriptions) = match (&config.shop_id, &config.client_id) {
        (Some(shop_id), Some(client_id)) => {
            let identity: Arc<dyn IdentityPort> = Arc::new(ShopifyIdentityClient::new(
                &config.identity_origin,
                shop_id,
                client_id.clone(),
            ));

            let commerce: Arc<dyn CommerceSubscriptionsPort> = Arc::new(
                ShopifyCustomerClient::new(
                    &config.customer_api_origin,
                    shop_id,
                    &config.customer_api_version,
                ),
            );

            let mirror: Option<Arc<dyn SubscriptionMirrorPort>> =
                config.loop_api_key.clone().map(|key| {
                    Arc::new(LoopClient::new(config.loop_api_base.clone(), key))
                        as Arc<dyn SubscriptionMirrorPort>
                });
            if mirror.is_none() {
                tracing::warn!(
                    "LOOP_API_KEY not set; mirror writes and mirror-only operations disabled"
                );
            }

            (
                Some(Arc::new(CustomerAuthUseCases::new(identity))),
                Some(Arc::new(SubscriptionUseCases::new(commerce, mirror))),
            )
        }
        _ => {
            tracing::warn!(
                "SHOPIFY_SHOP_ID / SHOPIFY_CUSTOMER_CLIENT_ID not set; customer accounts disabled"
            );
            (None, None)
        }
    };

    Ok(AppState {
        config: Arc::new(config),
        auth,
        subscriptions,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "conka_accounts=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
