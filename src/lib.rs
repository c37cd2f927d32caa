pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;

use {
    adapters::{betsy::BetsyClient, resend::ResendMailer, tilopay::TilopayGateway},
    config::AppConfig,
    domain::{
        error::CheckoutError,
        provider::{CrmClient, Mailer, PaymentGateway},
        store::{DedupLedger, OrderStore},
    },
    infra::memory::{InMemoryDedupLedger, InMemoryOrderStore},
    services::{
        crm_sync::{CrmRetryPolicy, CrmSync},
        fulfillment::Fulfillment,
        intake::OrderIntake,
        reconciliation::Reconciler,
    },
    std::sync::Arc,
};

pub use adapters::router::router;

#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<OrderIntake>,
    pub reconciler: Arc<Reconciler>,
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    /// Wire the services over whatever collaborators and stores the caller
    /// hands in. Intake and reconciliation share the same store.
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        crm: Arc<CrmSync>,
        store: Arc<dyn OrderStore>,
        ledger: Arc<dyn DedupLedger>,
        webhook_secret: Option<&str>,
    ) -> Self {
        let fulfillment = Arc::new(Fulfillment::new(mailer, crm));
        Self {
            intake: Arc::new(OrderIntake::new(
                gateway,
                Arc::clone(&store),
                Arc::clone(&fulfillment),
            )),
            reconciler: Arc::new(Reconciler::new(store, ledger, fulfillment)),
            webhook_secret: webhook_secret.filter(|s| !s.is_empty()).map(Arc::from),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CheckoutError> {
        let gateway = TilopayGateway::new(
            config.gateway.clone(),
            config.app_url.clone(),
            config.product_name.clone(),
        )?;
        let mailer = ResendMailer::new(config.email.clone())?;
        let crm_client: Arc<dyn CrmClient> =
            Arc::new(BetsyClient::new(&config.crm, config.product_name.clone())?);
        let crm = CrmSync::new(
            crm_client,
            CrmRetryPolicy::for_crm(config.crm.max_attempts, config.crm.base_delay),
            config.crm.call_timeout,
        );

        Ok(Self::new(
            Arc::new(gateway),
            Arc::new(mailer),
            Arc::new(crm),
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(InMemoryDedupLedger::new()),
            config.webhook_secret.as_deref(),
        ))
    }
}
