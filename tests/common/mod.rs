#![allow(dead_code)]

use checkout_sync::AppState;
use checkout_sync::domain::error::{CheckoutError, CrmError};
use checkout_sync::domain::id::{OrderId, TransactionId};
use checkout_sync::domain::order::{CheckoutSubmission, Order, PaymentMethod};
use checkout_sync::domain::outcome::GatewayCode;
use checkout_sync::domain::provider::{
    BoxFuture, CrmClient, CrmRecord, EmailReceipt, Mailer, PaymentGateway, PaymentLink,
};
use checkout_sync::domain::return_data;
use checkout_sync::infra::memory::{InMemoryDedupLedger, InMemoryOrderStore};
use checkout_sync::services::crm_sync::{CrmRetryPolicy, CrmSync};
use checkout_sync::services::reconciliation::Confirmation;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

pub const WEBHOOK_SECRET: &str = "abc123";

// ── Fakes ──────────────────────────────────────────────────────────────────

/// Records every order it is asked to mail.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Order>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Order> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Mailer for RecordingMailer {
    fn send_order(&self, order: &Order) -> BoxFuture<'_, Result<EmailReceipt, CheckoutError>> {
        self.sent.lock().unwrap().push(order.clone());
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(CheckoutError::Collaborator("smtp down".into()))
            } else {
                Ok(EmailReceipt {
                    customer_sent: true,
                    operator_sent: true,
                })
            }
        })
    }
}

/// Replays a fixed list of results, then succeeds forever.
#[derive(Default)]
pub struct ScriptedCrm {
    script: Mutex<VecDeque<Result<CrmRecord, CrmError>>>,
    calls: AtomicU32,
    delay: Option<Duration>,
}

impl ScriptedCrm {
    pub fn new(script: Vec<Result<CrmRecord, CrmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
            delay: None,
        }
    }

    /// Every call takes `delay` before answering.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CrmClient for ScriptedCrm {
    fn push_order(&self, _order: &Order) -> BoxFuture<'_, Result<CrmRecord, CrmError>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let next = self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(CrmRecord {
                id: Some(format!("crm_{n}")),
            })
        });
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            next
        })
    }
}

pub fn crm_ok(id: &str) -> Result<CrmRecord, CrmError> {
    Ok(CrmRecord {
        id: Some(id.to_string()),
    })
}

pub fn crm_status(status: u16) -> Result<CrmRecord, CrmError> {
    Err(CrmError::Status {
        status,
        body: format!("status {status}"),
    })
}

/// Hands out a fixed payment page, or fails when built with `failing`.
#[derive(Default)]
pub struct FakeGateway {
    links: Mutex<Vec<Order>>,
    fail: bool,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            links: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn requested(&self) -> Vec<Order> {
        self.links.lock().unwrap().clone()
    }
}

impl PaymentGateway for FakeGateway {
    fn create_payment_link(&self, order: &Order) -> BoxFuture<'_, Result<PaymentLink, CheckoutError>> {
        self.links.lock().unwrap().push(order.clone());
        let fail = self.fail;
        let order_id = order.order_id().clone();
        Box::pin(async move {
            if fail {
                return Err(CheckoutError::Gateway("Failed to authenticate with Tilopay".into()));
            }
            Ok(PaymentLink {
                payment_url: format!("https://pay.example/{order_id}"),
                transaction_id: TransactionId::new("tx_fake"),
            })
        })
    }
}

// ── Builders ───────────────────────────────────────────────────────────────

pub fn make_submission(quantity: serde_json::Value) -> CheckoutSubmission {
    CheckoutSubmission {
        name: Some("Ana Mora Solís".into()),
        phone: Some("8888-1234".into()),
        email: Some("ana@example.com".into()),
        province: Some("Heredia".into()),
        canton: Some("Belén".into()),
        district: Some("San Antonio".into()),
        address: Some("200 m norte de la iglesia".into()),
        quantity: Some(quantity),
        color: Some("Negro".into()),
        comment: None,
    }
}

pub fn submission_json(quantity: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "nombre": "Ana Mora Solís",
        "telefono": "8888-1234",
        "email": "ana@example.com",
        "provincia": "Heredia",
        "canton": "Belén",
        "distrito": "San Antonio",
        "direccion": "200 m norte de la iglesia",
        "cantidad": quantity,
        "color": "Negro",
    })
}

/// A pending card order for `id`, priced for `quantity` units.
pub fn make_order(id: &str, quantity: i64) -> Order {
    Order::from_submission(
        &make_submission(serde_json::json!(quantity)),
        PaymentMethod::Card,
        OrderId::new(id).unwrap(),
        Utc::now(),
    )
    .unwrap()
}

pub fn encoded(order: &Order) -> String {
    return_data::encode(order).unwrap()
}

pub fn confirmation(order: &Order, txn: &str, code: Option<&str>) -> Confirmation {
    Confirmation {
        order_id: order.order_id().clone(),
        transaction_id: TransactionId::new(txn),
        code: code.map(GatewayCode::new),
        return_data: Some(encoded(order)),
    }
}

/// Fast CRM retries so tests that await the CRM task stay quick.
pub fn quick_crm(client: Arc<ScriptedCrm>) -> Arc<CrmSync> {
    Arc::new(CrmSync::new(
        client,
        CrmRetryPolicy::for_crm(3, Duration::from_millis(1)),
        Duration::from_secs(1),
    ))
}

pub struct Harness {
    pub state: AppState,
    pub store: Arc<InMemoryOrderStore>,
    pub ledger: Arc<InMemoryDedupLedger>,
    pub mailer: Arc<RecordingMailer>,
    pub crm: Arc<ScriptedCrm>,
    pub gateway: Arc<FakeGateway>,
}

pub struct HarnessBuilder {
    mailer: RecordingMailer,
    crm: ScriptedCrm,
    gateway: FakeGateway,
    secret: Option<&'static str>,
}

impl HarnessBuilder {
    pub fn mailer(mut self, mailer: RecordingMailer) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn crm(mut self, crm: ScriptedCrm) -> Self {
        self.crm = crm;
        self
    }

    pub fn gateway(mut self, gateway: FakeGateway) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn secret(mut self, secret: &'static str) -> Self {
        self.secret = Some(secret);
        self
    }

    pub fn build(self) -> Harness {
        let store = Arc::new(InMemoryOrderStore::new());
        let ledger = Arc::new(InMemoryDedupLedger::new());
        let mailer = Arc::new(self.mailer);
        let crm = Arc::new(self.crm);
        let gateway = Arc::new(self.gateway);

        let state = AppState::new(
            gateway.clone(),
            mailer.clone(),
            quick_crm(crm.clone()),
            store.clone(),
            ledger.clone(),
            self.secret,
        );
        Harness {
            state,
            store,
            ledger,
            mailer,
            crm,
            gateway,
        }
    }
}

pub fn harness() -> HarnessBuilder {
    HarnessBuilder {
        mailer: RecordingMailer::default(),
        crm: ScriptedCrm::default(),
        gateway: FakeGateway::default(),
        secret: None,
    }
}
