use {
    crate::{
        adapters::first_text,
        config::CrmConfig,
        domain::{
            error::{CheckoutError, CrmError},
            order::{Order, PaymentMethod, PaymentStatus},
            pricing,
            provider::{BoxFuture, CrmClient, CrmRecord},
        },
    },
    chrono::{DateTime, FixedOffset, Utc},
    serde_json::{Value, json},
};

const COURIER: &str = "Correos de Costa Rica";
const DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Costa Rica has no DST: UTC-6 all year.
fn costa_rica_time(at: DateTime<Utc>) -> String {
    match FixedOffset::west_opt(6 * 3600) {
        Some(offset) => at.with_timezone(&offset).format(DATE_FORMAT).to_string(),
        None => at.format(DATE_FORMAT).to_string(),
    }
}

/// CRM ingestion endpoint, one POST per order.
pub struct BetsyClient {
    http: reqwest::Client,
    url: Option<String>,
    api_key: Option<String>,
    product_name: String,
}

impl BetsyClient {
    pub fn new(config: &CrmConfig, product_name: impl Into<String>) -> Result<Self, CheckoutError> {
        // The retrier applies its own per-call timeout; this one is a backstop.
        let http = reqwest::Client::builder()
            .timeout(config.call_timeout)
            .build()
            .map_err(|e| CheckoutError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            product_name: product_name.into(),
        })
    }

    async fn push(&self, order: &Order) -> Result<CrmRecord, CrmError> {
        let (Some(url), Some(api_key)) = (&self.url, &self.api_key) else {
            tracing::warn!("CRM credentials not configured, skipping sync");
            return Err(CrmError::NotConfigured);
        };

        let response = self
            .http
            .post(url)
            .header("x-api-key", api_key)
            .json(&crm_payload(order, &self.product_name))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CrmError::Transport(format!("unreadable CRM response: {e}")))?;
        Ok(CrmRecord {
            id: first_text(&body, &["crmOrderId", "id"]),
        })
    }
}

impl CrmClient for BetsyClient {
    fn push_order(&self, order: &Order) -> BoxFuture<'_, Result<CrmRecord, CrmError>> {
        let order = order.clone();
        Box::pin(async move { self.push(&order).await })
    }
}

fn classify_transport(err: reqwest::Error) -> CrmError {
    if err.is_timeout() {
        CrmError::Timeout
    } else if err.is_connect() {
        CrmError::Connect(err.to_string())
    } else {
        CrmError::Transport(err.to_string())
    }
}

fn payment_comment(order: &Order) -> String {
    let transaction = order
        .transaction_id()
        .map(|t| t.as_str())
        .unwrap_or("PENDING");
    match (order.payment_method(), order.payment_status()) {
        (PaymentMethod::BankTransfer, _) => {
            "Pago: SINPE Móvil - Estado: Pendiente de confirmación".to_string()
        }
        (PaymentMethod::Card, PaymentStatus::Completed) => {
            format!("Pago: Tarjeta (Tilopay) - Estado: PAGADO - ID Transacción: {transaction}")
        }
        (PaymentMethod::Card, PaymentStatus::Failed) => {
            "Pago: Tarjeta (Tilopay) - Estado: RECHAZADO".to_string()
        }
        (PaymentMethod::Card, PaymentStatus::Pending) => {
            "Pago: Tarjeta (Tilopay) - Estado: Pendiente".to_string()
        }
    }
}

fn status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Completed => "PAGADO",
        PaymentStatus::Pending => "PENDIENTE",
        PaymentStatus::Failed => "RECHAZADO",
    }
}

/// Map an order onto the CRM's order document.
pub fn crm_payload(order: &Order, product_name: &str) -> Value {
    let customer = order.customer();
    let address = order.address();
    let comments = match order.comment() {
        Some(comment) => format!(
            "{}\n\nComentarios del cliente: {comment}",
            payment_comment(order)
        ),
        None => payment_comment(order),
    };
    let method = match order.payment_method() {
        PaymentMethod::BankTransfer => "SINPE",
        PaymentMethod::Card => "Tilopay",
    };

    json!({
        "orderId": order.order_id(),
        "customer": {
            "name": customer.name,
            "phone": customer.phone,
            "email": customer.email,
        },
        "product": {
            "name": product_name,
            "quantity": order.quantity(),
            "unitPrice": pricing::resolve(1).subtotal.display_crc(),
            "color": order.color(),
        },
        "shipping": {
            "cost": "GRATIS",
            "courier": COURIER,
            "address": {
                "province": address.province,
                "canton": address.canton,
                "district": address.district,
                "fullAddress": address.line,
            },
        },
        "total": order.total().display_crc(),
        "payment": {
            "method": method,
            "transactionId": order.transaction_id().map(|t| t.as_str()).unwrap_or("PENDING"),
            "status": status_label(order.payment_status()),
            "date": costa_rica_time(order.paid_at().unwrap_or_else(Utc::now)),
        },
        "source": "DeepClean Website",
        "salesChannel": "Website",
        "seller": "Website",
        "metadata": {
            "comments": comments,
            "createdAt": order.created_at().to_rfc3339(),
        },
    })
}
