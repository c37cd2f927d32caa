use {
    crate::{
        config::EmailConfig,
        domain::{
            error::CheckoutError,
            order::{Order, PaymentMethod},
            provider::{BoxFuture, EmailReceipt, Mailer},
        },
    },
    serde_json::json,
    std::time::Duration,
};

/// Transactional email over the Resend HTTP API. Bodies are plain-text
/// summaries; HTML templating lives with the storefront, not here.
pub struct ResendMailer {
    http: reqwest::Client,
    config: EmailConfig,
}

impl ResendMailer {
    pub fn new(config: EmailConfig) -> Result<Self, CheckoutError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CheckoutError::Config(format!("http client: {e}")))?;
        Ok(Self { http, config })
    }

    async fn send(&self, api_key: &str, to: &str, subject: &str, text: String) -> Result<(), CheckoutError> {
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&json!({
                "from": self.config.from,
                "to": to,
                "subject": subject,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| CheckoutError::Collaborator(format!("email request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Collaborator(format!(
                "email provider returned {status}: {body}"
            )));
        }
        Ok(())
    }

    async fn send_both(&self, order: &Order) -> Result<EmailReceipt, CheckoutError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(CheckoutError::Collaborator("RESEND_API_KEY not configured".into()));
        };
        let order_id = order.order_id();

        let customer_sent = match self
            .send(
                api_key,
                &order.customer().email,
                &format!("Confirmación de Pedido {order_id}"),
                customer_body(order),
            )
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "customer email failed");
                false
            }
        };

        let operator_sent = match self.config.notification_email.as_deref() {
            Some(operator) => match self
                .send(
                    api_key,
                    operator,
                    &format!("Nueva Orden: {order_id} - {}", order.customer().name),
                    operator_body(order),
                )
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(order_id = %order_id, error = %e, "operator email failed");
                    false
                }
            },
            None => {
                tracing::warn!("ORDER_NOTIFICATION_EMAIL not set, skipping operator email");
                false
            }
        };

        if !customer_sent && !operator_sent {
            return Err(CheckoutError::Collaborator("no order email could be sent".into()));
        }
        Ok(EmailReceipt {
            customer_sent,
            operator_sent,
        })
    }
}

impl Mailer for ResendMailer {
    fn send_order(&self, order: &Order) -> BoxFuture<'_, Result<EmailReceipt, CheckoutError>> {
        let order = order.clone();
        Box::pin(async move { self.send_both(&order).await })
    }
}

fn summary(order: &Order) -> String {
    let address = order.address();
    let mut lines = vec![
        format!("Número de orden: {}", order.order_id()),
        format!("Cantidad: {}", order.quantity()),
        format!("Color: {}", order.color()),
        format!("Subtotal: {}", order.subtotal().display_crc()),
        "Envío: GRATIS".to_string(),
        format!("Total: {}", order.total().display_crc()),
        String::new(),
        format!("Dirección: {}", address.line),
        format!("{}, {}, {}", address.district, address.canton, address.province),
    ];
    if let Some(comment) = order.comment() {
        lines.push(format!("Comentarios: {comment}"));
    }
    lines.join("\n")
}

fn customer_body(order: &Order) -> String {
    let payment = match order.payment_method() {
        PaymentMethod::BankTransfer => format!(
            "Para completar tu pedido realizá una transferencia SINPE Móvil por {} \
             e indicá el número de orden {} en la descripción.",
            order.total().display_crc(),
            order.order_id()
        ),
        PaymentMethod::Card => "Tu pago con tarjeta ha sido procesado exitosamente.".to_string(),
    };
    format!(
        "Hola {},\n\nGracias por tu pedido.\n\n{}\n\n{payment}\n",
        order.customer().name,
        summary(order)
    )
}

fn operator_body(order: &Order) -> String {
    let customer = order.customer();
    format!(
        "Nueva orden recibida.\n\nCliente: {}\nTeléfono: {}\nEmail: {}\nMétodo de pago: {}\nEstado: {}\n\n{}\n",
        customer.name,
        customer.phone,
        customer.email,
        order.payment_method(),
        order.payment_status(),
        summary(order)
    )
}
