use {
    crate::{
        adapters::first_text,
        config::GatewayConfig,
        domain::{
            error::CheckoutError,
            id::TransactionId,
            order::Order,
            provider::{BoxFuture, PaymentGateway, PaymentLink},
            return_data,
        },
    },
    serde::Deserialize,
    serde_json::json,
};

const CURRENCY: &str = "CRC";

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Hosted-payment gateway over HTTP: bearer login, then `processPayment`.
pub struct TilopayGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    app_url: String,
    product_name: String,
}

impl TilopayGateway {
    pub fn new(
        config: GatewayConfig,
        app_url: impl Into<String>,
        product_name: impl Into<String>,
    ) -> Result<Self, CheckoutError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CheckoutError::Config(format!("http client: {e}")))?;
        Ok(Self {
            http,
            config,
            app_url: app_url.into(),
            product_name: product_name.into(),
        })
    }

    async fn authenticate(&self) -> Result<String, CheckoutError> {
        let (Some(user), Some(password)) = (&self.config.user, &self.config.password) else {
            return Err(CheckoutError::Gateway("Tilopay credentials not configured".into()));
        };

        let response = self
            .http
            .post(format!("{}/login", self.config.base_url))
            .json(&json!({ "apiuser": user, "password": password }))
            .send()
            .await
            .map_err(|e| CheckoutError::Gateway(format!("login request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "gateway login rejected");
            return Err(CheckoutError::Gateway("Failed to authenticate with Tilopay".into()));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| CheckoutError::Gateway(format!("unreadable login response: {e}")))?;
        Ok(login.access_token)
    }

    fn payment_request(&self, order: &Order, api_key: &str) -> Result<serde_json::Value, CheckoutError> {
        let customer = order.customer();
        let address = order.address();
        let (first_name, last_name) = split_name(&customer.name);

        Ok(json!({
            "key": api_key,
            "amount": order.total().colones(),
            "currency": CURRENCY,
            "description": format!("{} x{} - Orden #{}", self.product_name, order.quantity(), order.order_id()),
            "redirect": format!("{}/success.html", self.app_url),
            "notification_url": format!("{}/api/tilopay/webhook", self.app_url),
            "hashVersion": "V2",
            "billToFirstName": first_name,
            "billToLastName": last_name,
            "billToAddress": address.line,
            "billToAddress2": format!("{}, {}", address.district, address.canton),
            "billToCity": address.canton,
            "billToState": province_code(&address.province),
            "billToZipPostCode": "10101",
            "billToCountry": "CR",
            "billToTelephone": customer.phone,
            "billToEmail": customer.email,
            "orderNumber": order.order_id(),
            "capture": "1",
            "subscription": "0",
            "returnData": return_data::encode(order)?,
        }))
    }

    async fn create_link(&self, order: &Order) -> Result<PaymentLink, CheckoutError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| CheckoutError::Gateway("TILOPAY_API_KEY not configured".into()))?;
        let token = self.authenticate().await?;
        let payload = self.payment_request(order, api_key)?;

        let response = self
            .http
            .post(format!("{}/processPayment", self.config.base_url))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CheckoutError::Gateway(format!("payment request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, order_id = %order.order_id(), "gateway refused payment link");
            return Err(CheckoutError::Gateway("Failed to create payment link".into()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CheckoutError::Gateway(format!("unreadable payment response: {e}")))?;

        let payment_url = first_text(&body, &["url", "payment_url"]).ok_or_else(|| {
            CheckoutError::Gateway("gateway response carries no payment URL".into())
        })?;
        let transaction_id = first_text(&body, &["transaction_id", "id"]).and_then(TransactionId::new);

        Ok(PaymentLink {
            payment_url,
            transaction_id,
        })
    }
}

impl PaymentGateway for TilopayGateway {
    fn create_payment_link(&self, order: &Order) -> BoxFuture<'_, Result<PaymentLink, CheckoutError>> {
        let order = order.clone();
        Box::pin(async move { self.create_link(&order).await })
    }
}

/// First word is the first name; the rest, or the whole name again when
/// there is no rest, is the last name.
fn split_name(full: &str) -> (&str, &str) {
    let full = full.trim();
    match full.split_once(' ') {
        Some((first, rest)) if !rest.trim().is_empty() => (first, rest.trim()),
        _ => (full, full),
    }
}

/// ISO 3166-2:CR subdivision for a province name.
fn province_code(province: &str) -> String {
    let code = match province.trim().to_lowercase().as_str() {
        "san josé" | "san jose" => "SJ",
        "alajuela" => "A",
        "cartago" => "C",
        "heredia" => "H",
        "guanacaste" => "G",
        "puntarenas" => "P",
        "limón" | "limon" => "L",
        _ => "SJ",
    };
    format!("CR-{code}")
}
