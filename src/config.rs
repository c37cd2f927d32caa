use {
    crate::domain::error::CheckoutError,
    crate::services::crm_sync::{DEFAULT_BASE_DELAY, DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_ATTEMPTS},
    std::{env, str::FromStr, time::Duration},
};

pub const DEFAULT_GATEWAY_URL: &str = "https://app.tilopay.com/api/v1";
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";

#[derive(Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Clone)]
pub struct CrmConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub call_timeout: Duration,
}

#[derive(Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
    pub notification_email: Option<String>,
}

/// Everything the service reads from the environment. No `Debug`: only the
/// presence of secrets is ever logged.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub app_url: String,
    pub product_name: String,
    pub webhook_secret: Option<String>,
    pub gateway: GatewayConfig,
    pub crm: CrmConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, CheckoutError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CheckoutError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let app_url = or("APP_URL", "http://localhost:3000")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            bind_addr: or("BIND_ADDR", "0.0.0.0:3001"),
            app_url,
            product_name: or("PRODUCT_NAME", "DeepClean Cámara WiFi HD 1080p"),
            webhook_secret: get("TILOPAY_WEBHOOK_SECRET"),
            gateway: GatewayConfig {
                base_url: or("TILOPAY_BASE_URL", DEFAULT_GATEWAY_URL)
                    .trim_end_matches('/')
                    .to_string(),
                user: get("TILOPAY_USER"),
                password: get("TILOPAY_PASSWORD"),
                api_key: get("TILOPAY_API_KEY"),
                request_timeout: Duration::from_secs(10),
            },
            crm: CrmConfig {
                url: get("BETSY_API_URL"),
                api_key: get("BETSY_API_KEY"),
                max_attempts: parse(&get, "CRM_MAX_RETRIES")?.unwrap_or(DEFAULT_MAX_ATTEMPTS),
                base_delay: parse(&get, "CRM_RETRY_BASE_DELAY_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_BASE_DELAY),
                call_timeout: parse(&get, "CRM_TIMEOUT_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_CALL_TIMEOUT),
            },
            email: EmailConfig {
                api_url: or("RESEND_API_URL", DEFAULT_EMAIL_API_URL),
                api_key: get("RESEND_API_KEY"),
                from: or("EMAIL_FROM", "DeepClean <orders@deepclean.shopping>"),
                notification_email: get("ORDER_NOTIFICATION_EMAIL"),
            },
        })
    }

    pub fn log_summary(&self) {
        tracing::info!(
            bind_addr = %self.bind_addr,
            app_url = %self.app_url,
            gateway_url = %self.gateway.base_url,
            gateway_credentials = self.gateway.user.is_some() && self.gateway.password.is_some(),
            gateway_api_key = self.gateway.api_key.is_some(),
            webhook_secret = self.webhook_secret.is_some(),
            crm_configured = self.crm.url.is_some() && self.crm.api_key.is_some(),
            crm_max_attempts = self.crm.max_attempts,
            email_configured = self.email.api_key.is_some(),
            operator_email = self.email.notification_email.is_some(),
            "configuration loaded"
        );
        if self.webhook_secret.is_none() {
            tracing::warn!("TILOPAY_WEBHOOK_SECRET not set, webhook notifications will not be authenticated");
        }
    }
}

fn parse<T, G>(get: &G, key: &str) -> Result<Option<T>, CheckoutError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| CheckoutError::Config(format!("invalid {key}: {e}")))
        })
        .transpose()
}
