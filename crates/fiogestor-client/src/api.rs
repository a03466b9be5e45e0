//! Billing Backend Client
//!
//! Thin `reqwest` wrapper over the optional billing backend. Every call is
//! a single request/await-response round trip with no retry or backoff; a
//! non-2xx status surfaces the body's `error` field, or the operation's
//! generic fallback message when the body carries none.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use fiogestor_billing::CheckoutForm;

use crate::error::{ApiError, Result};

/// Client configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Backend base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("FIOGESTOR_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into());

        Self {
            base_url,
            ..Default::default()
        }
    }
}

/// Billing backend client
pub struct BillingApi {
    http: reqwest::Client,
    config: ApiConfig,
}

impl BillingApi {
    /// Create a client against a custom base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(ApiConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(ApiConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Create a hosted checkout session for a validated form
    pub async fn create_checkout_session(&self, form: &CheckoutForm) -> Result<CheckoutSession> {
        let response = self
            .http
            .post(self.url("/api/create-checkout-session"))
            .json(form)
            .send()
            .await?;

        Self::parse(response, "Erro ao criar sessão de checkout").await
    }

    /// Create a customer portal session for subscription self-service
    pub async fn create_portal_session(&self, customer_id: &str) -> Result<PortalSession> {
        let response = self
            .http
            .post(self.url("/api/create-portal-session"))
            .json(&PortalRequest {
                customer_id: customer_id.to_string(),
            })
            .send()
            .await?;

        Self::parse(response, "Erro ao criar sessão do portal").await
    }

    /// Fetch a subscription by id
    pub async fn subscription(&self, subscription_id: &str) -> Result<Subscription> {
        let response = self
            .http
            .get(self.url(&format!("/api/subscription/{subscription_id}")))
            .send()
            .await?;

        Self::parse(response, "Erro ao buscar assinatura").await
    }

    /// Cancel a subscription by id
    pub async fn cancel_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        let response = self
            .http
            .post(self.url(&format!("/api/subscription/{subscription_id}/cancel")))
            .send()
            .await?;

        Self::parse(response, "Erro ao cancelar assinatura").await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response, fallback: &str) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| fallback.to_string());

        tracing::warn!(status = %status, message = %message, "billing api call failed");

        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PortalRequest {
    customer_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// A created checkout session: redirect the customer to `url`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

/// A created customer portal session
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSession {
    pub url: String,
}

/// Processor-side subscription status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
    Trialing,
}

/// A customer subscription as reported by the backend
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
}
