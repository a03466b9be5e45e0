//! HTTP Handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use fiogestor_billing::{BillingCycle, BillingError, CheckoutForm, Plan};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub plans: usize,
    pub trackers: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,

    /// Per-field validation messages, in rule order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
    pub plan_id: String,
    pub billing_cycle: BillingCycle,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPurchaseRequest {
    #[serde(default)]
    pub plan_id: String,

    #[serde(default)]
    pub billing_cycle: String,

    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPurchaseResponse {
    pub transaction_id: String,
}

fn billing_error_response(err: &BillingError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        BillingError::PlanNotFound(_) => StatusCode::NOT_FOUND,
        BillingError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let code = match err {
        BillingError::PlanNotFound(_) => "PLAN_NOT_FOUND",
        BillingError::Config(_) => "CONFIG_ERROR",
    };

    (status, Json(ErrorResponse::new(err.user_message(), code)))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        plans: state.catalog.plans().len(),
        trackers: state.funnel.len(),
    })
}

/// List the plan catalog
pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<Plan>> {
    Json(state.catalog.plans().to_vec())
}

/// Create a checkout session: validate the form, resolve the redirect
/// target and hand it back for the storefront to navigate to.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<CheckoutSessionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let report = form.validate();
    if !report.valid {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Dados inválidos".into(),
                code: "VALIDATION_ERROR".into(),
                errors: report.errors,
            }),
        ));
    }

    let redirect = state.dispatcher.dispatch(&form).map_err(|e| {
        tracing::warn!(plan = %form.plan_id, cycle = %form.billing_cycle, "checkout dispatch failed: {e}");
        billing_error_response(&e)
    })?;

    Ok(Json(CheckoutSessionResponse {
        session_id: format!("cs_{}", uuid::Uuid::new_v4().simple()),
        url: redirect.target,
        plan_id: redirect.plan_id,
        billing_cycle: redirect.billing_cycle,
    }))
}

/// Record a completed purchase for the analytics funnel
pub async fn confirm_purchase(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmPurchaseRequest>,
) -> Result<Json<ConfirmPurchaseResponse>, (StatusCode, Json<ErrorResponse>)> {
    let cycle = BillingCycle::parse(&payload.billing_cycle).ok_or_else(|| {
        billing_error_response(&BillingError::PlanNotFound(format!(
            "{}_{}",
            payload.plan_id, payload.billing_cycle
        )))
    })?;

    let event = state
        .dispatcher
        .confirm_purchase(&payload.plan_id, cycle, payload.transaction_id)
        .map_err(|e| billing_error_response(&e))?;

    Ok(Json(ConfirmPurchaseResponse {
        transaction_id: event.transaction_id.unwrap_or_default(),
    }))
}
