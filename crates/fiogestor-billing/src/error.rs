//! Billing Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, BillingError>;

/// Billing-related errors
///
/// Validation failures are not represented here: a rejected
/// [`CheckoutForm`](crate::CheckoutForm) is a normal return value
/// (see [`ValidationReport`](crate::ValidationReport)), never an error.
#[derive(Error, Debug)]
pub enum BillingError {
    /// Unknown plan or unmapped (plan, cycle) pair
    #[error("plan not found: {0}")]
    PlanNotFound(String),

    /// Catalog or environment misconfiguration
    #[error("configuration error: {0}")]
    Config(String),
}

impl BillingError {
    /// Check if this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        // A missing plan or a broken catalog won't fix itself on retry.
        false
    }

    /// Get user-facing message (pt-BR, matches the storefront copy)
    pub fn user_message(&self) -> &str {
        match self {
            BillingError::PlanNotFound(_) => "Plano não encontrado",
            BillingError::Config(_) => "Erro de configuração do serviço",
        }
    }
}
