//! Checkout Form Validation
//!
//! Pure, synchronous validation of user-submitted checkout data.
//! Rules accumulate into an ordered error list instead of short-circuiting,
//! so the storefront can render every field problem at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// local@domain.tld shape, no whitespace on either side of the '@'
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

// Brazilian phone formatting: (DD) NNNNN-NNNN or (DD) NNNN-NNNN
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(\d{2}\)\s\d{4,5}-\d{4}$").expect("phone pattern"));

/// User-submitted intent to subscribe
///
/// `plan_id` and `billing_cycle` stay raw strings here: a missing or
/// malformed value must surface as a validation message, not as a
/// deserialization failure, so every field defaults to empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default)]
    pub plan_id: String,

    #[serde(default)]
    pub billing_cycle: String,
}

/// Outcome of validating a [`CheckoutForm`]
///
/// `valid` is true iff `errors` is empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl CheckoutForm {
    /// Validate the form, accumulating every failed rule in order.
    ///
    /// Catalog existence of `plan_id` is deliberately not checked here;
    /// that lookup belongs to the dispatch step.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        if self.email.is_empty() {
            errors.push("Email é obrigatório".to_string());
        } else if !EMAIL_RE.is_match(&self.email) {
            errors.push("Email inválido".to_string());
        }

        if self.name.trim().chars().count() < 2 {
            errors.push("Nome deve ter pelo menos 2 caracteres".to_string());
        }

        if self.plan_id.is_empty() {
            errors.push("Plano é obrigatório".to_string());
        }

        if self.billing_cycle.is_empty() {
            errors.push("Ciclo de cobrança é obrigatório".to_string());
        }

        // Phone is optional; empty counts as absent.
        if let Some(phone) = self.phone.as_deref() {
            if !phone.is_empty() && !PHONE_RE.is_match(phone) {
                errors.push("Telefone deve estar no formato (11) 99999-9999".to_string());
            }
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            email: "a@b.com".into(),
            name: "Ana Silva".into(),
            phone: Some("(11) 99999-9999".into()),
            plan_id: "starter".into(),
            billing_cycle: "yearly".into(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let report = valid_form().validate();
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_errors_accumulate() {
        let form = CheckoutForm {
            email: "bad".into(),
            name: "A".into(),
            phone: None,
            plan_id: String::new(),
            billing_cycle: "monthly".into(),
        };
        let report = form.validate();
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Email inválido",
                "Nome deve ter pelo menos 2 caracteres",
                "Plano é obrigatório",
            ]
        );
    }

    #[test]
    fn test_empty_and_malformed_email_differ() {
        let mut form = valid_form();
        form.email = String::new();
        assert_eq!(form.validate().errors, vec!["Email é obrigatório"]);

        form.email = "not-an-email".into();
        assert_eq!(form.validate().errors, vec!["Email inválido"]);
    }

    #[test]
    fn test_phone_is_optional() {
        let mut form = valid_form();
        form.phone = None;
        assert!(form.validate().valid);

        form.phone = Some(String::new());
        assert!(form.validate().valid);

        form.phone = Some("(11) 9999-9999".into());
        assert!(form.validate().valid);

        form.phone = Some("11999999999".into());
        let report = form.validate();
        assert_eq!(
            report.errors,
            vec!["Telefone deve estar no formato (11) 99999-9999"]
        );
    }

    #[test]
    fn test_name_is_trimmed() {
        let mut form = valid_form();
        form.name = "  A  ".into();
        assert!(!form.validate().valid);

        form.name = " Zé ".into();
        assert!(form.validate().valid);
    }

    #[test]
    fn test_missing_billing_cycle() {
        let mut form = valid_form();
        form.billing_cycle = String::new();
        assert_eq!(form.validate().errors, vec!["Ciclo de cobrança é obrigatório"]);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(valid_form()).unwrap();
        assert!(json.get("planId").is_some());
        assert!(json.get("billingCycle").is_some());
    }
}
