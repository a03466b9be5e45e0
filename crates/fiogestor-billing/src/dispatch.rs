//! Checkout Dispatch
//!
//! Translates an already-validated checkout form into a redirect target on
//! the payment processor's hosted checkout, emitting funnel analytics first.
//! The redirect is returned as a value: performing the actual navigation is
//! the caller's side effect, which keeps dispatch pure and testable.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analytics::{Funnel, FunnelEvent};
use crate::catalog::{BillingCycle, Catalog};
use crate::checkout::CheckoutForm;
use crate::error::{BillingError, Result};

/// Externally hosted checkout URLs keyed by (plan id, billing cycle)
#[derive(Clone, Debug, Default)]
pub struct PaymentLinks {
    links: HashMap<(String, BillingCycle), String>,
}

const LINK_PLANS: [&str; 3] = ["starter", "professional", "premium"];
const LINK_CYCLES: [BillingCycle; 2] = [BillingCycle::Monthly, BillingCycle::Yearly];

impl PaymentLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The processor's hosted payment links for every catalog pair
    pub fn builtin() -> Self {
        let mut links = Self::new();
        for plan in LINK_PLANS {
            for cycle in LINK_CYCLES {
                links.insert(
                    plan,
                    cycle,
                    format!("https://buy.stripe.com/test_{plan}_{cycle}"),
                );
            }
        }
        links
    }

    /// Built-in links, each overridable via `CHECKOUT_URL_{PLAN}_{CYCLE}`
    pub fn from_env() -> Self {
        let mut links = Self::builtin();
        for plan in LINK_PLANS {
            for cycle in LINK_CYCLES {
                let var = format!(
                    "CHECKOUT_URL_{}_{}",
                    plan.to_uppercase(),
                    cycle.as_str().to_uppercase()
                );
                if let Ok(url) = std::env::var(&var) {
                    links.insert(plan, cycle, url);
                }
            }
        }
        links
    }

    pub fn insert(&mut self, plan_id: impl Into<String>, cycle: BillingCycle, url: impl Into<String>) {
        self.links.insert((plan_id.into(), cycle), url.into());
    }

    /// Resolve a (plan, cycle) pair. A miss is explicit, never a panic.
    pub fn url(&self, plan_id: &str, cycle: BillingCycle) -> Option<&str> {
        self.links
            .get(&(plan_id.to_string(), cycle))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Successful dispatch: hand control to the external checkout page
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRedirect {
    /// Hosted checkout URL to navigate to
    pub target: String,

    pub plan_id: String,
    pub billing_cycle: BillingCycle,
}

/// Maps a validated checkout form to its redirect target
pub struct CheckoutDispatcher {
    catalog: Arc<Catalog>,
    links: PaymentLinks,
    funnel: Arc<Funnel>,
}

impl CheckoutDispatcher {
    pub fn new(catalog: Arc<Catalog>, links: PaymentLinks, funnel: Arc<Funnel>) -> Self {
        Self {
            catalog,
            links,
            funnel,
        }
    }

    /// Resolve the form's (plan, cycle) pair to a redirect target.
    ///
    /// Any miss — unknown plan, malformed cycle, unmapped pair — is
    /// [`BillingError::PlanNotFound`] and emits nothing. On success the
    /// `begin_checkout` funnel event goes out before the redirect is
    /// returned, matching the storefront's emit-then-navigate order.
    pub fn dispatch(&self, form: &CheckoutForm) -> Result<CheckoutRedirect> {
        let cycle = BillingCycle::parse(&form.billing_cycle).ok_or_else(|| {
            BillingError::PlanNotFound(format!("{}_{}", form.plan_id, form.billing_cycle))
        })?;

        let plan = self
            .catalog
            .plan_by_id(&form.plan_id)
            .ok_or_else(|| BillingError::PlanNotFound(form.plan_id.clone()))?;

        let target = self
            .links
            .url(&plan.id, cycle)
            .ok_or_else(|| BillingError::PlanNotFound(format!("{}_{}", plan.id, cycle)))?
            .to_string();

        self.funnel
            .begin_checkout(&FunnelEvent::begin_checkout(plan, cycle));

        tracing::info!(plan = %plan.id, cycle = %cycle, target = %target, "checkout dispatched");

        Ok(CheckoutRedirect {
            target,
            plan_id: plan.id.clone(),
            billing_cycle: cycle,
        })
    }

    /// Record a completed purchase for the funnel.
    ///
    /// Returns the emitted event so the caller can surface the transaction
    /// id it ended up with.
    pub fn confirm_purchase(
        &self,
        plan_id: &str,
        cycle: BillingCycle,
        transaction_id: Option<String>,
    ) -> Result<FunnelEvent> {
        let plan = self
            .catalog
            .plan_by_id(plan_id)
            .ok_or_else(|| BillingError::PlanNotFound(plan_id.to_string()))?;

        let event = FunnelEvent::purchase(plan, cycle, transaction_id);
        self.funnel.purchase(&event);

        tracing::info!(
            plan = %plan.id,
            cycle = %cycle,
            transaction_id = ?event.transaction_id,
            "purchase confirmed"
        );

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::RecordingTracker;
    use rust_decimal_macros::dec;

    fn dispatcher() -> (CheckoutDispatcher, Arc<RecordingTracker>) {
        let catalog = Arc::new(Catalog::from_env().unwrap());
        let tracker = Arc::new(RecordingTracker::new());
        let mut funnel = Funnel::new();
        funnel.register(tracker.clone());
        (
            CheckoutDispatcher::new(catalog, PaymentLinks::builtin(), Arc::new(funnel)),
            tracker,
        )
    }

    fn form(plan_id: &str, billing_cycle: &str) -> CheckoutForm {
        CheckoutForm {
            email: "a@b.com".into(),
            name: "Ana Silva".into(),
            phone: None,
            plan_id: plan_id.into(),
            billing_cycle: billing_cycle.into(),
        }
    }

    #[test]
    fn test_dispatch_resolves_starter_monthly() {
        let (dispatcher, tracker) = dispatcher();

        let redirect = dispatcher.dispatch(&form("starter", "monthly")).unwrap();
        assert_eq!(redirect.target, "https://buy.stripe.com/test_starter_monthly");
        assert_eq!(redirect.plan_id, "starter");
        assert_eq!(redirect.billing_cycle, BillingCycle::Monthly);

        // Analytics went out before the handoff, valued from the catalog.
        let events = tracker.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "begin_checkout");
        assert_eq!(events[0].1.value, dec!(19.90));
    }

    #[test]
    fn test_dispatch_unknown_plan() {
        let (dispatcher, tracker) = dispatcher();

        let err = dispatcher.dispatch(&form("gold", "monthly")).unwrap_err();
        assert!(matches!(err, BillingError::PlanNotFound(_)));
        assert!(tracker.events().is_empty());
    }

    #[test]
    fn test_dispatch_malformed_cycle() {
        let (dispatcher, tracker) = dispatcher();

        let err = dispatcher.dispatch(&form("starter", "weekly")).unwrap_err();
        assert!(matches!(err, BillingError::PlanNotFound(_)));
        assert!(tracker.events().is_empty());
    }

    #[test]
    fn test_dispatch_unmapped_pair() {
        let catalog = Arc::new(Catalog::from_env().unwrap());
        let mut links = PaymentLinks::new();
        links.insert("starter", BillingCycle::Monthly, "https://example.com/pay");

        let dispatcher = CheckoutDispatcher::new(catalog, links, Arc::new(Funnel::new()));
        assert!(dispatcher.dispatch(&form("starter", "yearly")).is_err());
        assert!(dispatcher.dispatch(&form("starter", "monthly")).is_ok());
    }

    #[test]
    fn test_confirm_purchase_emits_event() {
        let (dispatcher, tracker) = dispatcher();

        let event = dispatcher
            .confirm_purchase("professional", BillingCycle::Yearly, Some("tx_99".into()))
            .unwrap();
        assert_eq!(event.value, dec!(399.00));
        assert_eq!(event.transaction_id.as_deref(), Some("tx_99"));

        let events = tracker.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "purchase");
    }

    #[test]
    fn test_confirm_purchase_unknown_plan() {
        let (dispatcher, tracker) = dispatcher();
        assert!(dispatcher
            .confirm_purchase("gold", BillingCycle::Monthly, None)
            .is_err());
        assert!(tracker.events().is_empty());
    }

    #[test]
    fn test_builtin_links_cover_catalog() {
        let catalog = Catalog::from_env().unwrap();
        let links = PaymentLinks::builtin();
        assert_eq!(links.len(), 6);
        for plan in catalog.plans() {
            for cycle in LINK_CYCLES {
                assert!(links.url(&plan.id, cycle).is_some(), "{}/{cycle}", plan.id);
            }
        }
    }

    #[test]
    fn test_dispatch_is_repeatable() {
        let (dispatcher, tracker) = dispatcher();
        let first = dispatcher.dispatch(&form("premium", "yearly")).unwrap();
        let second = dispatcher.dispatch(&form("premium", "yearly")).unwrap();
        assert_eq!(first.target, second.target);
        assert_eq!(tracker.events().len(), 2);
    }
}
