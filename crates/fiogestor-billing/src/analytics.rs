//! Funnel Analytics
//!
//! Best-effort purchase-funnel notification to zero-or-more external
//! observers. Emission is fire-and-forget: trackers are infallible, an
//! unconfigured integration is simply never registered, and an empty
//! funnel is silently tolerated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{BillingCycle, Plan};

/// One line item in a funnel event
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunnelItem {
    /// `{planId}_{billingCycle}`
    pub item_id: String,

    /// `FioGestor {planId}`
    pub item_name: String,

    pub category: String,
    pub quantity: u32,

    /// Unit price in BRL
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// A structured step in the purchase funnel
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunnelEvent {
    pub currency: String,

    /// Total value in BRL
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,

    pub items: Vec<FunnelItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl FunnelEvent {
    fn for_plan(plan: &Plan, cycle: BillingCycle) -> Self {
        // Value comes straight from the catalog so analytics can never
        // drift from checkout pricing.
        let value = Decimal::new(plan.price_cents(cycle), 2);
        Self {
            currency: "BRL".into(),
            value,
            items: vec![FunnelItem {
                item_id: format!("{}_{}", plan.id, cycle),
                item_name: format!("FioGestor {}", plan.id),
                category: "subscription".into(),
                quantity: 1,
                price: value,
            }],
            transaction_id: None,
        }
    }

    /// Event for a checkout that is about to start
    pub fn begin_checkout(plan: &Plan, cycle: BillingCycle) -> Self {
        Self::for_plan(plan, cycle)
    }

    /// Event for a completed purchase
    ///
    /// When no processor transaction id is available a `fiogestor_{millis}`
    /// placeholder is generated.
    pub fn purchase(plan: &Plan, cycle: BillingCycle, transaction_id: Option<String>) -> Self {
        let mut event = Self::for_plan(plan, cycle);
        event.transaction_id = Some(transaction_id.unwrap_or_else(|| {
            format!("fiogestor_{}", chrono::Utc::now().timestamp_millis())
        }));
        event
    }
}

/// Parallel pixel-style payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PixelEvent {
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,

    pub currency: String,
    pub content_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl PixelEvent {
    fn from_event(event: &FunnelEvent) -> Self {
        Self {
            value: event.value,
            currency: event.currency.clone(),
            content_name: event
                .items
                .first()
                .map(|i| i.item_name.clone())
                .unwrap_or_else(|| "FioGestor".into()),
            content_category: None,
            content_type: None,
        }
    }

    /// Pixel payload for a starting checkout
    pub fn initiate(event: &FunnelEvent) -> Self {
        let mut pixel = Self::from_event(event);
        pixel.content_category = Some("subscription".into());
        pixel
    }

    /// Pixel payload for a completed purchase
    pub fn purchase(event: &FunnelEvent) -> Self {
        let mut pixel = Self::from_event(event);
        pixel.content_type = Some("product".into());
        pixel
    }
}

/// A funnel observer
///
/// Implementations must not panic: emission happens immediately before the
/// checkout handoff and is never allowed to block it.
pub trait FunnelTracker: Send + Sync {
    fn begin_checkout(&self, event: &FunnelEvent);
    fn purchase(&self, event: &FunnelEvent);
}

impl<T: FunnelTracker + ?Sized> FunnelTracker for std::sync::Arc<T> {
    fn begin_checkout(&self, event: &FunnelEvent) {
        (**self).begin_checkout(event);
    }

    fn purchase(&self, event: &FunnelEvent) {
        (**self).purchase(event);
    }
}

/// Fan-out over zero-or-more registered trackers
#[derive(Default)]
pub struct Funnel {
    trackers: Vec<Box<dyn FunnelTracker>>,
}

impl Funnel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tracker
    pub fn register(&mut self, tracker: impl FunnelTracker + 'static) {
        self.trackers.push(Box::new(tracker));
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Notify every tracker that a checkout is starting
    pub fn begin_checkout(&self, event: &FunnelEvent) {
        for tracker in &self.trackers {
            tracker.begin_checkout(event);
        }
    }

    /// Notify every tracker of a completed purchase
    pub fn purchase(&self, event: &FunnelEvent) {
        for tracker in &self.trackers {
            tracker.purchase(event);
        }
    }
}

/// Site-analytics tracker emitting the full event shape through `tracing`
pub struct EventLogTracker {
    measurement_id: String,
}

impl EventLogTracker {
    pub fn new(measurement_id: impl Into<String>) -> Self {
        Self {
            measurement_id: measurement_id.into(),
        }
    }

    /// Present only when `GA_MEASUREMENT_ID` is configured
    pub fn from_env() -> Option<Self> {
        std::env::var("GA_MEASUREMENT_ID").ok().map(Self::new)
    }
}

impl FunnelTracker for EventLogTracker {
    fn begin_checkout(&self, event: &FunnelEvent) {
        tracing::info!(
            measurement_id = %self.measurement_id,
            value = %event.value,
            payload = %serde_json::to_string(event).unwrap_or_default(),
            "begin_checkout"
        );
    }

    fn purchase(&self, event: &FunnelEvent) {
        tracing::info!(
            measurement_id = %self.measurement_id,
            value = %event.value,
            transaction_id = ?event.transaction_id,
            payload = %serde_json::to_string(event).unwrap_or_default(),
            "purchase"
        );
    }
}

/// Ad-pixel tracker emitting the condensed pixel shape through `tracing`
pub struct PixelLogTracker {
    pixel_id: String,
}

impl PixelLogTracker {
    pub fn new(pixel_id: impl Into<String>) -> Self {
        Self {
            pixel_id: pixel_id.into(),
        }
    }

    /// Present only when `META_PIXEL_ID` is configured
    pub fn from_env() -> Option<Self> {
        std::env::var("META_PIXEL_ID").ok().map(Self::new)
    }
}

impl FunnelTracker for PixelLogTracker {
    fn begin_checkout(&self, event: &FunnelEvent) {
        let pixel = PixelEvent::initiate(event);
        tracing::info!(
            pixel_id = %self.pixel_id,
            payload = %serde_json::to_string(&pixel).unwrap_or_default(),
            "InitiateCheckout"
        );
    }

    fn purchase(&self, event: &FunnelEvent) {
        let pixel = PixelEvent::purchase(event);
        tracing::info!(
            pixel_id = %self.pixel_id,
            payload = %serde_json::to_string(&pixel).unwrap_or_default(),
            "Purchase"
        );
    }
}

/// In-memory tracker recording every emission (for tests)
#[derive(Default)]
pub struct RecordingTracker {
    events: std::sync::Mutex<Vec<(&'static str, FunnelEvent)>>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(&'static str, FunnelEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl FunnelTracker for RecordingTracker {
    fn begin_checkout(&self, event: &FunnelEvent) {
        self.events.lock().unwrap().push(("begin_checkout", event.clone()));
    }

    fn purchase(&self, event: &FunnelEvent) {
        self.events.lock().unwrap().push(("purchase", event.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use rust_decimal_macros::dec;

    #[test]
    fn test_event_value_comes_from_catalog() {
        let catalog = Catalog::from_env().unwrap();
        let plan = catalog.plan_by_id("starter").unwrap();

        let event = FunnelEvent::begin_checkout(plan, BillingCycle::Monthly);
        assert_eq!(event.value, dec!(19.90));
        assert_eq!(event.currency, "BRL");
        assert_eq!(event.items.len(), 1);
        assert_eq!(event.items[0].item_id, "starter_monthly");
        assert_eq!(event.items[0].item_name, "FioGestor starter");
        assert_eq!(event.items[0].quantity, 1);
        assert_eq!(event.items[0].price, dec!(19.90));
    }

    #[test]
    fn test_purchase_generates_transaction_id() {
        let catalog = Catalog::from_env().unwrap();
        let plan = catalog.plan_by_id("premium").unwrap();

        let event = FunnelEvent::purchase(plan, BillingCycle::Yearly, None);
        assert!(event.transaction_id.unwrap().starts_with("fiogestor_"));

        let event = FunnelEvent::purchase(plan, BillingCycle::Yearly, Some("tx_42".into()));
        assert_eq!(event.transaction_id.as_deref(), Some("tx_42"));
    }

    #[test]
    fn test_pixel_shapes() {
        let catalog = Catalog::from_env().unwrap();
        let plan = catalog.plan_by_id("professional").unwrap();
        let event = FunnelEvent::begin_checkout(plan, BillingCycle::Yearly);

        let initiate = PixelEvent::initiate(&event);
        assert_eq!(initiate.value, dec!(399.00));
        assert_eq!(initiate.content_name, "FioGestor professional");
        assert_eq!(initiate.content_category.as_deref(), Some("subscription"));
        assert!(initiate.content_type.is_none());

        let purchase = PixelEvent::purchase(&event);
        assert_eq!(purchase.content_type.as_deref(), Some("product"));
        assert!(purchase.content_category.is_none());
    }

    #[test]
    fn test_value_serializes_as_number() {
        let catalog = Catalog::from_env().unwrap();
        let plan = catalog.plan_by_id("starter").unwrap();
        let event = FunnelEvent::begin_checkout(plan, BillingCycle::Monthly);

        let json = serde_json::to_value(&event).unwrap();
        assert!(json["value"].is_number());
        assert!((json["value"].as_f64().unwrap() - 19.90).abs() < 1e-9);
        assert!(json.get("transaction_id").is_none());
    }

    #[test]
    fn test_empty_funnel_is_silent() {
        let catalog = Catalog::from_env().unwrap();
        let plan = catalog.plan_by_id("starter").unwrap();
        let funnel = Funnel::new();
        assert!(funnel.is_empty());

        // No trackers registered: emission is a no-op, never a failure.
        funnel.begin_checkout(&FunnelEvent::begin_checkout(plan, BillingCycle::Monthly));
    }

    #[test]
    fn test_fan_out_reaches_every_tracker() {
        let catalog = Catalog::from_env().unwrap();
        let plan = catalog.plan_by_id("starter").unwrap();

        let first = std::sync::Arc::new(RecordingTracker::new());
        let second = std::sync::Arc::new(RecordingTracker::new());

        let mut funnel = Funnel::new();
        funnel.register(first.clone());
        funnel.register(second.clone());
        funnel.register(EventLogTracker::new("G-TEST"));
        funnel.register(PixelLogTracker::new("123456"));
        assert_eq!(funnel.len(), 4);

        funnel.purchase(&FunnelEvent::purchase(plan, BillingCycle::Monthly, None));

        assert_eq!(first.events().len(), 1);
        assert_eq!(second.events().len(), 1);
        assert_eq!(first.events()[0].0, "purchase");
    }
}
