//! # fiogestor-billing
//!
//! Pricing catalog, checkout validation and dispatch for FioGestor's
//! subscription storefront.
//!
//! ## Checkout flow (redirect strategy)
//!
//! The storefront never touches card data: checkout hands the visitor off
//! to the payment processor's hosted page.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │  Storefront │────▶│  Hosted Checkout │────▶│  Storefront │
//! │  (pricing)  │     │  (processor)     │     │  (success)  │
//! └─────────────┘     └──────────────────┘     └─────────────┘
//! ```
//!
//! A checkout runs in three pure steps before the single side effect:
//!
//! 1. [`CheckoutForm::validate`] accumulates every field error (pt-BR
//!    messages, never an `Err`).
//! 2. [`CheckoutDispatcher::dispatch`] resolves the (plan, cycle) pair
//!    through the [`Catalog`] and the [`PaymentLinks`] table; any miss is
//!    [`BillingError::PlanNotFound`].
//! 3. Funnel analytics fan out to zero-or-more [`FunnelTracker`]s, then the
//!    caller performs the navigation with the returned
//!    [`CheckoutRedirect`] — terminal for the page that initiated it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fiogestor_billing::{Catalog, CheckoutDispatcher, CheckoutForm, Funnel, PaymentLinks};
//!
//! let catalog = Arc::new(Catalog::from_env()?);
//! let dispatcher = CheckoutDispatcher::new(catalog, PaymentLinks::from_env(), Arc::new(Funnel::new()));
//!
//! let report = form.validate();
//! if report.valid {
//!     let redirect = dispatcher.dispatch(&form)?;
//!     // Navigate to: redirect.target
//! }
//! ```

mod analytics;
mod catalog;
mod checkout;
mod dispatch;
mod error;

pub use analytics::{
    EventLogTracker, Funnel, FunnelEvent, FunnelItem, FunnelTracker, PixelEvent, PixelLogTracker,
    RecordingTracker,
};
pub use catalog::{
    format_price, yearly_discount_percent, BillingCycle, Catalog, Plan, PlanLimits, Quota,
};
pub use checkout::{CheckoutForm, ValidationReport};
pub use dispatch::{CheckoutDispatcher, CheckoutRedirect, PaymentLinks};
pub use error::{BillingError, Result};
