//! # fiogestor-client
//!
//! Client for the optional FioGestor billing backend: checkout session
//! creation, customer portal sessions, and subscription lookup/cancel.
//!
//! Calls follow one convention throughout: a non-2xx response's `{error}`
//! body field becomes the error message, with a generic pt-BR fallback when
//! the body has none. There is no retry, backoff or cancellation — each
//! operation is scoped to a single user action.

mod api;
mod error;

pub use api::{
    ApiConfig, BillingApi, CheckoutSession, PortalSession, Subscription, SubscriptionStatus,
};
pub use error::{ApiError, Result};
