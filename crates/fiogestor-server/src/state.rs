//! Application State

use std::sync::Arc;

use fiogestor_billing::{Catalog, CheckoutDispatcher, Funnel};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Immutable plan catalog, built once at startup
    pub catalog: Arc<Catalog>,

    /// Checkout dispatcher over the catalog and payment link table
    pub dispatcher: Arc<CheckoutDispatcher>,

    /// Funnel shared with the dispatcher (kept here for health reporting)
    pub funnel: Arc<Funnel>,
}
