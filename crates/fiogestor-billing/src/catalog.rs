//! Pricing Catalog
//!
//! Single source of truth for plan metadata and price arithmetic.
//! Prices are integer centavos; the catalog is built once at startup
//! and never mutated.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{BillingError, Result};

/// Billing cadence, each with its own price point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }

    /// Parse from the wire value. Absence or a malformed cycle is a miss,
    /// never a default.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(BillingCycle::Monthly),
            "yearly" => Some(BillingCycle::Yearly),
            _ => None,
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Usage ceiling for one plan feature
///
/// Serialized as a plain number or the string `"unlimited"`, matching the
/// storefront's plan JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quota {
    Limited(u32),
    Unlimited,
}

impl Serialize for Quota {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Quota::Limited(n) => serializer.serialize_u32(*n),
            Quota::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for Quota {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(Quota::Limited(n)),
            Raw::Text(s) if s == "unlimited" => Ok(Quota::Unlimited),
            Raw::Text(s) => Err(serde::de::Error::custom(format!("invalid quota: {s}"))),
        }
    }
}

/// Usage limits attached to a plan
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub clients: Quota,
    pub appointments: Quota,
    pub whatsapp_messages: Quota,

    /// Storage quota in GB
    #[serde(rename = "storage")]
    pub storage_gb: u32,
}

/// One subscription tier
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Stable string key ("starter", "professional", "premium")
    pub id: String,

    /// Display name
    pub name: String,

    /// Monthly price in centavos
    #[serde(rename = "price")]
    pub monthly_cents: i64,

    /// Yearly price in centavos
    #[serde(rename = "priceYearly")]
    pub yearly_cents: i64,

    pub description: String,

    /// Ordered feature list as shown on the pricing page
    pub features: Vec<String>,

    #[serde(default)]
    pub popular: bool,

    /// External processor price identifiers
    #[serde(rename = "stripePriceId")]
    pub price_id_monthly: String,
    #[serde(rename = "stripePriceIdYearly")]
    pub price_id_yearly: String,

    pub limits: PlanLimits,
}

impl Plan {
    /// Price in centavos for the given cycle
    pub fn price_cents(&self, cycle: BillingCycle) -> i64 {
        match cycle {
            BillingCycle::Monthly => self.monthly_cents,
            BillingCycle::Yearly => self.yearly_cents,
        }
    }

    /// Processor price identifier for the given cycle
    pub fn price_id(&self, cycle: BillingCycle) -> &str {
        match cycle {
            BillingCycle::Monthly => &self.price_id_monthly,
            BillingCycle::Yearly => &self.price_id_yearly,
        }
    }

    /// Discount of the yearly price against twelve monthly payments
    pub fn yearly_discount_percent(&self) -> i32 {
        yearly_discount_percent(self.monthly_cents * 12, self.yearly_cents)
    }
}

/// Immutable plan catalog
///
/// Construction enforces that exactly one plan carries the `popular` flag,
/// so [`Catalog::popular_plan`] never has to guess.
#[derive(Clone, Debug)]
pub struct Catalog {
    plans: Vec<Plan>,
}

impl Catalog {
    /// Build a catalog from explicit plans
    pub fn with_plans(plans: Vec<Plan>) -> Result<Self> {
        let popular = plans.iter().filter(|p| p.popular).count();
        if popular != 1 {
            return Err(BillingError::Config(format!(
                "catalog must flag exactly one popular plan, found {popular}"
            )));
        }
        Ok(Self { plans })
    }

    /// Build the production catalog, reading processor price identifiers
    /// from `STRIPE_PRICE_{PLAN}_{CYCLE}` with placeholder fallbacks.
    pub fn from_env() -> Result<Self> {
        Self::with_plans(vec![
            Plan {
                id: "starter".into(),
                name: "Starter".into(),
                monthly_cents: 1990,
                yearly_cents: 19900,
                description: "Perfeito para costureiras iniciantes".into(),
                features: vec![
                    "Até 50 clientes".into(),
                    "WhatsApp Templates inteligentes".into(),
                    "Agenda básica".into(),
                    "Controle financeiro simples".into(),
                    "Suporte por email".into(),
                    "1GB de armazenamento".into(),
                ],
                popular: false,
                price_id_monthly: price_id("STRIPE_PRICE_STARTER_MONTHLY", "price_starter_monthly"),
                price_id_yearly: price_id("STRIPE_PRICE_STARTER_YEARLY", "price_starter_yearly"),
                limits: PlanLimits {
                    clients: Quota::Limited(50),
                    appointments: Quota::Limited(100),
                    whatsapp_messages: Quota::Limited(500),
                    storage_gb: 1,
                },
            },
            Plan {
                id: "professional".into(),
                name: "Professional".into(),
                monthly_cents: 3990,
                yearly_cents: 39900,
                description: "Para costureiras estabelecidas".into(),
                features: vec![
                    "Clientes ilimitados".into(),
                    "WhatsApp Templates avançados".into(),
                    "Agenda completa com lembretes".into(),
                    "Controle de produção".into(),
                    "Relatórios detalhados".into(),
                    "Backup automático".into(),
                    "Suporte prioritário".into(),
                    "10GB de armazenamento".into(),
                ],
                popular: true,
                price_id_monthly: price_id(
                    "STRIPE_PRICE_PROFESSIONAL_MONTHLY",
                    "price_professional_monthly",
                ),
                price_id_yearly: price_id(
                    "STRIPE_PRICE_PROFESSIONAL_YEARLY",
                    "price_professional_yearly",
                ),
                limits: PlanLimits {
                    clients: Quota::Unlimited,
                    appointments: Quota::Unlimited,
                    whatsapp_messages: Quota::Limited(2000),
                    storage_gb: 10,
                },
            },
            Plan {
                id: "premium".into(),
                name: "Premium".into(),
                monthly_cents: 6990,
                yearly_cents: 69900,
                description: "Para ateliês grandes e profissionais".into(),
                features: vec![
                    "Tudo do Professional".into(),
                    "WhatsApp API oficial (futuro)".into(),
                    "Calculadora de preços IA".into(),
                    "Relatórios avançados".into(),
                    "Marca personalizada".into(),
                    "Suporte VIP (WhatsApp)".into(),
                    "Treinamento personalizado".into(),
                    "50GB de armazenamento".into(),
                ],
                popular: false,
                price_id_monthly: price_id("STRIPE_PRICE_PREMIUM_MONTHLY", "price_premium_monthly"),
                price_id_yearly: price_id("STRIPE_PRICE_PREMIUM_YEARLY", "price_premium_yearly"),
                limits: PlanLimits {
                    clients: Quota::Unlimited,
                    appointments: Quota::Unlimited,
                    whatsapp_messages: Quota::Unlimited,
                    storage_gb: 50,
                },
            },
        ])
    }

    /// All plans, in display order
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Look up a plan by its stable id. A miss is a normal outcome.
    pub fn plan_by_id(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// The single plan flagged popular
    pub fn popular_plan(&self) -> &Plan {
        // Invariant checked at construction.
        self.plans
            .iter()
            .find(|p| p.popular)
            .unwrap_or(&self.plans[0])
    }

    /// Price in centavos for a (plan, cycle) pair
    ///
    /// This is the single price source for both dispatch and analytics.
    pub fn price_cents(&self, plan_id: &str, cycle: BillingCycle) -> Option<i64> {
        self.plan_by_id(plan_id).map(|p| p.price_cents(cycle))
    }
}

fn price_id(var: &str, fallback: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| fallback.to_string())
}

/// Format centavos as a pt-BR currency string, e.g. `R$ 39,90`
///
/// Thousands are grouped with `.`, decimals separated with `,`.
/// Deterministic and side-effect-free.
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = (abs / 100).to_string();
    let centavos = abs % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, ch) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{centavos:02}")
}

/// Integer percentage saved by paying yearly instead of twelve monthly
/// payments: `round(((monthly_total - yearly) / monthly_total) * 100)`.
///
/// `monthly_total` is the caller-supplied `monthly_cents * 12`. Rounds
/// half-away-from-zero. A yearly price that is not actually discounted
/// yields zero or a negative percentage; that is plain arithmetic, not an
/// error.
pub fn yearly_discount_percent(monthly_total_cents: i64, yearly_cents: i64) -> i32 {
    if monthly_total_cents == 0 {
        return 0;
    }

    let saved = Decimal::from(monthly_total_cents - yearly_cents);
    let percent = saved * Decimal::from(100) / Decimal::from(monthly_total_cents);

    percent
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or(0)
}
