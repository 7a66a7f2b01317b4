//! Reward and commission arithmetic. Pure functions over plain values; the
//! ledger is credited by callers with the results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Points needed for one unit of currency.
pub const POINTS_PER_CURRENCY_UNIT: u64 = 1000;

/// Subscription plan, which scales mission rewards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    Free,
    Start,
    Pro,
    Elite,
}

impl Plan {
    /// Reward multiplier in percent: FREE 100, START 105, PRO 115, ELITE 130.
    pub fn multiplier_percent(&self) -> u64 {
        match self {
            Plan::Free => 100,
            Plan::Start => 105,
            Plan::Pro => 115,
            Plan::Elite => 130,
        }
    }
}

/// Points earned for a completed mission: floor(base * plan multiplier).
pub fn reward_points(base_points: u64, plan: Plan) -> u64 {
    base_points.saturating_mul(plan.multiplier_percent()) / 100
}

/// Platform commission on earned points: (points / 1000) * 1.50 in currency.
pub fn commission(earned_points: u64) -> Decimal {
    Decimal::from(earned_points) * Decimal::new(15, 1)
        / Decimal::from(POINTS_PER_CURRENCY_UNIT)
}

/// Currency value of a point balance: points / 1000.
pub fn points_to_currency(points: u64) -> Decimal {
    Decimal::from(points) / Decimal::from(POINTS_PER_CURRENCY_UNIT)
}
