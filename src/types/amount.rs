use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::{Error, Result};

/// Strictly positive currency value. The sign of a ledger movement is carried
/// by the entry type, never by a negative amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(Error::InvalidAmount(value));
        }
        Ok(Amount(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Balances derived from a user's entries. Never stored, always recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub available: Decimal,
    pub pending: Decimal,
    pub total_paid: Decimal,
}

impl Balance {
    pub fn zero() -> Self {
        Balance {
            available: Decimal::ZERO,
            pending: Decimal::ZERO,
            total_paid: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn positive_amounts_accepted() {
        let amount = Amount::new(dec!(25.00)).unwrap();
        assert_eq!(amount.value(), dec!(25.00));
    }

    #[test]
    fn zero_and_negative_amounts_rejected() {
        assert!(matches!(Amount::new(dec!(0)), Err(Error::InvalidAmount(_))));
        assert!(matches!(
            Amount::new(dec!(-0.01)),
            Err(Error::InvalidAmount(_))
        ));
    }
}
