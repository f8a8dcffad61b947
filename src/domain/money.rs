use crate::error::{CommerceError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed set of currency codes. Amounts in different currencies are never
/// converted, only compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CommerceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            other => Err(CommerceError::InvalidArgument(format!(
                "Unsupported currency: {other}"
            ))),
        }
    }
}

/// Rounds to two fractional digits, ties away from zero, and pins the scale
/// at exactly two digits.
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// A monetary amount with exactly two fractional digits.
///
/// Every construction path goes through [`round_half_up`], so derived values
/// (line totals, order totals) can never carry extra precision. Arithmetic is
/// checked: a result outside the `Decimal` range is an `InvalidArgument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, 2));

    pub fn new(value: Decimal) -> Self {
        Self(round_half_up(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// `self × quantity`, rounded half-up to 2 dp.
    pub fn times(self, quantity: u32) -> Result<Self> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self::new)
            .ok_or_else(out_of_range)
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self::new)
            .ok_or_else(out_of_range)
    }

    /// Sum of `amounts`, zero when empty.
    pub fn total(amounts: impl IntoIterator<Item = Money>) -> Result<Self> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, Money::checked_add)
    }
}

fn out_of_range() -> CommerceError {
    CommerceError::InvalidArgument("amount out of range".to_string())
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Human readable price, e.g. `39.98 EUR`.
pub fn format_price(amount: Money, currency: Currency) -> String {
    format!("{amount} {currency}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up_not_bankers() {
        assert_eq!(round_half_up(dec!(0.125)), dec!(0.13));
        assert_eq!(round_half_up(dec!(0.135)), dec!(0.14));
        assert_eq!(round_half_up(dec!(2.5)).to_string(), "2.50");
        assert_eq!(round_half_up(dec!(-0.125)), dec!(-0.13));
    }

    #[test]
    fn test_money_times_quantity() {
        let price = Money::new(dec!(19.99));
        assert_eq!(price.times(2).unwrap(), Money::new(dec!(39.98)));
        assert_eq!(Money::new(dec!(12.345)).times(1).unwrap().to_string(), "12.35");
    }

    #[test]
    fn test_money_total_and_display() {
        let total = Money::total([dec!(19.99), dec!(0.01), dec!(5)].into_iter().map(Money::new)).unwrap();
        assert_eq!(total.to_string(), "25.00");
        assert_eq!(Money::total([]).unwrap(), Money::ZERO);
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_money_overflow_is_an_error() {
        let huge = Money::new(dec!(700000000000000000000000000));
        assert!(matches!(
            huge.times(1000),
            Err(CommerceError::InvalidArgument(msg)) if msg == "amount out of range"
        ));
        assert!(matches!(
            Money::total([huge; 200]),
            Err(CommerceError::InvalidArgument(_))
        ));
        assert_eq!(huge.times(1).unwrap(), huge);
    }

    #[test]
    fn test_money_deserialize_rounds() {
        let money: Money = serde_json::from_str("\"10.005\"").unwrap();
        assert_eq!(money, Money::new(dec!(10.01)));
    }

    #[test]
    fn test_currency_parse_and_format() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(Currency::default(), Currency::Eur);
        assert!(matches!(
            "JPY".parse::<Currency>(),
            Err(CommerceError::InvalidArgument(_))
        ));
        assert_eq!(
            format_price(Money::new(dec!(39.98)), Currency::Eur),
            "39.98 EUR"
        );
    }
}
