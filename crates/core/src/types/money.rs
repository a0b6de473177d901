//! Money amounts using decimal arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
///
/// Arithmetic is done on the raw [`Decimal`]; [`Amount::round_cents`] is
/// applied to values that get shown or stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Value in the currency's standard unit (pesos, not centavos).
    pub value: Decimal,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Amount {
    /// Create a new amount.
    #[must_use]
    pub const fn new(value: Decimal, currency: CurrencyCode) -> Self {
        Self { value, currency }
    }

    /// Round a decimal to cents, half away from zero.
    #[must_use]
    pub fn round_cents(value: Decimal) -> Decimal {
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{:.2} {}",
            self.currency.symbol(),
            Self::round_cents(self.value),
            self.currency.code()
        )
    }
}

/// ISO 4217 currency codes the marketplace operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    MXN,
    USD,
    EUR,
    COP,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::MXN | Self::USD | Self::COP => "$",
            Self::EUR => "€",
        }
    }

    /// Three-letter code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MXN => "MXN",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::COP => "COP",
        }
    }
}

/// Error parsing a [`CurrencyCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl std::str::FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MXN" => Ok(Self::MXN),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "COP" => Ok(Self::COP),
            _ => Err(UnknownCurrency(s.to_owned())),
        }
    }
}
