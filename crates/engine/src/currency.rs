use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code used to label amounts on reports.
///
/// The engine computes in plain `f64` values: the purchase side is priced in
/// a *foreign* currency and converted with the manual exchange rate, while
/// landed cost, target prices and profit are in the *local* currency. The two
/// codes only matter for presentation (print rendering and the admin CLI).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Myr,
    Usd,
    Cny,
    Eur,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Myr => "MYR",
            Currency::Usd => "USD",
            Currency::Cny => "CNY",
            Currency::Eur => "EUR",
        }
    }

    /// Short symbol printed in front of amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Myr => "RM",
            Currency::Usd => "$",
            Currency::Cny => "¥",
            Currency::Eur => "€",
        }
    }

    /// Number of fraction digits used when formatting amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        2
    }

    /// Formats `amount` with the currency symbol and its fraction digits.
    #[must_use]
    pub fn format(self, amount: f64) -> String {
        format!(
            "{} {:.*}",
            self.symbol(),
            usize::from(self.minor_units()),
            amount
        )
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MYR" | "RM" => Ok(Currency::Myr),
            "USD" => Ok(Currency::Usd),
            "CNY" | "RMB" => Ok(Currency::Cny),
            "EUR" => Ok(Currency::Eur),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

/// The pair of currencies a worksheet is priced in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub foreign: Currency,
    pub local: Currency,
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self {
            foreign: Currency::Usd,
            local: Currency::Myr,
        }
    }
}
