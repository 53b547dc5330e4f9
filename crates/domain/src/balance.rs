use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tierscope_core::{AppError, AppResult};

/// Maximum number of fractional digits stored for an amount.
const AMOUNT_SCALE: u32 = 8;

/// Exclusive bound on the magnitude of any stored amount, 10^12.
///
/// Amounts are stored as `NUMERIC(20, 8)`, which leaves twelve integer digits.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Currencies tracked per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
    /// Canadian dollar.
    Cad,
    /// Platform crypto asset.
    Crypto,
}

impl Currency {
    /// Returns a stable storage value for this currency.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
            Self::Cad => "cad",
            Self::Crypto => "crypto",
        }
    }

    /// Returns all tracked currencies.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Currency] = &[Currency::Usd, Currency::Eur, Currency::Cad, Currency::Crypto];

        ALL
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            "cad" => Ok(Self::Cad),
            "crypto" => Ok(Self::Crypto),
            _ => Err(AppError::Validation(format!(
                "unknown currency value '{value}'"
            ))),
        }
    }
}

/// Validated signed balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta(Decimal);

impl BalanceDelta {
    /// Creates a non-zero adjustment with at most eight fractional digits.
    pub fn new(value: Decimal) -> AppResult<Self> {
        if value.is_zero() {
            return Err(AppError::Validation(
                "balance adjustment must not be zero".to_owned(),
            ));
        }

        if value.abs() >= MAX_AMOUNT {
            return Err(AppError::Validation(format!(
                "balance adjustment must be smaller than {MAX_AMOUNT} in magnitude"
            )));
        }

        if value.normalize().scale() > AMOUNT_SCALE {
            return Err(AppError::Validation(format!(
                "balance adjustment supports at most {AMOUNT_SCALE} decimal places"
            )));
        }

        Ok(Self(value))
    }

    /// Parses an adjustment from its transport string.
    pub fn parse(value: &str) -> AppResult<Self> {
        let decimal = Decimal::from_str(value.trim()).map_err(|error| {
            AppError::Validation(format!("invalid balance adjustment '{value}': {error}"))
        })?;
        Self::new(decimal)
    }

    /// Returns the signed amount.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true for withdrawals.
    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.0.is_sign_negative()
    }
}
