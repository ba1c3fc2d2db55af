use std::{fmt, str::FromStr};

use thiserror::Error;

/// Number of fraction digits carried by every stored amount.
pub const DECIMAL_PLACES: u32 = 2;

const MINOR_PER_UNIT: i64 = 100;

/// Smallest accepted ledger amount, in minor units (`1.00`).
pub const MIN_AMOUNT_MINOR: i64 = MINOR_PER_UNIT;

/// Fixed-point money amount represented as **integer minor units** (cents).
///
/// Ledger amounts are stored and compared as integers to avoid floating-point
/// drift; they are rendered back with exactly two decimals.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount = Amount::from_minor(2500_00);
/// assert_eq!(amount.to_string(), "2500.00");
/// assert_eq!("2500".parse::<Amount>().unwrap(), amount);
/// assert_eq!("10.5".parse::<Amount>().unwrap().minor(), 1050);
/// assert!("12.345".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

/// Why a submitted amount was rejected.
///
/// The `Display` text is the user-facing message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("A valid number is required.")]
    Invalid,
    #[error("Ensure that there are no more than 2 decimal places.")]
    TooManyDecimals,
    #[error("Ensure that there are no more than {0} digits in total.")]
    TooManyDigits(u32),
    #[error("Ensure that there are no more than {0} digits before the decimal point.")]
    TooManyWholeDigits(u32),
    #[error("Ensure this value is greater than or equal to 1.")]
    BelowMinimum,
}

/// Precision limits of a ledger column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmountLimits {
    /// Max significant digits, fraction included.
    pub max_digits: u32,
}

impl AmountLimits {
    pub const INCOME: AmountLimits = AmountLimits { max_digits: 12 };
    pub const EXPENDITURE: AmountLimits = AmountLimits { max_digits: 6 };

    const fn max_whole_digits(self) -> u32 {
        self.max_digits - DECIMAL_PLACES
    }
}

impl Amount {
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Parse user input and enforce the column limits plus the `>= 1`
    /// minimum.
    pub fn parse_with_limits(raw: &str, limits: AmountLimits) -> Result<Self, AmountError> {
        let parsed = ParsedDecimal::parse(raw)?;

        if parsed.total_digits() > limits.max_digits {
            return Err(AmountError::TooManyDigits(limits.max_digits));
        }
        if parsed.whole_digits() > limits.max_whole_digits() {
            return Err(AmountError::TooManyWholeDigits(limits.max_whole_digits()));
        }

        let amount = parsed.to_amount()?;
        if amount.0 < MIN_AMOUNT_MINOR {
            return Err(AmountError::BelowMinimum);
        }
        Ok(amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / MINOR_PER_UNIT.unsigned_abs();
        let cents = abs % MINOR_PER_UNIT.unsigned_abs();
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses a decimal string into minor units, without column limits.
    ///
    /// Accepts `.` as the only decimal separator and an optional leading
    /// `+`/`-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParsedDecimal::parse(s)?.to_amount()
    }
}

/// Digits of a decimal literal, split around the separator.
struct ParsedDecimal {
    negative: bool,
    whole: String,
    fraction: String,
}

impl ParsedDecimal {
    fn parse(raw: &str) -> Result<Self, AmountError> {
        let trimmed = raw.trim();
        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let mut parts = rest.split('.');
        let whole = parts.next().unwrap_or_default();
        let fraction = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(AmountError::Invalid);
        }

        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountError::Invalid);
        }
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(AmountError::Invalid);
        }
        if fraction.len() > DECIMAL_PLACES as usize {
            return Err(AmountError::TooManyDecimals);
        }

        Ok(Self {
            negative,
            whole: whole.trim_start_matches('0').to_string(),
            fraction: fraction.to_string(),
        })
    }

    fn whole_digits(&self) -> u32 {
        u32::try_from(self.whole.len()).unwrap_or(u32::MAX)
    }

    fn total_digits(&self) -> u32 {
        let fraction = u32::try_from(self.fraction.len()).unwrap_or(u32::MAX);
        self.whole_digits().saturating_add(fraction)
    }

    fn to_amount(&self) -> Result<Amount, AmountError> {
        let units: i64 = if self.whole.is_empty() {
            0
        } else {
            self.whole.parse().map_err(|_| AmountError::Invalid)?
        };
        let cents: i64 = match self.fraction.len() {
            0 => 0,
            1 => self.fraction.parse::<i64>().map_err(|_| AmountError::Invalid)? * 10,
            _ => self.fraction.parse().map_err(|_| AmountError::Invalid)?,
        };

        let total = units
            .checked_mul(MINOR_PER_UNIT)
            .and_then(|v| v.checked_add(cents))
            .ok_or(AmountError::Invalid)?;

        Ok(Amount(if self.negative { -total } else { total }))
    }
}
