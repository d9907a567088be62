use alloy_primitives::U256;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    Empty,
    Negative,
    InvalidDigit(char),
    TooManyDecimals { max: u32 },
    Overflow,
}

impl fmt::Display for UnitsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnitsError::Empty => write!(f, "Amount is empty"),
            UnitsError::Negative => write!(f, "Amount must not be negative"),
            UnitsError::InvalidDigit(c) => write!(f, "Invalid character '{}' in amount", c),
            UnitsError::TooManyDecimals { max } => {
                write!(f, "Amount has more than {} decimal places", max)
            }
            UnitsError::Overflow => write!(f, "Amount does not fit in uint256"),
        }
    }
}

impl std::error::Error for UnitsError {}

fn ten_pow(decimals: u32) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Render base units as a decimal token amount with exactly `fixed` fractional
/// digits. Extra digits are truncated, never rounded.
///
/// `format_units(1_500_000_000_000_000_000, 18, 2)` → `"1.50"`
pub fn format_units(amount: U256, decimals: u32, fixed: usize) -> String {
    let base = ten_pow(decimals);
    let whole = amount / base;
    let frac = amount % base;
    if fixed == 0 {
        return whole.to_string();
    }
    let mut frac_str = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    if fixed <= frac_str.len() {
        frac_str.truncate(fixed);
    } else {
        frac_str.push_str(&"0".repeat(fixed - frac_str.len()));
    }
    format!("{}.{}", whole, frac_str)
}

/// Parse a decimal token amount (e.g. `"10.25"`) into base units.
pub fn parse_units(input: &str, decimals: u32) -> Result<U256, UnitsError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(UnitsError::Empty);
    }
    if s.starts_with('-') {
        return Err(UnitsError::Negative);
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::Empty);
    }
    if let Some(c) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(UnitsError::InvalidDigit(c));
    }
    if frac.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals { max: decimals });
    }

    let padded = format!("{}{:0<width$}", whole, frac, width = decimals as usize);
    let digits = padded.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| UnitsError::Overflow)
}
