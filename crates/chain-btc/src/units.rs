//! Exact satoshi, BTC and USD conversions.
//!
//! All arithmetic is done in [`Decimal`] (28 significant digits), so chained
//! conversions do not pick up binary floating point drift.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::BtcError;

/// Number of decimal places in one BTC.
pub const BTC_DECIMALS: u32 = 8;

/// Satoshis per BTC.
pub const SATOSHIS_PER_BTC: u64 = 10u64.pow(BTC_DECIMALS);

fn satoshis_per_btc() -> Decimal {
    Decimal::from(SATOSHIS_PER_BTC)
}

/// USD value of a single satoshi at `usd_per_btc`.
fn usd_per_satoshi(usd_per_btc: Decimal) -> Result<Decimal, BtcError> {
    if usd_per_btc <= Decimal::ZERO {
        return Err(BtcError::InvalidExchangeRate(format!(
            "price must be positive, got {usd_per_btc}"
        )));
    }
    usd_per_btc
        .checked_div(satoshis_per_btc())
        .ok_or_else(|| BtcError::InvalidExchangeRate(format!("cannot scale price {usd_per_btc}")))
}

/// `sat / 10^8`.
pub fn satoshi_to_btc(sat: impl Into<Decimal>) -> Decimal {
    let mut btc = sat.into() / satoshis_per_btc();
    btc.normalize_assign();
    btc
}

/// `btc * 10^8`.
///
/// Fails only when the product overflows the decimal range.
pub fn btc_to_satoshi(btc: Decimal) -> Result<Decimal, BtcError> {
    btc.checked_mul(satoshis_per_btc())
        .map(|sat| sat.normalize())
        .ok_or_else(|| BtcError::InvalidAmount(format!("{btc} BTC is out of range")))
}

/// `sat * (usd_per_btc / 10^8)`.
pub fn satoshi_to_usd(sat: impl Into<Decimal>, usd_per_btc: Decimal) -> Result<Decimal, BtcError> {
    let sat = sat.into();
    let unit_price = usd_per_satoshi(usd_per_btc)?;
    sat.checked_mul(unit_price)
        .map(|usd| usd.normalize())
        .ok_or_else(|| BtcError::InvalidAmount(format!("{sat} sat is out of range")))
}

/// `floor(usd / (usd_per_btc / 10^8))`.
///
/// Always rounds down, so the result never buys more than `usd` is worth.
pub fn usd_to_satoshi(usd: Decimal, usd_per_btc: Decimal) -> Result<u64, BtcError> {
    if usd < Decimal::ZERO {
        return Err(BtcError::InvalidAmount(format!("negative USD amount {usd}")));
    }
    let unit_price = usd_per_satoshi(usd_per_btc)?;
    let sat = usd
        .checked_div(unit_price)
        .ok_or_else(|| BtcError::InvalidAmount(format!("{usd} USD is out of range")))?
        .floor();
    sat.to_u64()
        .ok_or_else(|| BtcError::InvalidAmount(format!("{sat} sat does not fit in u64")))
}
