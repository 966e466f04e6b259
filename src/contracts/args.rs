//! Conversions from plain Rust values into the `ScVal` shapes the contracts expect

use anyhow::{Context, Result};
use stellar_strkey::Strkey;
use stellar_xdr::curr::{
    AccountId, Hash, Int256Parts, PublicKey, ScAddress, ScSymbol, ScVal, Uint256,
};

/// Parse an account (`G...`) or contract (`C...`) strkey into an address value
pub fn address(value: &str) -> Result<ScVal> {
    let strkey = Strkey::from_string(value)
        .with_context(|| format!("Failed to parse address {}", value))?;

    let address = match strkey {
        Strkey::PublicKeyEd25519(pk) => {
            ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(pk.0))))
        }
        Strkey::Contract(contract) => ScAddress::Contract(Hash(contract.0)),
        _ => anyhow::bail!("Address {} is neither an account nor a contract", value),
    };

    Ok(ScVal::Address(address))
}

/// Encode a monetary amount as a signed 256-bit integer
///
/// The upper 128 bits are the sign extension of `amount`. Amounts are taken
/// as `i128`, so values beyond the i128 range cannot be expressed; every
/// accepted value is encoded exactly.
pub fn i256(amount: i128) -> ScVal {
    let sign = if amount < 0 { u64::MAX } else { 0 };

    ScVal::I256(Int256Parts {
        hi_hi: sign as i64,
        hi_lo: sign,
        lo_hi: (amount >> 64) as u64,
        lo_lo: amount as u64,
    })
}

pub fn u32(value: u32) -> ScVal {
    ScVal::U32(value)
}

/// Encode short text as a symbol; only the 32 byte limit is enforced locally
pub fn symbol(value: &str) -> Result<ScVal> {
    let symbol = ScSymbol(
        value
            .try_into()
            .with_context(|| format!("Symbol '{}' is longer than 32 bytes", value))?,
    );
    Ok(ScVal::Symbol(symbol))
}
