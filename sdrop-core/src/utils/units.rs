use rust_decimal::Decimal;
use sdrop_sdk::objects::BASE_UNITS_PER_TOKEN;

const TOKEN_DECIMALS: u32 = 12;

/// Render a base-unit amount as whole tokens, e.g. `1500000000000` -> `1.5`.
///
/// Amounts beyond the 96-bit range of [`Decimal`] are shown truncated to
/// whole tokens.
pub fn format_tokens(amount: u128) -> String {
    i128::try_from(amount)
        .ok()
        .and_then(|units| Decimal::try_from_i128_with_scale(units, TOKEN_DECIMALS).ok())
        .map(|tokens| tokens.normalize().to_string())
        .unwrap_or_else(|| (amount / BASE_UNITS_PER_TOKEN).to_string())
}
