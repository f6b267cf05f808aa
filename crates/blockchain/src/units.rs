use shared::{Error, Result};

/// Render a base-unit amount as a decimal string.
///
/// Trailing fractional zeros are trimmed but at least one fractional digit
/// is kept, so `10^18` with 18 decimals renders as `"1.0"`.
pub fn format_units(raw: u128, decimals: u8) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return format!("{}.0", digits);
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    format!("{}.{}", whole, fraction)
}

/// Decode a `0x`-prefixed JSON-RPC quantity or ABI word into a `u128`.
///
/// Empty payloads (`"0x"`) are rejected: a call against an address with no
/// code returns nothing, which must not be mistaken for zero.
pub fn parse_hex_u128(value: &str) -> Result<u128> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| Error::EvmRpc(format!("Expected 0x-prefixed hex, got '{}'", value)))?;

    if digits.is_empty() {
        return Err(Error::EvmRpc("Empty hex payload".to_string()));
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }

    if significant.len() > 32 {
        return Err(Error::EvmRpc(format!(
            "Value {} does not fit in 128 bits",
            value
        )));
    }

    u128::from_str_radix(significant, 16)
        .map_err(|e| Error::EvmRpc(format!("Invalid hex value '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_one_ether() {
        assert_eq!(format_units(1_000_000_000_000_000_000, 18), "1.0");
    }

    #[test]
    fn test_format_fractional() {
        assert_eq!(format_units(1_500_000_000_000_000_000, 18), "1.5");
        assert_eq!(format_units(1, 18), "0.000000000000000001");
        assert_eq!(format_units(123_456_789, 6), "123.456789");
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_units(0, 18), "0.0");
        assert_eq!(format_units(0, 0), "0.0");
    }

    #[test]
    fn test_format_no_decimals() {
        assert_eq!(format_units(42, 0), "42.0");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_hex_u128("0x0").unwrap(), 0);
        assert_eq!(parse_hex_u128("0xde0b6b3a7640000").unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(parse_hex_u128("0x10").unwrap(), 16);
    }

    #[test]
    fn test_parse_abi_word() {
        let word = format!("0x{:064x}", 18u8);
        assert_eq!(parse_hex_u128(&word).unwrap(), 18);
    }

    #[test]
    fn test_parse_rejects_empty_payload() {
        assert!(parse_hex_u128("0x").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert!(parse_hex_u128("1234").is_err());
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let word = format!("0x1{}", "0".repeat(32));
        assert!(parse_hex_u128(&word).is_err());
    }
}
