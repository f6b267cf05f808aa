use shared::{Error, Result};

/// The one definition of a well-formed address used across the crate
pub trait AddressValidator: Send + Sync {
    fn is_valid_address(&self, address: &str) -> bool;

    /// Fails with `Error::InvalidAddress` when the check does not pass
    fn validate(&self, address: &str) -> Result<()> {
        if self.is_valid_address(address) {
            Ok(())
        } else {
            Err(Error::InvalidAddress(address.to_string()))
        }
    }
}

/// EVM-style address check: `0x` followed by exactly 40 hex characters
#[derive(Debug, Clone, Copy, Default)]
pub struct EvmAddressValidator;

impl AddressValidator for EvmAddressValidator {
    fn is_valid_address(&self, address: &str) -> bool {
        is_evm_address(address)
    }
}

pub fn is_evm_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
