//! Secure wallet implementation
//!
//! SECURITY: This is the ONLY place where private key material exists.
//! - The key string is wrapped in `SecretString` from the moment it is read
//! - Keys are never serialized to JSON and never logged
//! - Only the derived address and the alloy signing wallet leave this module

use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the hex-encoded signing key.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Wallet that protects the signing key.
///
/// The key lives inside alloy's `PrivateKeySigner`; this type exposes only
/// the address and the `EthereumWallet` needed to attach a signer to a
/// provider.
pub struct SecureWallet {
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy provider integration
    wallet: EthereumWallet,
}

impl SecureWallet {
    /// Load the signing key from the `PRIVATE_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(PRIVATE_KEY_ENV)
            .map(SecretString::from)
            .map_err(|_| {
                Error::Wallet(format!(
                    "Environment variable {PRIVATE_KEY_ENV} not set. Required for transaction signing."
                ))
            })?;

        Self::from_secret(&key)
    }

    /// Build from key material already wrapped in a secret.
    pub fn from_secret(key: &SecretString) -> Result<Self> {
        // Remove 0x prefix if present
        let key_hex = key.expose_secret().trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {e}")))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        Ok(Self { address, wallet })
    }

    /// The public address (safe to share).
    pub fn address(&self) -> Address {
        self.address
    }

    /// The `EthereumWallet` for use with alloy providers.
    ///
    /// Safe to hand out: it exposes signing operations, not the raw key.
    pub fn wallet(&self) -> &EthereumWallet {
        &self.wallet
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test key (DO NOT use with real funds!)
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn derives_address_from_key() {
        let key = SecretString::from(TEST_KEY.to_string());
        let wallet = SecureWallet::from_secret(&key).unwrap();

        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn accepts_key_without_prefix() {
        let key = SecretString::from(TEST_KEY.trim_start_matches("0x").to_string());
        let wallet = SecureWallet::from_secret(&key).unwrap();
        assert_ne!(wallet.address(), Address::ZERO);
    }

    #[test]
    fn rejects_garbage_key() {
        let key = SecretString::from("not-a-key".to_string());
        assert!(SecureWallet::from_secret(&key).is_err());
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = SecretString::from(TEST_KEY.to_string());
        let wallet = SecureWallet::from_secret(&key).unwrap();

        let debug_str = format!("{wallet:?}");
        assert!(!debug_str.contains("ac0974bec"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
