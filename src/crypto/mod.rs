//! Moduł kryptograficzny - BIP32, entropia BIP85, czyszczenie pamięci

mod bip32;
mod entropy;
mod zeroize_utils;

pub use bip32::ExtendedKey;
pub use entropy::{
    derive_entropy, derive_entropy_block, validate_output_bytes, validate_seed, EntropyStream,
    BIP85_ENTROPY_DOMAIN, MASTER_SEED_LEN, MAX_OUTPUT_BYTES,
};
pub use zeroize_utils::{
    secure_clear, secure_clear_passes, SecureArray, SecureBuffer, DEFAULT_CLEAR_PASSES,
};

use secrecy::{ExposeSecret, SecretBox};

use crate::error::Result;

/// Master seed (64 bajty) - nigdy nie trafia do logów ani cache
pub struct MasterSeed(SecretBox<[u8; MASTER_SEED_LEN]>);

impl MasterSeed {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        validate_seed(bytes)?;
        let mut seed = Box::new([0u8; MASTER_SEED_LEN]);
        seed.copy_from_slice(bytes);
        Ok(Self(SecretBox::new(seed)))
    }

    pub fn from_array(bytes: [u8; MASTER_SEED_LEN]) -> Self {
        Self(SecretBox::new(Box::new(bytes)))
    }

    pub fn expose(&self) -> &[u8; MASTER_SEED_LEN] {
        self.0.expose_secret()
    }
}

impl AsRef<[u8]> for MasterSeed {
    fn as_ref(&self) -> &[u8] {
        self.expose()
    }
}

impl std::fmt::Debug for MasterSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterSeed([REDACTED])")
    }
}
