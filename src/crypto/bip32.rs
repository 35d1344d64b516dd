//! BIP32 - klucz główny z seeda i derywacja hardened (CKDpriv)

use hmac::{Hmac, Mac};
use secp256k1::{Scalar, SecretKey};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{AlfaBip85Error, Result};
use crate::path::HARDENED_OFFSET;

pub(crate) type HmacSha512 = Hmac<Sha512>;

/// Klucz HMAC dla klucza głównego BIP32
const MASTER_KEY_DOMAIN: &[u8] = b"Bitcoin seed";

/// Para (klucz prywatny, chain code) - czyszczona przy drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedKey {
    /// I = HMAC-SHA512(key="Bitcoin seed", data=seed); klucz = I_L, chain code = I_R
    pub fn master(seed: &[u8]) -> Result<Self> {
        let mut mac = HmacSha512::new_from_slice(MASTER_KEY_DOMAIN)
            .map_err(|_| AlfaBip85Error::DerivationFailed("HMAC init failed".into()))?;
        mac.update(seed);
        let mut i = mac.finalize().into_bytes();

        let extended = Self::split(&i);
        i.as_mut_slice().zeroize();
        let extended = extended?;

        // I_L musi być poprawnym skalarem secp256k1 (0 < I_L < n)
        let mut sk = SecretKey::from_slice(&extended.key)
            .map_err(|_| AlfaBip85Error::DerivationFailed("invalid master key".into()))?;
        sk.non_secure_erase();

        Ok(extended)
    }

    /// Derywacja dziecka hardened: dane = 0x00 || ser256(k_par) || ser32(i)
    pub fn derive_hardened(&self, index: u32) -> Result<Self> {
        if index & HARDENED_OFFSET == 0 {
            return Err(AlfaBip85Error::DerivationFailed(
                "non-hardened derivation requested".into(),
            ));
        }

        let mut mac = HmacSha512::new_from_slice(&self.chain_code)
            .map_err(|_| AlfaBip85Error::DerivationFailed("HMAC init failed".into()))?;
        let mut data = [0u8; 1 + 32 + 4];
        data[1..33].copy_from_slice(&self.key);
        data[33..].copy_from_slice(&index.to_be_bytes());
        mac.update(&data);
        data.zeroize();

        let mut i = mac.finalize().into_bytes();
        let mut il = [0u8; 32];
        il.copy_from_slice(&i[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        i.as_mut_slice().zeroize();

        let child = Self::add_tweak(&self.key, &il);
        il.zeroize();

        match child {
            Ok(key) => Ok(Self { key, chain_code }),
            Err(e) => {
                chain_code.zeroize();
                Err(e)
            }
        }
    }

    /// Przechodzi kolejno przez podane indeksy (każdy musi być hardened)
    pub fn derive_path(&self, components: &[u32]) -> Result<Self> {
        let mut current = self.derive_hardened(*components.first().ok_or_else(|| {
            AlfaBip85Error::DerivationFailed("empty derivation path".into())
        })?)?;
        for &component in &components[1..] {
            current = current.derive_hardened(component)?;
        }
        Ok(current)
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    fn split(i: &[u8]) -> Result<Self> {
        if i.len() != 64 {
            return Err(AlfaBip85Error::DerivationFailed("unexpected HMAC output size".into()));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&i[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        Ok(Self { key, chain_code })
    }

    // k_child = (I_L + k_par) mod n; I_L >= n lub wynik 0 -> dziecko niepoprawne
    fn add_tweak(parent: &[u8; 32], il: &[u8; 32]) -> Result<[u8; 32]> {
        let tweak = Scalar::from_be_bytes(*il)
            .map_err(|_| AlfaBip85Error::DerivationFailed("invalid child key".into()))?;
        let parent_key = SecretKey::from_slice(parent)
            .map_err(|_| AlfaBip85Error::DerivationFailed("invalid parent key".into()))?;
        let mut child = parent_key
            .add_tweak(&tweak)
            .map_err(|_| AlfaBip85Error::DerivationFailed("invalid child key".into()))?;
        let bytes = child.secret_bytes();
        child.non_secure_erase();
        Ok(bytes)
    }
}

impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ExtendedKey([REDACTED])")
    }
}
