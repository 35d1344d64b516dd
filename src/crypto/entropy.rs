//! Silnik derywacji BIP85: seed -> BIP32 -> HMAC-SHA512("bip-entropy-from-k", k)

use hmac::Mac;
use zeroize::{Zeroize, Zeroizing};

use super::bip32::{ExtendedKey, HmacSha512};
use super::zeroize_utils::{SecureArray, SecureBuffer};
use crate::error::{AlfaBip85Error, Result};
use crate::path::{DerivationPath, MAX_INDEX};

/// Wymagana długość master seed
pub const MASTER_SEED_LEN: usize = 64;

/// Maksymalna liczba bajtów z jednej derywacji
pub const MAX_OUTPUT_BYTES: usize = 64;

/// Klucz HMAC dla entropii BIP85
pub const BIP85_ENTROPY_DOMAIN: &[u8] = b"bip-entropy-from-k";

pub fn validate_seed(seed: &[u8]) -> Result<()> {
    if seed.len() != MASTER_SEED_LEN {
        return Err(AlfaBip85Error::InvalidMasterSeed {
            expected: MASTER_SEED_LEN,
            actual: seed.len(),
        });
    }
    Ok(())
}

pub fn validate_output_bytes(output_bytes: usize) -> Result<()> {
    if !(1..=MAX_OUTPUT_BYTES).contains(&output_bytes) {
        return Err(AlfaBip85Error::InvalidOutputLength {
            value: output_bytes,
            min: 1,
            max: MAX_OUTPUT_BYTES,
        });
    }
    Ok(())
}

/// Pełny 64-bajtowy blok entropii dla ścieżki
pub fn derive_entropy_block(
    seed: &[u8],
    path: &DerivationPath,
    clear_passes: u32,
) -> Result<SecureArray<64>> {
    validate_seed(seed)?;
    check_hardenable(path)?;

    let master = ExtendedKey::master(seed)?;
    let child = master.derive_path(&path.hardened_components())?;

    let mut mac = HmacSha512::new_from_slice(BIP85_ENTROPY_DOMAIN)
        .map_err(|_| AlfaBip85Error::DerivationFailed("HMAC init failed".into()))?;
    mac.update(child.private_key());
    let mut digest = mac.finalize().into_bytes();

    let mut block = SecureArray::<64>::new().with_passes(clear_passes);
    block.as_mut_array().copy_from_slice(&digest);
    digest.as_mut_slice().zeroize();

    tracing::debug!(
        application = path.application(),
        length = path.length(),
        index = path.index(),
        "derived BIP85 entropy block"
    );

    Ok(block)
}

// Poziom hardened przenosi tylko 31 bitów wartości
fn check_hardenable(path: &DerivationPath) -> Result<()> {
    if path.application() > MAX_INDEX {
        return Err(AlfaBip85Error::InvalidApplication {
            value: path.application() as i64,
            max: MAX_INDEX,
        });
    }
    if path.length() > MAX_INDEX {
        return Err(AlfaBip85Error::InvalidLength {
            value: path.length() as i64,
            max: MAX_INDEX,
        });
    }
    Ok(())
}

/// Entropia przycięta do `output_bytes` (1..=64)
pub fn derive_entropy(
    seed: &[u8],
    path: &DerivationPath,
    output_bytes: usize,
    clear_passes: u32,
) -> Result<SecureBuffer> {
    validate_output_bytes(output_bytes)?;
    let block = derive_entropy_block(seed, path, clear_passes)?;
    Ok(SecureBuffer::from_slice(&block.as_array()[..output_bytes]).with_passes(clear_passes))
}

/// Deterministyczny strumień bajtów: blok_0 = entropia BIP85,
/// blok_i = HMAC-SHA512(key = domena || be32(i), msg = blok_{i-1})
pub struct EntropyStream {
    block: SecureArray<64>,
    position: usize,
    counter: u32,
}

impl EntropyStream {
    pub fn new(block: SecureArray<64>) -> Self {
        Self {
            block,
            position: 0,
            counter: 0,
        }
    }

    pub fn next_byte(&mut self) -> Result<u8> {
        if self.position == MAX_OUTPUT_BYTES {
            self.extend()?;
        }
        let byte = self.block.as_array()[self.position];
        self.position += 1;
        Ok(byte)
    }

    /// Liczba bloków dołożonych ponad pierwszy
    pub fn extensions(&self) -> u32 {
        self.counter
    }

    fn extend(&mut self) -> Result<()> {
        self.counter = self.counter.checked_add(1).ok_or_else(|| {
            AlfaBip85Error::DerivationFailed("entropy stream exhausted".into())
        })?;

        let mut key = Zeroizing::new(Vec::with_capacity(BIP85_ENTROPY_DOMAIN.len() + 4));
        key.extend_from_slice(BIP85_ENTROPY_DOMAIN);
        key.extend_from_slice(&self.counter.to_be_bytes());

        let mut mac = HmacSha512::new_from_slice(&key)
            .map_err(|_| AlfaBip85Error::DerivationFailed("HMAC init failed".into()))?;
        mac.update(self.block.as_array());
        let mut digest = mac.finalize().into_bytes();
        self.block.as_mut_array().copy_from_slice(&digest);
        digest.as_mut_slice().zeroize();

        self.position = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: [u8; 64] = [0xAA; 64];

    fn raw(seed: &[u8], application: u32, length: u32, index: u32, n: usize) -> Result<Vec<u8>> {
        let path = DerivationPath::new(application, length, index)?;
        Ok(derive_entropy(seed, &path, n, 0)?.to_vec())
    }

    #[test]
    fn test_rejects_short_seed() {
        assert!(matches!(
            raw(&[0u8; 32], 128, 32, 0, 32),
            Err(AlfaBip85Error::InvalidMasterSeed { expected: 64, actual: 32 })
        ));
    }

    #[test]
    fn test_output_length_bounds() {
        assert!(matches!(
            raw(&SEED, 128, 32, 0, 0),
            Err(AlfaBip85Error::InvalidOutputLength { .. })
        ));
        assert!(matches!(
            raw(&SEED, 128, 32, 0, 65),
            Err(AlfaBip85Error::InvalidOutputLength { .. })
        ));
        for n in 1..=64 {
            assert_eq!(raw(&SEED, 128, 32, 0, n).unwrap().len(), n);
        }
    }

    #[test]
    fn test_rejects_unhardenable_components() {
        assert!(matches!(
            raw(&SEED, 1 << 31, 32, 0, 32),
            Err(AlfaBip85Error::InvalidApplication { .. })
        ));
        assert!(matches!(
            raw(&SEED, 128, u32::MAX, 0, 32),
            Err(AlfaBip85Error::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_truncation_is_prefix() {
        let full = raw(&SEED, 39, 12, 3, 64).unwrap();
        let short = raw(&SEED, 39, 12, 3, 16).unwrap();
        assert_eq!(&full[..16], &short[..]);
    }

    #[test]
    fn test_deterministic_and_sensitive() {
        let a = raw(&SEED, 128, 32, 0, 32).unwrap();
        let b = raw(&SEED, 128, 32, 0, 32).unwrap();
        let c = raw(&SEED, 128, 32, 1, 32).unwrap();
        let d = raw(&SEED, 39, 32, 0, 32).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_seed_sensitivity() {
        let other = [0xABu8; 64];
        let a = raw(&SEED, 128, 32, 0, 32).unwrap();
        let b = raw(&other, 128, 32, 0, 32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_stream_extends_deterministically() {
        let path = DerivationPath::new(9999, 128, 0).unwrap();
        let collect = || {
            let block = derive_entropy_block(&SEED, &path, 0).unwrap();
            let mut stream = EntropyStream::new(block);
            let bytes: Vec<u8> = (0..200).map(|_| stream.next_byte().unwrap()).collect();
            (bytes, stream.extensions())
        };
        let (first, extensions) = collect();
        let (second, _) = collect();
        assert_eq!(first, second);
        assert_eq!(extensions, 3);
        // Kolejne bloki różnią się od pierwszego
        assert_ne!(&first[..64], &first[64..128]);
    }

    #[test]
    fn test_stream_starts_with_block() {
        let path = DerivationPath::new(9999, 20, 1).unwrap();
        let block = derive_entropy_block(&SEED, &path, 0).unwrap();
        let expected = block.as_array().to_vec();
        let mut stream = EntropyStream::new(block);
        let head: Vec<u8> = (0..64).map(|_| stream.next_byte().unwrap()).collect();
        assert_eq!(head, expected);
        assert_eq!(stream.extensions(), 0);
    }
}
