//! Czyszczenie pamięci z materiałem pochodnym seeda
//!
//! Czyszczenie jest best-effort: nadpisujemy bufor, którym zarządzamy, ale nie
//! mamy kontroli nad kopiami zrobionymi przez kompilator (rejestry, spill na
//! stos) ani przez biblioteki zewnętrzne (HMAC, secp256k1, bip39).

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// Domyślna liczba przebiegów losowych
pub const DEFAULT_CLEAR_PASSES: u32 = 3;

/// Nadpisuje bufor losowymi bajtami (domyślnie 3 przebiegi), potem zeruje
pub fn secure_clear(buffer: &mut [u8]) {
    secure_clear_passes(buffer, DEFAULT_CLEAR_PASSES);
}

/// Jak `secure_clear`, z zadaną liczbą przebiegów
pub fn secure_clear_passes(buffer: &mut [u8], passes: u32) {
    secure_clear_with(buffer, passes, &mut rand::thread_rng());
}

fn secure_clear_with<R: RngCore + CryptoRng>(buffer: &mut [u8], passes: u32, rng: &mut R) {
    if buffer.is_empty() {
        return;
    }
    for _ in 0..passes {
        rng.fill_bytes(buffer);
    }
    // Zapis volatile + fence - nie zostanie wycięty przez optymalizator
    buffer.zeroize();
}

/// Bufor z automatycznym czyszczeniem przy drop
pub struct SecureBuffer {
    data: Vec<u8>,
    passes: u32,
}

impl SecureBuffer {
    pub fn from_slice(slice: &[u8]) -> Self {
        Self {
            data: slice.to_vec(),
            passes: DEFAULT_CLEAR_PASSES,
        }
    }

    /// Ustawia liczbę przebiegów losowych przy drop (0 = samo zerowanie)
    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        secure_clear_passes(&mut self.data, self.passes);
    }
}

impl std::ops::Deref for SecureBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl std::ops::DerefMut for SecureBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl std::fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureBuffer([REDACTED; {}])", self.data.len())
    }
}

/// Tablica o stałym rozmiarze z automatycznym czyszczeniem
pub struct SecureArray<const N: usize> {
    data: [u8; N],
    passes: u32,
}

impl<const N: usize> SecureArray<N> {
    pub fn new() -> Self {
        Self {
            data: [0u8; N],
            passes: DEFAULT_CLEAR_PASSES,
        }
    }

    pub fn from_array(arr: [u8; N]) -> Self {
        Self {
            data: arr,
            passes: DEFAULT_CLEAR_PASSES,
        }
    }

    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }

    pub fn as_array(&self) -> &[u8; N] {
        &self.data
    }

    pub fn as_mut_array(&mut self) -> &mut [u8; N] {
        &mut self.data
    }
}

impl<const N: usize> Default for SecureArray<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Drop for SecureArray<N> {
    fn drop(&mut self) {
        secure_clear_passes(&mut self.data, self.passes);
    }
}

impl<const N: usize> std::fmt::Debug for SecureArray<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureArray([REDACTED; {}])", N)
    }
}
