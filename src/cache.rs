//! Ograniczony cache LRU wyników derywacji
//!
//! Klucz zawiera tylko odcisk seeda (HMAC-SHA256 z losową solą instancji),
//! nigdy sam seed. Profil derywatora (koder mnemoników + bramka jakości) jest
//! częścią klucza, więc współdzielony cache nie miesza wyników różnych konfiguracji.

use std::num::NonZeroUsize;

use hmac::{Hmac, Mac};
use lru::LruCache;
use parking_lot::Mutex;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::apps::{ApplicationOutput, FormatSpec};
use crate::error::{AlfaBip85Error, Result};

/// Domyślna pojemność cache
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    seed_fingerprint: [u8; 32],
    application: u32,
    length: u32,
    index: u32,
    extras_hash: u64,
    profile: u64,
}

/// Liczniki cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub cleanups: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheState {
    entries: LruCache<CacheKey, ApplicationOutput>,
    hits: u64,
    misses: u64,
    evictions: u64,
    cleanups: u64,
}

/// Cache wyników - jedna blokada wokół lookup/insert/evict
pub struct DerivationCache {
    state: Mutex<CacheState>,
    fingerprint_salt: Zeroizing<[u8; 32]>,
}

impl DerivationCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        let mut salt = Zeroizing::new([0u8; 32]);
        rand::thread_rng().fill_bytes(&mut salt[..]);

        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
                cleanups: 0,
            }),
            fingerprint_salt: salt,
        }
    }

    /// Zwraca wynik z cache lub oblicza go przez `compute` i zapisuje.
    /// `profile` to odcisk konfiguracji derywatora, który liczy wynik.
    pub fn get_or_try_insert<F>(
        &self,
        seed: &[u8],
        spec: &FormatSpec,
        index: u32,
        profile: u64,
        compute: F,
    ) -> Result<ApplicationOutput>
    where
        F: FnOnce() -> Result<ApplicationOutput>,
    {
        let key = self.key(seed, spec, index, profile)?;

        {
            let mut state = self.state.lock();
            if let Some(hit) = state.entries.get(&key).cloned() {
                state.hits += 1;
                tracing::trace!(index, application = spec.application().code(), "cache hit");
                return Ok(hit);
            }
            state.misses += 1;
        }

        // Obliczenie poza blokadą - wynik jest deterministyczny
        let output = compute()?;

        let mut state = self.state.lock();
        if let Some((evicted_key, _)) = state.entries.push(key, output.clone()) {
            if evicted_key != key {
                state.evictions += 1;
                tracing::trace!("cache eviction");
            }
        }
        Ok(output)
    }

    pub fn contains(
        &self,
        seed: &[u8],
        spec: &FormatSpec,
        index: u32,
        profile: u64,
    ) -> Result<bool> {
        let key = self.key(seed, spec, index, profile)?;
        Ok(self.state.lock().entries.contains(&key))
    }

    /// Usuwa wszystkie wpisy
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let removed = state.entries.len();
        state.entries.clear();
        state.cleanups += 1;
        tracing::info!(removed, "derivation cache cleared");
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            cleanups: state.cleanups,
            entries: state.entries.len(),
            capacity: state.entries.cap().get(),
        }
    }

    fn key(&self, seed: &[u8], spec: &FormatSpec, index: u32, profile: u64) -> Result<CacheKey> {
        Ok(CacheKey {
            seed_fingerprint: self.seed_fingerprint(seed)?,
            application: spec.application().code(),
            length: spec.length(),
            index,
            extras_hash: extras_hash(spec),
            profile,
        })
    }

    fn seed_fingerprint(&self, seed: &[u8]) -> Result<[u8; 32]> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.fingerprint_salt[..])
            .map_err(|_| AlfaBip85Error::DerivationFailed("HMAC init failed".into()))?;
        mac.update(seed);
        let digest = mac.finalize().into_bytes();
        let mut fingerprint = [0u8; 32];
        fingerprint.copy_from_slice(&digest);
        Ok(fingerprint)
    }
}

impl Default for DerivationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

fn extras_hash(spec: &FormatSpec) -> u64 {
    descriptor_hash(&spec.extras_descriptor())
}

/// Pierwsze 8 bajtów SHA-256 kanonicznego opisu
pub(crate) fn descriptor_hash(descriptor: &str) -> u64 {
    let digest = Sha256::digest(descriptor.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}
