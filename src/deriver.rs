//! Bip85Deriver - pełny przepływ: ścieżka -> granice -> derywacja -> jakość -> format -> cache

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::apps::{
    format_output, ApplicationOutput, Bip39Encoder, Charset, FormatSpec, MnemonicEncoder,
    MnemonicLanguage,
};
use crate::audit::SecurityAuditReport;
use crate::cache::{descriptor_hash, DerivationCache};
use crate::crypto::{derive_entropy, derive_entropy_block, validate_seed};
use crate::error::{AlfaBip85Error, Result};
use crate::path::{parse_path, DerivationPath};
use crate::policy::SecurityConfig;
use crate::security::{
    timing_attack_protection, validate_entropy_quality_with, validate_index_boundaries_with,
    Operation,
};

/// Derywator BIP85 z jawnie przekazaną konfiguracją i opcjonalnym cache
///
/// Seed można podać jako `&[u8]`, `&[u8; 64]` albo `&MasterSeed`.
pub struct Bip85Deriver {
    config: SecurityConfig,
    cache: Option<Arc<DerivationCache>>,
    encoder: Arc<dyn MnemonicEncoder>,
    profile: u64,
}

impl Bip85Deriver {
    pub fn new(config: SecurityConfig) -> Self {
        let encoder: Arc<dyn MnemonicEncoder> = Arc::new(Bip39Encoder);
        let profile = cache_profile(&config, encoder.as_ref());
        Self {
            config,
            cache: None,
            encoder,
            profile,
        }
    }

    /// Podpina cache. Może być współdzielony: wpisy są rozdzielone profilem
    /// derywatora (koder + ustawienia bramki jakości).
    pub fn with_cache(mut self, cache: Arc<DerivationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn MnemonicEncoder>) -> Self {
        self.profile = cache_profile(&self.config, encoder.as_ref());
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<DerivationCache>> {
        self.cache.as_ref()
    }

    /// Surowa entropia BIP85 (1..=64 bajtów) - bez testu jakości
    pub fn derive_entropy<S>(
        &self,
        seed: &S,
        application: u32,
        length: u32,
        index: u32,
        output_bytes: usize,
    ) -> Result<Zeroizing<Vec<u8>>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let _guard = timing_attack_protection(Operation::EntropyDerivation, &self.config);
        self.check_index(index, Operation::EntropyDerivation)?;
        let path = DerivationPath::new(application, length, index)?;
        let entropy = derive_entropy(
            seed.as_ref(),
            &path,
            output_bytes,
            self.config.effective_clear_passes(),
        )?;
        Ok(Zeroizing::new(entropy.to_vec()))
    }

    /// Surowa entropia dla ścieżki w zapisie kanonicznym
    pub fn derive_from_path<S>(
        &self,
        seed: &S,
        path: &str,
        output_bytes: usize,
    ) -> Result<Zeroizing<Vec<u8>>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let (application, length, index) = {
            let _guard = timing_attack_protection(Operation::PathValidation, &self.config);
            parse_path(path)?
        };
        self.derive_entropy(seed, application, length, index, output_bytes)
    }

    pub fn derive_bip39_mnemonic<S>(
        &self,
        seed: &S,
        word_count: u32,
        index: u32,
        language: MnemonicLanguage,
    ) -> Result<String>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let spec = FormatSpec::Mnemonic {
            word_count,
            language,
        };
        Ok(self.derive_output(seed, &spec, index)?.as_str().to_string())
    }

    pub fn derive_hex_entropy<S>(
        &self,
        seed: &S,
        byte_length: u32,
        index: u32,
        uppercase: bool,
    ) -> Result<String>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let spec = FormatSpec::Hex {
            byte_length,
            uppercase,
        };
        Ok(self.derive_output(seed, &spec, index)?.as_str().to_string())
    }

    pub fn derive_password<S>(
        &self,
        seed: &S,
        length: u32,
        index: u32,
        charset: Charset,
    ) -> Result<String>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let spec = FormatSpec::Password { length, charset };
        Ok(self.derive_output(seed, &spec, index)?.as_str().to_string())
    }

    /// Jeden wynik aplikacji; przez cache, jeśli jest podpięty
    pub fn derive_output<S>(
        &self,
        seed: &S,
        spec: &FormatSpec,
        index: u32,
    ) -> Result<ApplicationOutput>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let seed = seed.as_ref();
        let _guard = timing_attack_protection(spec.operation(), &self.config);
        spec.validate()?;
        self.check_index(index, spec.operation())?;
        validate_seed(seed)?;

        match &self.cache {
            Some(cache) => cache.get_or_try_insert(seed, spec, index, self.profile, || {
                self.compute(seed, spec, index)
            }),
            None => self.compute(seed, spec, index),
        }
    }

    /// Wyniki w kolejności `indices` - identyczne z wywołaniami pojedynczymi
    pub fn derive_batch<S>(
        &self,
        seed: &S,
        application: u32,
        length: u32,
        indices: &[u32],
    ) -> Result<Vec<String>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        let spec = FormatSpec::default_for(application, length)?;
        Ok(self
            .derive_batch_outputs(seed, &spec, indices)?
            .iter()
            .map(|output| output.as_str().to_string())
            .collect())
    }

    pub fn derive_batch_outputs<S>(
        &self,
        seed: &S,
        spec: &FormatSpec,
        indices: &[u32],
    ) -> Result<Vec<ApplicationOutput>>
    where
        S: AsRef<[u8]> + ?Sized,
    {
        tracing::debug!(
            application = spec.application().code(),
            length = spec.length(),
            count = indices.len(),
            "batch derivation"
        );
        let seed = seed.as_ref();
        indices
            .iter()
            .map(|&index| self.derive_output(seed, spec, index))
            .collect()
    }

    /// Raport stanu bezpieczeństwa
    pub fn security_audit(&self) -> SecurityAuditReport {
        SecurityAuditReport::collect(
            &self.config,
            self.cache.as_ref().map(|cache| cache.stats()),
        )
    }

    fn compute(&self, seed: &[u8], spec: &FormatSpec, index: u32) -> Result<ApplicationOutput> {
        let path = DerivationPath::new(spec.application().code(), spec.length(), index)?;
        let block = derive_entropy_block(seed, &path, self.config.effective_clear_passes())?;
        let bytes = spec.entropy_bytes()?;
        self.check_entropy(&block.as_array()[..bytes], spec)?;
        format_output(spec, block, self.encoder.as_ref())
    }

    fn check_index(&self, index: u32, operation: Operation) -> Result<()> {
        validate_index_boundaries_with(
            index as i64,
            operation.name(),
            self.config.high_index_warning,
        )
    }

    fn check_entropy(&self, entropy: &[u8], spec: &FormatSpec) -> Result<()> {
        if !self.config.entropy_validation {
            return Ok(());
        }

        let policy = &self.config.entropy_policy;
        let min_bits = (entropy.len() * 8) as u32;
        let outcome = validate_entropy_quality_with(entropy, min_bits, policy).and_then(|report| {
            if report.acceptable {
                Ok(report)
            } else {
                Err(AlfaBip85Error::EntropyQualityRejected {
                    score: report.score,
                    threshold: policy.acceptable_score,
                })
            }
        });

        match outcome {
            Ok(report) => {
                if report.score < policy.good_score {
                    tracing::debug!(
                        application = spec.application().code(),
                        score = report.score,
                        "entropy below good-quality threshold"
                    );
                }
                Ok(())
            }
            Err(e) if self.config.accept_weak_entropy && e.is_security_critical() => {
                tracing::warn!(
                    application = spec.application().code(),
                    error = %e,
                    "weak entropy accepted by explicit risk override"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for Bip85Deriver {
    fn default() -> Self {
        Self::new(SecurityConfig::default())
    }
}

// Profil wchodzi do klucza cache: koder i wszystko, co decyduje o przejściu bramki jakości
fn cache_profile(config: &SecurityConfig, encoder: &dyn MnemonicEncoder) -> u64 {
    descriptor_hash(&format!(
        "encoder={};validation={};accept_weak={};policy={:?}",
        encoder.name(),
        config.entropy_validation,
        config.accept_weak_entropy,
        config.entropy_policy
    ))
}

/// derive_bip85_entropy(seed, application, length, index, output_bytes)
pub fn derive_bip85_entropy<S>(
    seed: &S,
    application: u32,
    length: u32,
    index: u32,
    output_bytes: usize,
) -> Result<Zeroizing<Vec<u8>>>
where
    S: AsRef<[u8]> + ?Sized,
{
    Bip85Deriver::default().derive_entropy(seed, application, length, index, output_bytes)
}

/// derive_bip39_mnemonic(seed, word_count, index, language)
pub fn derive_bip39_mnemonic<S>(
    seed: &S,
    word_count: u32,
    index: u32,
    language: MnemonicLanguage,
) -> Result<String>
where
    S: AsRef<[u8]> + ?Sized,
{
    Bip85Deriver::default().derive_bip39_mnemonic(seed, word_count, index, language)
}

/// derive_hex_entropy(seed, byte_length, index, uppercase)
pub fn derive_hex_entropy<S>(
    seed: &S,
    byte_length: u32,
    index: u32,
    uppercase: bool,
) -> Result<String>
where
    S: AsRef<[u8]> + ?Sized,
{
    Bip85Deriver::default().derive_hex_entropy(seed, byte_length, index, uppercase)
}

/// derive_password(seed, length, index, charset)
pub fn derive_password<S>(seed: &S, length: u32, index: u32, charset: Charset) -> Result<String>
where
    S: AsRef<[u8]> + ?Sized,
{
    Bip85Deriver::default().derive_password(seed, length, index, charset)
}

/// derive_batch(seed, application, length, indices)
pub fn derive_batch<S>(
    seed: &S,
    application: u32,
    length: u32,
    indices: &[u32],
) -> Result<Vec<String>>
where
    S: AsRef<[u8]> + ?Sized,
{
    Bip85Deriver::default().derive_batch(seed, application, length, indices)
}
