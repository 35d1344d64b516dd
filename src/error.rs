//! Typy błędów dla ALFA_BIP85
//!
//! Żaden komunikat nie zawiera bajtów seeda, kluczy ani derywowanej entropii.

use thiserror::Error;

/// Kategoria błędu - decyduje jak wywołujący ma reagować
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Błędne parametry wywołującego - popraw wejście
    Validation,
    /// Błąd obliczeń kryptograficznych - fatalny dla wywołania
    Derivation,
    /// Błąd formatowania wyniku aplikacji
    Application,
    /// Naruszenie jakości entropii lub polityki bezpieczeństwa
    Security,
}

#[derive(Debug, Error)]
pub enum AlfaBip85Error {
    #[error("Invalid application {value}: must fit in 0..={max}")]
    InvalidApplication { value: i64, max: u32 },

    #[error("Invalid length {value}: must fit in 0..={max}")]
    InvalidLength { value: i64, max: u32 },

    #[error("Invalid index {value}: must be in 0..={max}")]
    InvalidIndex { value: i64, max: u32 },

    #[error("Invalid derivation path format: {0}")]
    InvalidPathFormat(String),

    #[error("Invalid master seed: expected {expected} bytes, got {actual}")]
    InvalidMasterSeed { expected: usize, actual: usize },

    #[error("Invalid output length {value}: must be in {min}..={max} bytes")]
    InvalidOutputLength { value: usize, min: usize, max: usize },

    #[error("Invalid word count {0}: must be one of 12, 15, 18, 21, 24")]
    InvalidWordCount(u32),

    #[error("Invalid hex length {value}: must be in {min}..={max} bytes")]
    InvalidHexLength { value: u32, min: u32, max: u32 },

    #[error("Invalid password length {value}: must be in {min}..={max} characters")]
    InvalidPasswordLength { value: u32, min: u32, max: u32 },

    #[error("Invalid character set: {0}")]
    InvalidCharacterSet(String),

    #[error("Invalid mnemonic language: {0}")]
    InvalidLanguage(String),

    #[error("Unsupported application {0}")]
    UnsupportedApplication(u32),

    #[error("Derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Application {application} failed: {reason}")]
    ApplicationFailed { application: String, reason: String },

    #[error("Index {index} out of range for {operation}: must be in 0..2^31")]
    IndexOutOfRange { index: i64, operation: String },

    #[error("Insufficient entropy: {actual_bits} bits, required {required_bits}")]
    InsufficientEntropy { actual_bits: usize, required_bits: u32 },

    #[error("Weak entropy detected: {0}")]
    WeakEntropyDetected(String),

    #[error("Randomness test failed: {0}")]
    RandomnessTestFailed(String),

    #[error("Entropy quality rejected: score {score} below {threshold}")]
    EntropyQualityRejected { score: u8, threshold: u8 },

    #[error("Invalid config JSON: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlfaBip85Error>;

impl AlfaBip85Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DerivationFailed(_) => ErrorCategory::Derivation,
            Self::ApplicationFailed { .. } => ErrorCategory::Application,
            Self::IndexOutOfRange { .. }
            | Self::InsufficientEntropy { .. }
            | Self::WeakEntropyDetected(_)
            | Self::RandomnessTestFailed(_)
            | Self::EntropyQualityRejected { .. } => ErrorCategory::Security,
            _ => ErrorCategory::Validation,
        }
    }

    /// Błędy, które wywołujący może świadomie zaakceptować flagą ryzyka
    pub fn is_security_critical(&self) -> bool {
        matches!(
            self,
            Self::WeakEntropyDetected(_)
                | Self::RandomnessTestFailed(_)
                | Self::EntropyQualityRejected { .. }
                | Self::InsufficientEntropy { .. }
        )
    }

    /// Czy poprawienie parametrów wejściowych usuwa błąd
    pub fn is_recoverable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Validation)
            || matches!(self, Self::IndexOutOfRange { .. })
    }
}
