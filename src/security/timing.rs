//! Ochrona przed timing attacks - minimalny czas trwania operacji

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::policy::SecurityConfig;

/// Operacje objęte ochroną czasową
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    MnemonicGeneration,
    PasswordGeneration,
    HexGeneration,
    EntropyDerivation,
    PathValidation,
}

impl Operation {
    /// Minimalny czas trwania operacji
    pub fn floor(&self) -> Duration {
        match self {
            Self::MnemonicGeneration => Duration::from_millis(1),
            Self::PasswordGeneration => Duration::from_micros(750),
            Self::HexGeneration => Duration::from_micros(500),
            Self::EntropyDerivation => Duration::from_micros(250),
            Self::PathValidation => Duration::from_micros(100),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MnemonicGeneration => "mnemonic_generation",
            Self::PasswordGeneration => "password_generation",
            Self::HexGeneration => "hex_generation",
            Self::EntropyDerivation => "entropy_derivation",
            Self::PathValidation => "path_validation",
        }
    }
}

/// Guard wyrównujący czas: przy drop dosypia do progu operacji,
/// niezależnie od tego, czy operacja zakończyła się sukcesem czy błędem
#[must_use = "the guard enforces the floor only while it is alive"]
pub struct TimingGuard {
    operation: Operation,
    floor: Duration,
    started: Instant,
    enabled: bool,
}

impl TimingGuard {
    pub fn new(operation: Operation, enabled: bool) -> Self {
        Self::with_floor(operation, operation.floor(), enabled)
    }

    pub fn with_floor(operation: Operation, floor: Duration, enabled: bool) -> Self {
        Self {
            operation,
            floor,
            started: Instant::now(),
            enabled,
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        let elapsed = self.started.elapsed();
        if let Some(remaining) = self.floor.checked_sub(elapsed) {
            tracing::trace!(
                operation = self.operation.name(),
                padding_us = remaining.as_micros() as u64,
                "timing floor padding"
            );
            std::thread::sleep(remaining);
        }
    }
}

/// Otwiera zakres chroniony czasowo dla operacji
pub fn timing_attack_protection(operation: Operation, config: &SecurityConfig) -> TimingGuard {
    TimingGuard::new(operation, config.timing_attack_protection)
}
