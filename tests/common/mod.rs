//! Wspólne narzędzia testów integracyjnych

#![allow(dead_code)]

use alfa_bip85::{Bip85Deriver, SecurityConfig};

pub const SEED: [u8; 64] = [0xAA; 64];

/// Subskrybent tracing dla testów (RUST_LOG=alfa_bip85=debug)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Derywator bez opóźnień czasowych
pub fn fast_deriver() -> Bip85Deriver {
    Bip85Deriver::new(SecurityConfig::testing())
}

/// Derywator bez opóźnień i bez bramki jakości (losowe seedy w proptest)
pub fn unchecked_deriver() -> Bip85Deriver {
    let mut config = SecurityConfig::testing();
    config.entropy_validation = false;
    Bip85Deriver::new(config)
}
