//! # ALFA_BIP85 1.0 - Deterministyczne sekrety z jednego master seed
//!
//! ## Możliwości:
//! - Derywacja BIP85 (BIP32 hardened + HMAC-SHA512 "bip-entropy-from-k")
//! - Mnemoniki BIP-39 (12-24 słów, wiele języków)
//! - Entropia hex (16-64 bajtów)
//! - Hasła (base64, base85, alfanumeryczne, ascii) z rejection sampling
//! - Walidacja jakości entropii z konfigurowalną polityką
//! - Ochrona czasowa i wielokrotne czyszczenie buforów
//! - Cache LRU z odciskiem seeda zamiast seeda

pub mod error;
pub mod path;
pub mod crypto;
pub mod policy;
pub mod security;
pub mod apps;
pub mod cache;
pub mod deriver;
pub mod audit;

// Re-exports
pub use error::{AlfaBip85Error, ErrorCategory, Result};
pub use path::{encode_path, format_path, parse_path, Application, DerivationPath};
pub use crypto::MasterSeed;
pub use policy::{EntropyGrade, EntropyPolicy, SecurityConfig};
pub use security::{validate_entropy_quality, EntropyQualityReport};
pub use apps::{ApplicationOutput, Charset, FormatSpec, MnemonicEncoder, MnemonicLanguage};
pub use cache::{CacheStats, DerivationCache};
pub use deriver::{
    derive_batch, derive_bip39_mnemonic, derive_bip85_entropy, derive_hex_entropy,
    derive_password, Bip85Deriver,
};
pub use audit::SecurityAuditReport;

/// Wersja biblioteki
pub const VERSION: &str = "1.0.0";

/// Nazwa systemu
pub const SYSTEM_NAME: &str = "ALFA_BIP85";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "1.0.0");
        assert_eq!(SYSTEM_NAME, "ALFA_BIP85");
    }
}
