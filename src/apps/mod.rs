//! Formatery aplikacji BIP85 - mnemonik, hex, hasło

mod hex;
mod mnemonic;
mod password;

pub use self::hex::format_hex;
pub use mnemonic::{Bip39Encoder, MnemonicEncoder, MnemonicLanguage};
pub use password::{format_password, Charset};

use zeroize::Zeroize;

use crate::crypto::{SecureArray, MAX_OUTPUT_BYTES};
use crate::error::{AlfaBip85Error, Result};
use crate::path::{mnemonic_entropy_bytes, Application};
use crate::security::Operation;

/// Aplikacja wraz z parametrami formatu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatSpec {
    Mnemonic {
        word_count: u32,
        language: MnemonicLanguage,
    },
    Hex {
        byte_length: u32,
        uppercase: bool,
    },
    Password {
        length: u32,
        charset: Charset,
    },
}

impl FormatSpec {
    /// Domyślne parametry formatu dla (application, length) - używane w batch
    pub fn default_for(application: u32, length: u32) -> Result<Self> {
        match Application::from_code(application) {
            Some(Application::Bip39) => Ok(Self::Mnemonic {
                word_count: length,
                language: MnemonicLanguage::English,
            }),
            Some(Application::Hex) => Ok(Self::Hex {
                byte_length: length,
                uppercase: false,
            }),
            Some(Application::Password) => Ok(Self::Password {
                length,
                charset: Charset::Base64,
            }),
            None => Err(AlfaBip85Error::UnsupportedApplication(application)),
        }
    }

    pub fn application(&self) -> Application {
        match self {
            Self::Mnemonic { .. } => Application::Bip39,
            Self::Hex { .. } => Application::Hex,
            Self::Password { .. } => Application::Password,
        }
    }

    /// Parametr "length" ścieżki BIP85
    pub fn length(&self) -> u32 {
        match self {
            Self::Mnemonic { word_count, .. } => *word_count,
            Self::Hex { byte_length, .. } => *byte_length,
            Self::Password { length, .. } => *length,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.application().validate_length(self.length())
    }

    /// Ile bajtów entropii trafia do formatera
    pub fn entropy_bytes(&self) -> Result<usize> {
        self.validate()?;
        match self {
            Self::Mnemonic { word_count, .. } => mnemonic_entropy_bytes(*word_count),
            Self::Hex { byte_length, .. } => Ok(*byte_length as usize),
            Self::Password { .. } => Ok(MAX_OUTPUT_BYTES),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Mnemonic { .. } => Operation::MnemonicGeneration,
            Self::Hex { .. } => Operation::HexGeneration,
            Self::Password { .. } => Operation::PasswordGeneration,
        }
    }

    /// Kanoniczny opis parametrów spoza ścieżki (klucz cache)
    pub fn extras_descriptor(&self) -> String {
        match self {
            Self::Mnemonic { language, .. } => format!("language={}", language.code()),
            Self::Hex { uppercase, .. } => format!("uppercase={}", uppercase),
            Self::Password { charset, .. } => format!("charset={}", charset.as_str()),
        }
    }
}

/// Wynik aplikacji - zerowany przy drop
#[derive(Clone, PartialEq, Eq)]
pub enum ApplicationOutput {
    Mnemonic {
        phrase: String,
        language: MnemonicLanguage,
    },
    HexString {
        value: String,
        uppercase: bool,
    },
    Password {
        value: String,
        charset: Charset,
    },
}

impl ApplicationOutput {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mnemonic { phrase, .. } => phrase,
            Self::HexString { value, .. } => value,
            Self::Password { value, .. } => value,
        }
    }

    pub fn application(&self) -> Application {
        match self {
            Self::Mnemonic { .. } => Application::Bip39,
            Self::HexString { .. } => Application::Hex,
            Self::Password { .. } => Application::Password,
        }
    }
}

impl Drop for ApplicationOutput {
    fn drop(&mut self) {
        match self {
            Self::Mnemonic { phrase, .. } => phrase.zeroize(),
            Self::HexString { value, .. } => value.zeroize(),
            Self::Password { value, .. } => value.zeroize(),
        }
    }
}

impl std::fmt::Debug for ApplicationOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApplicationOutput::{}([REDACTED])", self.application())
    }
}

/// Formatuje blok entropii zgodnie ze specyfikacją formatu
pub fn format_output(
    spec: &FormatSpec,
    block: SecureArray<64>,
    encoder: &dyn MnemonicEncoder,
) -> Result<ApplicationOutput> {
    let bytes = spec.entropy_bytes()?;
    match *spec {
        FormatSpec::Mnemonic { language, .. } => Ok(ApplicationOutput::Mnemonic {
            phrase: encoder.encode(&block.as_array()[..bytes], language)?,
            language,
        }),
        FormatSpec::Hex { uppercase, .. } => Ok(ApplicationOutput::HexString {
            value: format_hex(&block.as_array()[..bytes], uppercase)?,
            uppercase,
        }),
        FormatSpec::Password { length, charset } => Ok(ApplicationOutput::Password {
            value: format_password(block, length, charset)?,
            charset,
        }),
    }
}
