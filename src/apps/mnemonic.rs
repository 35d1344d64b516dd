//! Aplikacja 39 - mnemonik BIP-39 z derywowanej entropii

use std::fmt;
use std::str::FromStr;

use bip39::{Language, Mnemonic};
use serde::{Deserialize, Serialize};

use crate::error::{AlfaBip85Error, Result};

/// Język listy słów BIP-39
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MnemonicLanguage {
    #[default]
    English,
    Japanese,
    Korean,
    Spanish,
    ChineseSimplified,
    ChineseTraditional,
    French,
    Italian,
    Czech,
}

impl MnemonicLanguage {
    pub const ALL: [MnemonicLanguage; 9] = [
        Self::English,
        Self::Japanese,
        Self::Korean,
        Self::Spanish,
        Self::ChineseSimplified,
        Self::ChineseTraditional,
        Self::French,
        Self::Italian,
        Self::Czech,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Spanish => "es",
            Self::ChineseSimplified => "zh-hans",
            Self::ChineseTraditional => "zh-hant",
            Self::French => "fr",
            Self::Italian => "it",
            Self::Czech => "cs",
        }
    }
}

impl FromStr for MnemonicLanguage {
    type Err = AlfaBip85Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "ja" | "jp" | "japanese" => Ok(Self::Japanese),
            "ko" | "korean" => Ok(Self::Korean),
            "es" | "spanish" => Ok(Self::Spanish),
            "zh" | "zh-hans" | "zh-cn" | "chinese-simplified" => Ok(Self::ChineseSimplified),
            "zh-hant" | "zh-tw" | "chinese-traditional" => Ok(Self::ChineseTraditional),
            "fr" | "french" => Ok(Self::French),
            "it" | "italian" => Ok(Self::Italian),
            "cs" | "czech" => Ok(Self::Czech),
            other => Err(AlfaBip85Error::InvalidLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for MnemonicLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<MnemonicLanguage> for Language {
    fn from(language: MnemonicLanguage) -> Self {
        match language {
            MnemonicLanguage::English => Language::English,
            MnemonicLanguage::Japanese => Language::Japanese,
            MnemonicLanguage::Korean => Language::Korean,
            MnemonicLanguage::Spanish => Language::Spanish,
            MnemonicLanguage::ChineseSimplified => Language::SimplifiedChinese,
            MnemonicLanguage::ChineseTraditional => Language::TraditionalChinese,
            MnemonicLanguage::French => Language::French,
            MnemonicLanguage::Italian => Language::Italian,
            MnemonicLanguage::Czech => Language::Czech,
        }
    }
}

/// Konwersja entropia -> słowa (zewnętrzny koder BIP-39)
pub trait MnemonicEncoder: Send + Sync {
    /// Identyfikator kodera w kluczu cache; różne mapowania muszą mieć różne nazwy
    fn name(&self) -> &str;

    fn encode(&self, entropy: &[u8], language: MnemonicLanguage) -> Result<String>;
}

/// Koder oparty o crate `bip39`
#[derive(Debug, Clone, Copy, Default)]
pub struct Bip39Encoder;

impl MnemonicEncoder for Bip39Encoder {
    fn name(&self) -> &str {
        "bip39"
    }

    fn encode(&self, entropy: &[u8], language: MnemonicLanguage) -> Result<String> {
        let mnemonic = Mnemonic::from_entropy_in(language.into(), entropy).map_err(|e| {
            AlfaBip85Error::ApplicationFailed {
                application: "bip39".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(mnemonic.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        // BIP-39: 16 bajtów zerowych
        let phrase = Bip39Encoder.encode(&[0u8; 16], MnemonicLanguage::English).unwrap();
        assert_eq!(
            phrase,
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        );
    }

    #[test]
    fn test_word_counts() {
        for (bytes, words) in [(16, 12), (20, 15), (24, 18), (28, 21), (32, 24)] {
            let phrase = Bip39Encoder
                .encode(&vec![0x5Au8; bytes], MnemonicLanguage::English)
                .unwrap();
            assert_eq!(phrase.split_whitespace().count(), words);
        }
    }

    #[test]
    fn test_invalid_entropy_length() {
        let err = Bip39Encoder
            .encode(&[1u8; 17], MnemonicLanguage::English)
            .unwrap_err();
        assert!(matches!(err, AlfaBip85Error::ApplicationFailed { .. }));
    }

    #[test]
    fn test_language_codes() {
        for language in MnemonicLanguage::ALL {
            assert_eq!(language.code().parse::<MnemonicLanguage>().unwrap(), language);
        }
        assert_eq!("English".parse::<MnemonicLanguage>().unwrap(), MnemonicLanguage::English);
        assert!("xx".parse::<MnemonicLanguage>().is_err());
    }

    #[test]
    fn test_languages_differ() {
        let entropy = [0x33u8; 16];
        let en = Bip39Encoder.encode(&entropy, MnemonicLanguage::English).unwrap();
        let es = Bip39Encoder.encode(&entropy, MnemonicLanguage::Spanish).unwrap();
        assert_ne!(en, es);
    }
}
