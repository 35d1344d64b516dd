//! Kodek ścieżek BIP85: m/83696968'/{application}'/{length}'/{index}'

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AlfaBip85Error, Result};

/// Stała celu (purpose) BIP85
pub const BIP85_PURPOSE: u32 = 83_696_968;

const PURPOSE_SEGMENT: &str = "83696968'";

/// Offset hardened dla BIP32
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Najwyższy dozwolony indeks (2^31 - 1)
pub const MAX_INDEX: u32 = HARDENED_OFFSET - 1;

/// Długość zakodowanego payloadu ścieżki
pub const ENCODED_PATH_LEN: usize = 12;

/// Znane aplikacje BIP85
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Application {
    /// Mnemonik BIP-39
    Bip39,
    /// Entropia hex
    Hex,
    /// Hasło
    Password,
}

impl Application {
    pub const fn code(&self) -> u32 {
        match self {
            Self::Bip39 => 39,
            Self::Hex => 128,
            Self::Password => 9999,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            39 => Some(Self::Bip39),
            128 => Some(Self::Hex),
            9999 => Some(Self::Password),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bip39 => "bip39",
            Self::Hex => "hex",
            Self::Password => "password",
        }
    }

    /// Sprawdza parametr długości według reguł aplikacji
    pub fn validate_length(&self, length: u32) -> Result<()> {
        match self {
            Self::Bip39 => mnemonic_entropy_bytes(length).map(|_| ()),
            Self::Hex => {
                if (HEX_MIN_BYTES..=HEX_MAX_BYTES).contains(&length) {
                    Ok(())
                } else {
                    Err(AlfaBip85Error::InvalidHexLength {
                        value: length,
                        min: HEX_MIN_BYTES,
                        max: HEX_MAX_BYTES,
                    })
                }
            }
            Self::Password => {
                if (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&length) {
                    Ok(())
                } else {
                    Err(AlfaBip85Error::InvalidPasswordLength {
                        value: length,
                        min: PASSWORD_MIN_LEN,
                        max: PASSWORD_MAX_LEN,
                    })
                }
            }
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const HEX_MIN_BYTES: u32 = 16;
pub const HEX_MAX_BYTES: u32 = 64;
pub const PASSWORD_MIN_LEN: u32 = 10;
pub const PASSWORD_MAX_LEN: u32 = 128;

/// Liczba bajtów entropii wymagana dla danej liczby słów
pub fn mnemonic_entropy_bytes(word_count: u32) -> Result<usize> {
    match word_count {
        12 => Ok(16),
        15 => Ok(20),
        18 => Ok(24),
        21 => Ok(28),
        24 => Ok(32),
        other => Err(AlfaBip85Error::InvalidWordCount(other)),
    }
}

/// Ścieżka derywacji BIP85 - wszystkie poziomy hardened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationPath {
    application: u32,
    length: u32,
    index: u32,
}

impl DerivationPath {
    pub fn new(application: u32, length: u32, index: u32) -> Result<Self> {
        check_index(index as i64)?;
        Ok(Self {
            application,
            length,
            index,
        })
    }

    /// Tworzy ścieżkę z wartości ze znakiem (np. z CLI lub JSON)
    pub fn from_signed(application: i64, length: i64, index: i64) -> Result<Self> {
        let application = u32::try_from(application).map_err(|_| {
            AlfaBip85Error::InvalidApplication {
                value: application,
                max: u32::MAX,
            }
        })?;
        let length = u32::try_from(length).map_err(|_| AlfaBip85Error::InvalidLength {
            value: length,
            max: u32::MAX,
        })?;
        check_index(index)?;
        Self::new(application, length, index as u32)
    }

    pub fn application(&self) -> u32 {
        self.application
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Poziomy ścieżki jako indeksy hardened, od purpose do index
    pub fn hardened_components(&self) -> [u32; 4] {
        [
            BIP85_PURPOSE | HARDENED_OFFSET,
            self.application | HARDENED_OFFSET,
            self.length | HARDENED_OFFSET,
            self.index | HARDENED_OFFSET,
        ]
    }

    pub fn encode(&self) -> [u8; ENCODED_PATH_LEN] {
        let mut out = [0u8; ENCODED_PATH_LEN];
        out[..4].copy_from_slice(&self.application.to_be_bytes());
        out[4..8].copy_from_slice(&self.length.to_be_bytes());
        out[8..].copy_from_slice(&self.index.to_be_bytes());
        out
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{}'/{}'/{}'/{}'",
            BIP85_PURPOSE, self.application, self.length, self.index
        )
    }
}

impl FromStr for DerivationPath {
    type Err = AlfaBip85Error;

    fn from_str(s: &str) -> Result<Self> {
        let (application, length, index) = parse_path(s)?;
        Self::new(application, length, index)
    }
}

fn check_index(index: i64) -> Result<()> {
    if (0..=MAX_INDEX as i64).contains(&index) {
        Ok(())
    } else {
        Err(AlfaBip85Error::InvalidIndex {
            value: index,
            max: MAX_INDEX,
        })
    }
}

/// Koduje (application, length, index) do 12-bajtowego payloadu big-endian
pub fn encode_path(application: u32, length: u32, index: u32) -> Result<[u8; ENCODED_PATH_LEN]> {
    Ok(DerivationPath::new(application, length, index)?.encode())
}

/// Kanoniczny zapis ścieżki
pub fn format_path(application: u32, length: u32, index: u32) -> String {
    format!(
        "m/{}'/{}'/{}'/{}'",
        BIP85_PURPOSE, application, length, index
    )
}

/// Parsuje kanoniczny zapis ścieżki (odwrotność `format_path`)
pub fn parse_path(s: &str) -> Result<(u32, u32, u32)> {
    let bad = || AlfaBip85Error::InvalidPathFormat(format!("expected m/{}'/N'/N'/N'", BIP85_PURPOSE));

    let mut segments = s.split('/');
    if segments.next() != Some("m") {
        return Err(bad());
    }
    if segments.next() != Some(PURPOSE_SEGMENT) {
        return Err(bad());
    }

    let mut values = [0u64; 3];
    for slot in values.iter_mut() {
        let segment = segments.next().ok_or_else(bad)?;
        let digits = segment.strip_suffix('\'').ok_or_else(bad)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        // Tylko forma kanoniczna: format_path(parse_path(s)) == s
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(bad());
        }
        // Ponad 10 cyfr zawsze przekracza u32
        *slot = if digits.len() > 10 {
            u64::MAX
        } else {
            digits.parse::<u64>().map_err(|_| bad())?
        };
    }
    if segments.next().is_some() {
        return Err(bad());
    }

    let application = u32::try_from(values[0]).map_err(|_| AlfaBip85Error::InvalidApplication {
        value: clamp_i64(values[0]),
        max: u32::MAX,
    })?;
    let length = u32::try_from(values[1]).map_err(|_| AlfaBip85Error::InvalidLength {
        value: clamp_i64(values[1]),
        max: u32::MAX,
    })?;
    if values[2] > MAX_INDEX as u64 {
        return Err(AlfaBip85Error::InvalidIndex {
            value: clamp_i64(values[2]),
            max: MAX_INDEX,
        });
    }
    let index = values[2] as u32;

    if let Some(app) = Application::from_code(application) {
        app.validate_length(length)?;
    }

    Ok((application, length, index))
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_big_endian() {
        let encoded = encode_path(39, 12, 1).unwrap();
        assert_eq!(encoded, [0, 0, 0, 39, 0, 0, 0, 12, 0, 0, 0, 1]);
    }

    #[test]
    fn test_encode_rejects_hardened_index() {
        assert!(matches!(
            encode_path(128, 32, HARDENED_OFFSET),
            Err(AlfaBip85Error::InvalidIndex { .. })
        ));
        assert!(encode_path(128, 32, MAX_INDEX).is_ok());
    }

    #[test]
    fn test_from_signed_ranges() {
        assert!(matches!(
            DerivationPath::from_signed(-1, 12, 0),
            Err(AlfaBip85Error::InvalidApplication { .. })
        ));
        assert!(matches!(
            DerivationPath::from_signed(39, 1 << 33, 0),
            Err(AlfaBip85Error::InvalidLength { .. })
        ));
        assert!(matches!(
            DerivationPath::from_signed(39, 12, -5),
            Err(AlfaBip85Error::InvalidIndex { .. })
        ));
        assert!(DerivationPath::from_signed(39, 12, 7).is_ok());
    }

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(39, 12, 0), "m/83696968'/39'/12'/0'");
        let path = DerivationPath::new(128, 32, 5).unwrap();
        assert_eq!(path.to_string(), "m/83696968'/128'/32'/5'");
        assert_eq!(PURPOSE_SEGMENT, format!("{BIP85_PURPOSE}'"));
    }

    #[test]
    fn test_parse_roundtrip() {
        let s = format_path(9999, 20, 42);
        assert_eq!(parse_path(&s).unwrap(), (9999, 20, 42));
        let path: DerivationPath = s.parse().unwrap();
        assert_eq!(path.index(), 42);
    }

    #[test]
    fn test_parse_accepts_only_canonical_form() {
        for s in [
            "m/83696968'/0'/0'/0'",
            "m/83696968'/128'/32'/0'",
            "m/83696968'/39'/24'/2147483647'",
        ] {
            let (application, length, index) = parse_path(s).unwrap();
            assert_eq!(format_path(application, length, index), s);
        }
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        for s in [
            "",
            "m",
            "m/83696968'/39'/12'",
            "m/83696968'/39'/12'/0",
            "m/83696968/39'/12'/0'",
            "m/83696969'/39'/12'/0'",
            "n/83696968'/39'/12'/0'",
            "m/83696968'/39'/12'/0'/1'",
            "m/83696968'/+39'/12'/0'",
            "m/83696968'/39h/12'/0'",
            "m/83696968'/'/12'/0'",
            "m/083696968'/128'/32'/0'",
            "m/83696968'/128'/032'/0'",
            "m/83696968'/0128'/32'/0'",
            "m/83696968'/128'/32'/00'",
        ] {
            assert!(
                matches!(parse_path(s), Err(AlfaBip85Error::InvalidPathFormat(_))),
                "accepted {s:?}"
            );
        }
    }

    #[test]
    fn test_parse_propagates_parameter_errors() {
        assert!(matches!(
            parse_path("m/83696968'/39'/13'/0'"),
            Err(AlfaBip85Error::InvalidWordCount(13))
        ));
        assert!(matches!(
            parse_path("m/83696968'/128'/65'/0'"),
            Err(AlfaBip85Error::InvalidHexLength { .. })
        ));
        assert!(matches!(
            parse_path("m/83696968'/39'/12'/2147483648'"),
            Err(AlfaBip85Error::InvalidIndex { .. })
        ));
        assert!(matches!(
            parse_path("m/83696968'/4294967296'/12'/0'"),
            Err(AlfaBip85Error::InvalidApplication { .. })
        ));
    }

    #[test]
    fn test_hardened_components() {
        let path = DerivationPath::new(39, 12, 0).unwrap();
        assert!(path
            .hardened_components()
            .iter()
            .all(|c| c & HARDENED_OFFSET != 0));
    }

    #[test]
    fn test_mnemonic_entropy_bytes() {
        assert_eq!(mnemonic_entropy_bytes(12).unwrap(), 16);
        assert_eq!(mnemonic_entropy_bytes(24).unwrap(), 32);
        assert!(mnemonic_entropy_bytes(13).is_err());
    }
}
