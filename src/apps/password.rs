//! Aplikacja 9999 - hasło z alfabetu, losowanie z odrzucaniem (bez biasu modulo)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::{EntropyStream, SecureArray};
use crate::error::{AlfaBip85Error, Result};
use crate::path::Application;

const BASE64: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
// RFC 1924
const BASE85: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";
const ALPHANUMERIC: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ASCII: &str = "!\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// Zestaw znaków hasła
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    #[default]
    Base64,
    Base85,
    Alphanumeric,
    Ascii,
}

impl Charset {
    pub fn alphabet(&self) -> &'static str {
        match self {
            Self::Base64 => BASE64,
            Self::Base85 => BASE85,
            Self::Alphanumeric => ALPHANUMERIC,
            Self::Ascii => ASCII,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Base85 => "base85",
            Self::Alphanumeric => "alphanumeric",
            Self::Ascii => "ascii",
        }
    }

    /// Bajty >= tej granicy są odrzucane: floor(256 / |A|) * |A|
    pub fn acceptance_limit(&self) -> usize {
        let size = self.alphabet().len();
        (256 / size) * size
    }
}

impl FromStr for Charset {
    type Err = AlfaBip85Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "base85" => Ok(Self::Base85),
            "alphanumeric" | "alnum" => Ok(Self::Alphanumeric),
            "ascii" => Ok(Self::Ascii),
            other => Err(AlfaBip85Error::InvalidCharacterSet(other.to_string())),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapuje strumień entropii na `length` znaków alfabetu
pub fn format_password(block: SecureArray<64>, length: u32, charset: Charset) -> Result<String> {
    Application::Password.validate_length(length)?;

    let alphabet = charset.alphabet().as_bytes();
    let limit = charset.acceptance_limit();
    let mut stream = EntropyStream::new(block);
    let mut password = String::with_capacity(length as usize);

    while password.len() < length as usize {
        let byte = stream.next_byte()? as usize;
        if byte < limit {
            password.push(alphabet[byte % alphabet.len()] as char);
        }
    }

    if stream.extensions() > 0 {
        tracing::trace!(
            extensions = stream.extensions(),
            length,
            "password entropy stream extended"
        );
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(fill: u8) -> SecureArray<64> {
        SecureArray::from_array([fill; 64]).with_passes(0)
    }

    #[test]
    fn test_alphabet_sizes() {
        assert_eq!(Charset::Base64.alphabet().len(), 64);
        assert_eq!(Charset::Base85.alphabet().len(), 85);
        assert_eq!(Charset::Alphanumeric.alphabet().len(), 62);
        assert_eq!(Charset::Ascii.alphabet().len(), 94);
        assert!(Charset::Ascii.alphabet().bytes().all(|b| (0x21..=0x7E).contains(&b)));
    }

    #[test]
    fn test_acceptance_limits() {
        assert_eq!(Charset::Base64.acceptance_limit(), 256);
        assert_eq!(Charset::Base85.acceptance_limit(), 255);
        assert_eq!(Charset::Alphanumeric.acceptance_limit(), 248);
        assert_eq!(Charset::Ascii.acceptance_limit(), 188);
    }

    #[test]
    fn test_rejection_skips_biased_bytes() {
        // 0xF8 >= 248 - cały pierwszy blok odrzucony, znaki pochodzą z rozszerzenia
        let password = format_password(block(0xF8), 20, Charset::Alphanumeric).unwrap();
        assert_eq!(password.len(), 20);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_accepted_byte_mapping() {
        // 65 % 64 = 1 -> 'B'
        let password = format_password(block(65), 10, Charset::Base64).unwrap();
        assert_eq!(password, "B".repeat(10));
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(
            format_password(block(1), 9, Charset::Base64),
            Err(AlfaBip85Error::InvalidPasswordLength { value: 9, .. })
        ));
        assert!(matches!(
            format_password(block(1), 129, Charset::Base64),
            Err(AlfaBip85Error::InvalidPasswordLength { value: 129, .. })
        ));
        assert_eq!(format_password(block(1), 128, Charset::Base85).unwrap().len(), 128);
    }

    #[test]
    fn test_charset_parse() {
        assert_eq!("BASE85".parse::<Charset>().unwrap(), Charset::Base85);
        assert!(matches!(
            "emoji".parse::<Charset>(),
            Err(AlfaBip85Error::InvalidCharacterSet(_))
        ));
    }
}
