//! Aplikacja 128 - entropia jako hex

use crate::error::Result;
use crate::path::Application;

pub fn format_hex(entropy: &[u8], uppercase: bool) -> Result<String> {
    Application::Hex.validate_length(entropy.len() as u32)?;
    Ok(if uppercase {
        hex::encode_upper(entropy)
    } else {
        hex::encode(entropy)
    })
}
